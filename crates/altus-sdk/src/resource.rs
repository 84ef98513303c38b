//! Shared machinery behind every resource façade.
//!
//! Each façade (dataset, pipeline, tensorboard, ...) wraps a [`ResourceCell`]
//! that holds what is known about the remote resource right now: its
//! canonical name, the last fetched snapshot, the most recently queued
//! deferred future, and the first error any of its work hit.
//!
//! The cell enforces the lifecycle rules the façades share:
//! - deferred work on one resource runs in submission order, because each
//!   dispatch chains on the future already in the pending slot;
//! - the first failure is recorded and every later operation on the resource
//!   is refused with that same error;
//! - a deleted resource refuses everything with [`AltusError::Deleted`];
//! - name and snapshot are published together, so readers never observe a
//!   half-updated resource.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::GlobalConfig;
use crate::error::{AltusError, Result};
use crate::naming::{Collection, ResourceName};
use crate::scheduler::{self, ResourceFuture};

/// Whether a façade call runs in the caller's task or on the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Run now; the call returns once the work (and anything queued before
    /// it on the same resource) is finished.
    #[default]
    Inline,
    /// Queue the work on the deferred-execution pool and return immediately.
    Deferred,
}

/// Per-call options accepted by every mutating façade method.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallOptions {
    pub mode: RunMode,
    /// Overall deadline for the call body, polling included.
    pub timeout: Option<Duration>,
}

impl CallOptions {
    /// Options for an inline call, the default.
    #[must_use]
    pub fn inline() -> Self {
        Self::default()
    }

    /// Options for a deferred call.
    #[must_use]
    pub fn deferred() -> Self {
        Self { mode: RunMode::Deferred, timeout: None }
    }

    /// Sets the overall deadline for the call body.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

struct CellState<P> {
    name: Option<ResourceName>,
    snapshot: Option<P>,
    pending: Option<ResourceFuture>,
    failure: Option<AltusError>,
    deleted: bool,
}

/// State holder shared by a façade and its queued work.
pub struct ResourceCell<P> {
    state: RwLock<CellState<P>>,
}

impl<P> ResourceCell<P> {
    /// A cell for a resource that does not exist yet (deferred creation).
    #[must_use]
    pub fn new_empty() -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(CellState {
                name: None,
                snapshot: None,
                pending: None,
                failure: None,
                deleted: false,
            }),
        })
    }

    /// A cell for a resource that is already known.
    #[must_use]
    pub fn new_fulfilled(name: ResourceName, snapshot: P) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(CellState {
                name: Some(name),
                snapshot: Some(snapshot),
                pending: None,
                failure: None,
                deleted: false,
            }),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, CellState<P>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CellState<P>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Canonical name, `None` until creation has completed.
    #[must_use]
    pub fn name(&self) -> Option<ResourceName> {
        self.read().name.clone()
    }

    /// Last known server snapshot, `None` until creation has completed.
    #[must_use]
    pub fn snapshot(&self) -> Option<P>
    where
        P: Clone,
    {
        self.read().snapshot.clone()
    }

    /// Name and snapshot read under one lock.
    #[must_use]
    pub fn name_and_snapshot(&self) -> (Option<ResourceName>, Option<P>)
    where
        P: Clone,
    {
        let state = self.read();
        (state.name.clone(), state.snapshot.clone())
    }

    /// The most recently queued future, if it has not been drained yet.
    #[must_use]
    pub fn pending(&self) -> Option<ResourceFuture> {
        self.read().pending.clone()
    }

    /// The first error recorded against this resource, if any.
    #[must_use]
    pub fn failure(&self) -> Option<AltusError> {
        self.read().failure.clone()
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.read().deleted
    }

    /// Publishes name and snapshot together.
    pub fn fulfill(&self, name: ResourceName, snapshot: P) {
        let mut state = self.write();
        state.name = Some(name);
        state.snapshot = Some(snapshot);
    }

    /// Replaces the snapshot of an already-named resource.
    pub fn update_snapshot(&self, snapshot: P) {
        self.write().snapshot = Some(snapshot);
    }

    /// Records the first failure; later ones are kept out so the original
    /// error is what every subsequent call reports.
    pub fn record_failure(&self, error: &AltusError) {
        let mut state = self.write();
        if state.failure.is_none() {
            debug!(error = %error, "Recording terminal resource failure");
            state.failure = Some(error.clone());
        }
    }

    /// Marks the resource deleted; every later operation is refused.
    pub fn mark_deleted(&self) {
        self.write().deleted = true;
    }

    /// Checks that the resource still accepts operations.
    ///
    /// # Errors
    /// The recorded first failure, or [`AltusError::Deleted`] after deletion.
    pub fn ensure_usable(&self) -> Result<()> {
        let state = self.read();
        if let Some(error) = &state.failure {
            return Err(error.clone());
        }
        if state.deleted {
            return Err(deleted_error(state.name.as_ref()));
        }
        Ok(())
    }

    /// Queues `body` behind whatever is already pending on this resource.
    ///
    /// The previous pending future (if any) becomes the first dependency, so
    /// work on one resource runs in submission order; `extra_deps` carry
    /// cross-resource dependencies. The body receives the future's
    /// cancellation token for forwarding to long-running operations. A body
    /// failure is recorded on the cell before the returned future settles.
    ///
    /// # Errors
    /// Refuses immediately when the resource already failed or was deleted.
    pub(crate) fn dispatch<F, Fut>(
        self: &Arc<Self>,
        label: impl Into<String>,
        extra_deps: Vec<ResourceFuture>,
        body: F,
    ) -> Result<ResourceFuture>
    where
        P: Send + Sync + 'static,
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send,
    {
        let mut state = self.write();
        if let Some(error) = &state.failure {
            return Err(error.clone());
        }
        if state.deleted {
            return Err(deleted_error(state.name.as_ref()));
        }

        let mut deps = Vec::with_capacity(extra_deps.len() + 1);
        if let Some(current) = &state.pending {
            deps.push(current.clone());
        }
        deps.extend(extra_deps);

        let cell = Arc::clone(self);
        let future = scheduler::global().submit(label, deps, move |upstream, cancel| async move {
            let result = match upstream {
                Ok(()) => body(cancel).await,
                Err(error) => Err(error),
            };
            if let Err(error) = result {
                cell.record_failure(&error);
                return Err(error);
            }
            Ok(())
        });
        state.pending = Some(future.clone());
        Ok(future)
    }

    /// Drains queued work, then reports the resource's terminal error if one
    /// was recorded. Safe to call repeatedly.
    ///
    /// # Errors
    /// The first error recorded against this resource.
    pub async fn wait(&self) -> Result<()> {
        loop {
            let Some(future) = self.pending() else { break };
            let outcome = future.outcome().await;
            let mut state = self.write();
            if let Err(error) = outcome {
                // Settled futures normally record their own failure; this
                // covers futures aborted by scheduler shutdown.
                if state.failure.is_none() {
                    state.failure = Some(error);
                }
            }
            if state.pending.as_ref().map(ResourceFuture::id) == Some(future.id()) {
                state.pending = None;
            }
        }
        match self.read().failure.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl<P> std::fmt::Debug for ResourceCell<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("ResourceCell")
            .field("name", &state.name)
            .field("has_snapshot", &state.snapshot.is_some())
            .field("pending", &state.pending.is_some())
            .field("failure", &state.failure)
            .field("deleted", &state.deleted)
            .finish()
    }
}

fn deleted_error(name: Option<&ResourceName>) -> AltusError {
    match name {
        Some(name) => AltusError::Deleted(name.to_string()),
        None => AltusError::Deleted("resource".to_string()),
    }
}

/// Resolves a caller-supplied identifier to a canonical name.
///
/// Accepts either a full canonical name (which must address `collection`) or
/// a bare id completed from explicit arguments and configured defaults.
///
/// # Errors
/// [`AltusError::BadName`] for malformed or mismatched full names,
/// [`AltusError::BadArgument`] when a bare id cannot be completed.
pub(crate) fn resolve_name(
    config: &GlobalConfig,
    collection: Collection,
    value: &str,
    project: Option<&str>,
    location: Option<&str>,
) -> Result<ResourceName> {
    if value.contains('/') {
        ResourceName::parse_in(collection, value)
    } else {
        let project = config.resolved_project(project)?;
        let location = config.resolved_location(location)?;
        ResourceName::new(project, location, collection, value)
    }
}

/// Checks a fetched resource's metadata schema against what a façade
/// accepts. An empty accept list takes anything.
///
/// # Errors
/// [`AltusError::WrongKind`] naming both sides on a mismatch.
pub(crate) fn check_schema(kind: &str, accepted: &[&str], actual: &str) -> Result<()> {
    if accepted.is_empty() || accepted.contains(&actual) {
        return Ok(());
    }
    Err(AltusError::WrongKind(format!(
        "{kind} expected a metadata schema in {accepted:?}, got {actual:?}"
    )))
}

/// Runs `fut` under an optional overall deadline.
///
/// # Errors
/// [`AltusError::DeadlineExceeded`] when the deadline passes first.
pub(crate) async fn with_deadline<T, Fut>(
    timeout: Option<Duration>,
    what: &str,
    fut: Fut,
) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(AltusError::DeadlineExceeded(format!(
                "{what} did not finish within {limit:?}"
            ))),
        },
        None => fut.await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::time::sleep;

    use super::*;

    fn dataset_name(id: &str) -> ResourceName {
        ResourceName::new("p", "l", Collection::Datasets, id).unwrap()
    }

    #[test]
    fn test_cell_publishes_name_and_snapshot_together() {
        let cell: Arc<ResourceCell<String>> = ResourceCell::new_empty();
        assert_eq!(cell.name_and_snapshot(), (None, None));

        cell.fulfill(dataset_name("1"), "snapshot".to_string());
        let (name, snapshot) = cell.name_and_snapshot();
        assert_eq!(name.unwrap().id(), "1");
        assert_eq!(snapshot.as_deref(), Some("snapshot"));
    }

    #[test]
    fn test_first_failure_wins() {
        let cell: Arc<ResourceCell<String>> = ResourceCell::new_empty();
        cell.record_failure(&AltusError::Cancelled("first".to_string()));
        cell.record_failure(&AltusError::NotFound("second".to_string()));

        assert_eq!(cell.failure(), Some(AltusError::Cancelled("first".to_string())));
        let err = cell.ensure_usable().unwrap_err();
        assert_eq!(err, AltusError::Cancelled("first".to_string()));
    }

    #[test]
    fn test_deleted_cell_refuses_operations() {
        let cell = ResourceCell::new_fulfilled(dataset_name("2"), ());
        cell.mark_deleted();
        let err = cell.ensure_usable().unwrap_err();
        match err {
            AltusError::Deleted(msg) => assert!(msg.contains("datasets/2")),
            other => panic!("expected Deleted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_runs_in_submission_order() {
        let cell: Arc<ResourceCell<()>> = ResourceCell::new_empty();
        let log = Arc::new(Mutex::new(Vec::new()));

        let log_a = log.clone();
        cell.dispatch("test.first", Vec::new(), move |_cancel| async move {
            sleep(Duration::from_millis(20)).await;
            log_a.lock().unwrap().push(1);
            Ok(())
        })
        .unwrap();
        let log_b = log.clone();
        cell.dispatch("test.second", Vec::new(), move |_cancel| async move {
            log_b.lock().unwrap().push(2);
            Ok(())
        })
        .unwrap();

        cell.wait().await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
        assert!(cell.pending().is_none());
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_recorded_and_sticky() {
        let cell: Arc<ResourceCell<()>> = ResourceCell::new_empty();

        cell.dispatch("test.fails", Vec::new(), |_cancel| async {
            Err(AltusError::NotFound("no dataset".to_string()))
        })
        .unwrap();

        let err = cell.wait().await.unwrap_err();
        assert_eq!(err, AltusError::NotFound("no dataset".to_string()));

        // Later dispatches are refused with the same first error.
        let err = cell
            .dispatch("test.after", Vec::new(), |_cancel| async { Ok(()) })
            .unwrap_err();
        assert_eq!(err, AltusError::NotFound("no dataset".to_string()));

        // And wait stays on that error.
        let err = cell.wait().await.unwrap_err();
        assert_eq!(err, AltusError::NotFound("no dataset".to_string()));
    }

    #[tokio::test]
    async fn test_chained_work_fails_as_dependency_failed() {
        let cell: Arc<ResourceCell<()>> = ResourceCell::new_empty();

        cell.dispatch("test.fails", Vec::new(), |_cancel| async {
            Err(AltusError::Cancelled("user asked".to_string()))
        })
        .unwrap();
        let chained = cell
            .dispatch("test.chained", Vec::new(), |_cancel| async { Ok(()) })
            .unwrap();

        let err = chained.outcome().await.unwrap_err();
        assert!(matches!(err, AltusError::DependencyFailed { .. }));
        assert_eq!(err.ultimate_cause(), &AltusError::Cancelled("user asked".to_string()));

        // The cell keeps the original failure, not the wrapped one.
        let err = cell.wait().await.unwrap_err();
        assert_eq!(err, AltusError::Cancelled("user asked".to_string()));
    }

    #[tokio::test]
    async fn test_wait_is_idempotent_after_success() {
        let cell: Arc<ResourceCell<u32>> = ResourceCell::new_empty();
        let target = cell.clone();
        cell.dispatch("test.create", Vec::new(), move |_cancel| async move {
            target.fulfill(dataset_name("7"), 7);
            Ok(())
        })
        .unwrap();

        cell.wait().await.unwrap();
        cell.wait().await.unwrap();
        assert_eq!(cell.snapshot(), Some(7));
    }

    #[test]
    fn test_resolve_name_accepts_full_name_and_bare_id() {
        let config = GlobalConfig {
            project: Some("my-prj".to_string()),
            location: Some("us-central1".to_string()),
            ..GlobalConfig::default()
        };

        let from_id = resolve_name(&config, Collection::Datasets, "456", None, None).unwrap();
        assert_eq!(
            from_id.to_string(),
            "projects/my-prj/locations/us-central1/datasets/456"
        );

        let from_name = resolve_name(
            &config,
            Collection::Datasets,
            "projects/other/locations/eu-west4/datasets/9",
            None,
            None,
        )
        .unwrap();
        assert_eq!(from_name.project(), "other");

        let explicit =
            resolve_name(&config, Collection::Datasets, "456", Some("p2"), Some("l2")).unwrap();
        assert_eq!(explicit.to_string(), "projects/p2/locations/l2/datasets/456");
    }

    #[test]
    fn test_resolve_name_rejects_mismatched_collection() {
        let config = GlobalConfig::default();
        let err = resolve_name(
            &config,
            Collection::Datasets,
            "projects/p/locations/l/models/1",
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AltusError::BadName(_)));
    }

    #[test]
    fn test_resolve_name_needs_defaults_for_bare_id() {
        let config = GlobalConfig::default();
        let err = resolve_name(&config, Collection::Datasets, "456", None, None).unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));
    }

    #[test]
    fn test_check_schema() {
        assert!(check_schema("Dataset", &[], "anything").is_ok());
        assert!(check_schema("TabularDataset", &["a", "b"], "b").is_ok());

        let err = check_schema("ImageDataset", &["image"], "tabular").unwrap_err();
        match err {
            AltusError::WrongKind(msg) => {
                assert!(msg.contains("ImageDataset"));
                assert!(msg.contains("tabular"));
            }
            other => panic!("expected WrongKind, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_with_deadline() {
        let ok: Result<u32> =
            with_deadline(Some(Duration::from_secs(1)), "quick call", async { Ok(5) }).await;
        assert_eq!(ok.unwrap(), 5);

        let err: Result<u32> = with_deadline(Some(Duration::from_millis(5)), "slow call", async {
            sleep(Duration::from_secs(60)).await;
            Ok(5)
        })
        .await;
        assert!(matches!(err.unwrap_err(), AltusError::DeadlineExceeded(_)));
    }

    #[tokio::test]
    async fn test_cancelled_work_fails_the_cell_and_its_chain() {
        let cell: Arc<ResourceCell<()>> = ResourceCell::new_empty();

        // First queued work never starts: it waits on a gate we keep closed.
        let (_gate_tx, gate) = crate::scheduler::ResourceFuture::test_pair();
        let create = cell
            .dispatch("test.create", vec![gate], |_cancel| async { Ok(()) })
            .unwrap();
        let import = cell
            .dispatch("test.import", Vec::new(), |_cancel| async { Ok(()) })
            .unwrap();

        create.cancel();

        let err = cell.wait().await.unwrap_err();
        assert!(matches!(err, AltusError::Cancelled(_)), "got {err:?}");

        let err = import.outcome().await.unwrap_err();
        assert!(matches!(err, AltusError::DependencyFailed { .. }));
        assert!(matches!(err.ultimate_cause(), AltusError::Cancelled(_)));
    }

    #[test]
    fn test_run_mode_defaults_to_inline() {
        assert_eq!(CallOptions::default().mode, RunMode::Inline);
        assert_eq!(CallOptions::inline().mode, RunMode::Inline);
        assert_eq!(CallOptions::deferred().mode, RunMode::Deferred);
        let with_limit = CallOptions::deferred().with_timeout(Duration::from_secs(3));
        assert_eq!(with_limit.timeout, Some(Duration::from_secs(3)));
    }
}
