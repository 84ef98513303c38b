//! Deferred execution: the process-wide worker pool and its futures.
//!
//! Every deferred façade call becomes one [`ResourceFuture`] submitted to the
//! [`Scheduler`]. A future first awaits the futures it depends on, then runs
//! its body under a pool permit. Dependency waiting holds no permit, so a
//! pool full of blocked waiters cannot starve the work they are waiting for.
//!
//! Ordering guarantees:
//! - a future's body never starts before every dependency is terminal;
//! - dependency failures short-circuit the body and surface as
//!   [`AltusError::DependencyFailed`];
//! - shutdown drains within a bound, then aborts what is left.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use tokio::sync::{watch, Semaphore};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config;
use crate::error::{AltusError, Result};

/// Where a deferred future currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FutureState {
    Pending,
    Completed,
    Failed(AltusError),
}

/// Observable handle to one deferred unit of work.
///
/// Clones share the same underlying state; any number of tasks can await the
/// outcome concurrently.
#[derive(Clone)]
pub struct ResourceFuture {
    id: Uuid,
    state: watch::Receiver<FutureState>,
    cancel: CancellationToken,
}

impl ResourceFuture {
    /// Stable identity of this future, used by resources to recognise their
    /// own pending slot.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current state without waiting.
    #[must_use]
    pub fn snapshot(&self) -> FutureState {
        self.state.borrow().clone()
    }

    /// Whether the future has reached a terminal state.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(self.snapshot(), FutureState::Pending)
    }

    /// Requests cancellation. Idempotent, and a no-op once settled.
    ///
    /// Work that has not started yet settles as [`AltusError::Cancelled`]
    /// without running. A body that is already running observes the request
    /// at its next wait point and forwards it to its in-flight operation,
    /// if it has one.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the terminal state and maps it to a `Result`.
    ///
    /// # Errors
    /// Returns the future's failure, or [`AltusError::Aborted`] when the
    /// scheduler dropped the future without settling it.
    pub async fn outcome(&self) -> Result<()> {
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(|state| !matches!(state, FutureState::Pending))
            .await
            .map(|state| state.clone())
            .unwrap_or_else(|_| {
                FutureState::Failed(AltusError::Aborted(
                    "future was dropped before completing".to_string(),
                ))
            });
        match state {
            FutureState::Completed => Ok(()),
            FutureState::Failed(error) => Err(error),
            FutureState::Pending => Err(AltusError::Aborted(
                "future settled without a terminal state".to_string(),
            )),
        }
    }

    #[cfg(test)]
    pub(crate) fn test_pair() -> (watch::Sender<FutureState>, Self) {
        let (tx, rx) = watch::channel(FutureState::Pending);
        (tx, Self { id: Uuid::new_v4(), state: rx, cancel: CancellationToken::new() })
    }
}

impl std::fmt::Debug for ResourceFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceFuture")
            .field("id", &self.id)
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}

/// Pool counters, mostly for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    pub submitted: u64,
    pub completed: u64,
    pub in_flight: usize,
}

/// The deferred-execution pool.
///
/// One global instance serves the whole process (see [`global`]); dedicated
/// instances exist only in tests.
pub struct Scheduler {
    semaphore: Arc<Semaphore>,
    tracker: TaskTracker,
    root: CancellationToken,
    submitted: AtomicU64,
    completed: Arc<AtomicU64>,
}

impl Scheduler {
    /// Creates a pool that runs at most `workers` bodies concurrently.
    #[must_use]
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        debug!(workers, "Starting deferred-execution pool");
        Self {
            semaphore: Arc::new(Semaphore::new(workers)),
            tracker: TaskTracker::new(),
            root: CancellationToken::new(),
            submitted: AtomicU64::new(0),
            completed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Submits one unit of deferred work.
    ///
    /// `deps` are awaited in registration order before anything else. The
    /// body is invoked exactly once with two things: the upstream result
    /// (`Ok(())` when every dependency completed, otherwise the
    /// already-wrapped [`AltusError::DependencyFailed`],
    /// [`AltusError::Cancelled`] or [`AltusError::Aborted`], so the body can
    /// record the outcome on its resource), and this future's own
    /// cancellation token for forwarding to in-flight operations. Whatever
    /// the body returns becomes the future's terminal state.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit<F, Fut>(
        &self,
        label: impl Into<String>,
        deps: Vec<ResourceFuture>,
        body: F,
    ) -> ResourceFuture
    where
        F: FnOnce(Result<()>, CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send,
    {
        let label = label.into();
        let id = Uuid::new_v4();
        let (tx, rx) = watch::channel(FutureState::Pending);
        let shutdown = self.root.child_token();
        let cancel = CancellationToken::new();
        let future = ResourceFuture { id, state: rx, cancel: cancel.clone() };

        self.submitted.fetch_add(1, Ordering::Relaxed);
        debug!(future = %label, id = %id, deps = deps.len(), "Submitting deferred work");

        let semaphore = self.semaphore.clone();
        let completed = self.completed.clone();

        self.tracker.spawn(async move {
            let upstream = wait_for_dependencies(&label, &deps, &shutdown, &cancel).await;

            let result = match upstream {
                Ok(()) => {
                    // Shutdown and cancellation are checked before the permit
                    // so work never starts once either has been requested.
                    let permit = tokio::select! {
                        biased;
                        () = shutdown.cancelled() => Err(aborted()),
                        () = cancel.cancelled() => Err(user_cancelled()),
                        permit = semaphore.acquire_owned() => permit.map_err(|_| aborted()),
                    };
                    match permit {
                        Ok(_permit) => {
                            tokio::select! {
                                () = shutdown.cancelled() => Err(aborted()),
                                result = body(Ok(()), cancel.clone()) => result,
                            }
                        }
                        Err(error) => body(Err(error), cancel.clone()).await,
                    }
                }
                Err(error) => body(Err(error), cancel.clone()).await,
            };

            match &result {
                Ok(()) => debug!(future = %label, id = %id, "Deferred work completed"),
                Err(error) => {
                    debug!(future = %label, id = %id, error = %error, "Deferred work failed");
                }
            }
            completed.fetch_add(1, Ordering::Relaxed);
            let _ = tx.send(match result {
                Ok(()) => FutureState::Completed,
                Err(error) => FutureState::Failed(error),
            });
        });

        future
    }

    /// Current pool counters.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            in_flight: self.tracker.len(),
        }
    }

    /// Drains outstanding futures for up to `drain`, then aborts the rest.
    ///
    /// Futures aborted here (and any submitted afterwards) settle as
    /// [`AltusError::Aborted`].
    pub async fn shutdown(&self, drain: Duration) {
        info!(timeout = ?drain, outstanding = self.tracker.len(), "Scheduler shutdown: draining");
        self.tracker.close();
        if tokio::time::timeout(drain, self.tracker.wait()).await.is_err() {
            warn!(
                outstanding = self.tracker.len(),
                "Drain deadline passed, aborting outstanding futures"
            );
        }
        self.root.cancel();
        self.tracker.wait().await;
        info!("Scheduler shut down");
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler").field("stats", &self.stats()).finish_non_exhaustive()
    }
}

async fn wait_for_dependencies(
    label: &str,
    deps: &[ResourceFuture],
    shutdown: &CancellationToken,
    cancel: &CancellationToken,
) -> Result<()> {
    for (index, dep) in deps.iter().enumerate() {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => return Err(aborted()),
            () = cancel.cancelled() => return Err(user_cancelled()),
            outcome = dep.outcome() => {
                if let Err(cause) = outcome {
                    debug!(future = %label, dep = index, cause = %cause, "Dependency failed, short-circuiting");
                    return Err(AltusError::dependency(cause));
                }
            }
        }
    }
    Ok(())
}

fn aborted() -> AltusError {
    AltusError::Aborted("deferred execution aborted by scheduler shutdown".to_string())
}

fn user_cancelled() -> AltusError {
    AltusError::Cancelled("deferred work cancelled before it ran".to_string())
}

static GLOBAL: OnceCell<Scheduler> = OnceCell::new();

/// The process-wide pool. Created on first use, sized from the global
/// configuration at that moment.
pub fn global() -> &'static Scheduler {
    GLOBAL.get_or_init(|| Scheduler::new(config::global().worker_threads))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use tokio::time::sleep;

    use super::*;

    #[tokio::test]
    async fn test_submit_runs_body() {
        let scheduler = Scheduler::new(2);
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();

        let future = scheduler.submit("test.body", Vec::new(), |up, _cancel| async move {
            up?;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        future.outcome().await.unwrap();
        assert!(ran.load(Ordering::SeqCst));
        let stats = scheduler.stats();
        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.completed, 1);
    }

    #[tokio::test]
    async fn test_dependencies_run_in_registration_order() {
        let scheduler = Scheduler::new(4);
        let log = Arc::new(Mutex::new(Vec::new()));

        let log_a = log.clone();
        let a = scheduler.submit("test.a", Vec::new(), |up, _cancel| async move {
            up?;
            sleep(Duration::from_millis(30)).await;
            log_a.lock().unwrap().push(1);
            Ok(())
        });
        let log_b = log.clone();
        let b = scheduler.submit("test.b", vec![a.clone()], |up, _cancel| async move {
            up?;
            log_b.lock().unwrap().push(2);
            Ok(())
        });
        let log_c = log.clone();
        let c = scheduler.submit("test.c", vec![a, b], |up, _cancel| async move {
            up?;
            log_c.lock().unwrap().push(3);
            Ok(())
        });

        c.outcome().await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_dependency_failure_short_circuits() {
        let scheduler = Scheduler::new(2);

        let a = scheduler.submit("test.fails", Vec::new(), |up, _cancel| async move {
            up?;
            Err(AltusError::NotFound("no such dataset".to_string()))
        });
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let b = scheduler.submit("test.downstream", vec![a], |up, _cancel| async move {
            up?;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        let error = b.outcome().await.unwrap_err();
        assert!(matches!(error, AltusError::DependencyFailed { .. }));
        assert!(matches!(error.ultimate_cause(), AltusError::NotFound(_)));
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_pool_limits_concurrent_bodies() {
        let scheduler = Scheduler::new(2);
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let futures: Vec<_> = (0..4)
            .map(|i| {
                let current = current.clone();
                let peak = peak.clone();
                scheduler.submit(format!("test.worker{i}"), Vec::new(), move |up, _cancel| async move {
                    up?;
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    sleep(Duration::from_millis(25)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                })
            })
            .collect();

        for future in futures {
            future.outcome().await.unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_dependency_wait_holds_no_permit() {
        let scheduler = Scheduler::new(1);
        let (gate_tx, gate) = ResourceFuture::test_pair();

        let blocked = scheduler.submit("test.blocked", vec![gate], |up, _cancel| async move {
            up?;
            Ok(())
        });
        sleep(Duration::from_millis(10)).await;

        // With a single permit, this only completes if the dependency wait
        // above is not holding it.
        let free = scheduler.submit("test.free", Vec::new(), |up, _cancel| async move {
            up?;
            Ok(())
        });
        free.outcome().await.unwrap();
        assert!(!blocked.is_settled());

        gate_tx.send(FutureState::Completed).unwrap();
        blocked.outcome().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_aborts_unfinished_work() {
        let scheduler = Scheduler::new(2);

        let quick = scheduler.submit("test.quick", Vec::new(), |up, _cancel| async move {
            up?;
            Ok(())
        });
        let stuck = scheduler.submit("test.stuck", Vec::new(), |up, _cancel| async move {
            up?;
            sleep(Duration::from_secs(600)).await;
            Ok(())
        });

        scheduler.shutdown(Duration::from_millis(100)).await;

        quick.outcome().await.unwrap();
        assert!(matches!(stuck.outcome().await.unwrap_err(), AltusError::Aborted(_)));
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_resolves_aborted() {
        let scheduler = Scheduler::new(1);
        scheduler.shutdown(Duration::from_millis(10)).await;

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let late = scheduler.submit("test.late", Vec::new(), |up, _cancel| async move {
            up?;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        assert!(matches!(late.outcome().await.unwrap_err(), AltusError::Aborted(_)));
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_future_clones_share_outcome() {
        let scheduler = Scheduler::new(1);
        let future = scheduler.submit("test.shared", Vec::new(), |up, _cancel| async move { up });
        let twin = future.clone();

        future.outcome().await.unwrap();
        twin.outcome().await.unwrap();
        assert_eq!(future.id(), twin.id());
        assert_eq!(twin.snapshot(), FutureState::Completed);
    }

    #[tokio::test]
    async fn test_cancel_before_start_resolves_cancelled() {
        let scheduler = Scheduler::new(2);
        let (_gate_tx, gate) = ResourceFuture::test_pair();

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let victim = scheduler.submit("test.victim", vec![gate], |up, _cancel| async move {
            up?;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });
        sleep(Duration::from_millis(10)).await;

        victim.cancel();
        let error = victim.outcome().await.unwrap_err();
        assert!(matches!(error, AltusError::Cancelled(_)), "got {error:?}");
        assert!(!ran.load(Ordering::SeqCst));

        // Dependents of a cancelled future fail as dependency-failed with
        // the cancellation as the ultimate cause.
        let downstream =
            scheduler.submit("test.downstream", vec![victim], |up, _cancel| async move { up });
        let error = downstream.outcome().await.unwrap_err();
        assert!(matches!(error, AltusError::DependencyFailed { .. }));
        assert!(matches!(error.ultimate_cause(), AltusError::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_cancel_after_completion_is_a_no_op() {
        let scheduler = Scheduler::new(1);
        let future = scheduler.submit("test.done", Vec::new(), |up, _cancel| async move { up });
        future.outcome().await.unwrap();

        future.cancel();
        future.cancel();
        assert_eq!(future.snapshot(), FutureState::Completed);
        future.outcome().await.unwrap();
    }

    #[tokio::test]
    async fn test_running_body_sees_cancellation_request() {
        let scheduler = Scheduler::new(1);
        let future = scheduler.submit("test.cooperative", Vec::new(), |up, cancel| async move {
            up?;
            cancel.cancelled().await;
            Err(AltusError::Cancelled("stopped at wait point".to_string()))
        });
        sleep(Duration::from_millis(10)).await;

        future.cancel();
        let error = future.outcome().await.unwrap_err();
        assert!(matches!(error, AltusError::Cancelled(_)));
    }
}

