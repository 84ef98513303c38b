//! Long-running operation handles.
//!
//! Mutating RPCs return an operation name instead of a result. An
//! [`OperationHandle`] turns that name into something callers can await:
//! it polls the operations service with exponential backoff until the
//! operation reaches a terminal state, then caches that outcome for good.

use std::sync::Arc;
use std::time::Duration;

use prost_types::Any;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use altus_proto::v1 as pb;
use altus_proto::v1::services::OperationsService;

use crate::context::SdkContext;
use crate::error::{AltusError, Result};

/// Backoff tuning for operation and pipeline polling.
///
/// Defaults poll at 1s, doubling up to a 10s ceiling, with no overall
/// deadline. Tests against local backends shrink the intervals.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    /// Overall deadline applied by `wait` when the caller passes none.
    pub default_timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(10),
            default_timeout: None,
        }
    }
}

impl PollConfig {
    /// Millisecond-scale intervals for in-process backends.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            initial_interval: Duration::from_millis(1),
            max_interval: Duration::from_millis(5),
            default_timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// The operation's own terminal outcome: a success payload (if the RPC has
/// one) or the failure recorded by the server.
type TerminalOutcome = std::result::Result<Option<Any>, AltusError>;

/// Handle to one long-running operation.
///
/// Cloning is cheap and every clone shares the terminal-outcome cache, so
/// concurrent `wait` calls poll at most once.
#[derive(Clone)]
pub struct OperationHandle {
    inner: Arc<OperationInner>,
}

struct OperationInner {
    name: String,
    operations: Arc<dyn OperationsService>,
    poll: PollConfig,
    terminal: OnceCell<TerminalOutcome>,
}

impl OperationHandle {
    /// Wraps a known operation name.
    #[must_use]
    pub fn new(ctx: &SdkContext, name: String) -> Self {
        Self {
            inner: Arc::new(OperationInner {
                name,
                operations: ctx.operations(),
                poll: ctx.poll_config().clone(),
                terminal: OnceCell::new(),
            }),
        }
    }

    /// Wraps an operation message, seeding the cache when the server already
    /// reports it done (small operations often complete inline).
    #[must_use]
    pub fn from_operation(ctx: &SdkContext, operation: pb::Operation) -> Self {
        let handle = Self::new(ctx, operation.name.clone());
        if operation.done {
            let _ = handle.inner.terminal.set(outcome_of(operation));
        }
        handle
    }

    /// The server-assigned operation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Blocks until the operation is terminal, returning its payload.
    ///
    /// Idempotent: the first terminal observation is cached, and later calls
    /// return it without touching the network.
    ///
    /// # Errors
    /// Returns the operation's own failure once it is terminal, or
    /// [`AltusError::DeadlineExceeded`] / transport errors from the polling
    /// itself (those are not cached; the operation may still finish).
    pub async fn wait(&self) -> Result<Option<Any>> {
        self.wait_with_timeout(self.inner.poll.default_timeout).await
    }

    /// Like [`OperationHandle::wait`] with an explicit overall deadline.
    pub async fn wait_with_timeout(&self, timeout: Option<Duration>) -> Result<Option<Any>> {
        let outcome = self
            .inner
            .terminal
            .get_or_try_init(|| self.poll_until_terminal(timeout))
            .await?;
        outcome.clone()
    }

    /// Waits, then unpacks the payload as `M`.
    ///
    /// # Errors
    /// Everything `wait` returns, plus [`AltusError::Server`] when the
    /// payload is missing or of the wrong type.
    pub async fn wait_and_unpack<M: prost::Name + Default>(&self) -> Result<M> {
        self.unpack::<M>(self.wait().await?)
    }

    /// Cancellable variant of [`OperationHandle::wait_and_unpack`], with the
    /// interruption semantics of [`OperationHandle::wait_with_cancel`].
    pub async fn wait_and_unpack_with_cancel<M: prost::Name + Default>(
        &self,
        cancel: &CancellationToken,
        timeout: Option<Duration>,
    ) -> Result<M> {
        self.unpack::<M>(self.wait_with_cancel(cancel, timeout).await?)
    }

    fn unpack<M: prost::Name + Default>(&self, payload: Option<Any>) -> Result<M> {
        match payload {
            Some(any) => Ok(any.to_msg::<M>()?),
            None => Err(AltusError::Server(format!(
                "operation {} completed without a response payload",
                self.inner.name
            ))),
        }
    }

    /// Like [`OperationHandle::wait_with_timeout`], but gives up when
    /// `cancel` fires first: the cancellation is forwarded to the server and
    /// the call returns [`AltusError::Cancelled`] without waiting for the
    /// operation to acknowledge it.
    pub async fn wait_with_cancel(
        &self,
        cancel: &CancellationToken,
        timeout: Option<Duration>,
    ) -> Result<Option<Any>> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(operation = %self.inner.name, "Wait interrupted, forwarding cancellation");
                if let Err(error) = self.cancel().await {
                    debug!(operation = %self.inner.name, error = %error, "Cancel request failed");
                }
                Err(AltusError::Cancelled(format!(
                    "wait on operation {} was cancelled",
                    self.inner.name
                )))
            }
            outcome = self.wait_with_timeout(timeout) => outcome,
        }
    }

    /// Asks the server to cancel the operation and returns immediately.
    ///
    /// Cancellation lands asynchronously: the operation reaches a terminal
    /// `Cancelled` outcome later, observable through `wait`.
    pub async fn cancel(&self) -> Result<()> {
        debug!(operation = %self.inner.name, "Requesting operation cancellation");
        self.inner
            .operations
            .cancel_operation(pb::CancelOperationRequest { name: self.inner.name.clone() })
            .await
            .map_err(AltusError::from)?;
        Ok(())
    }

    /// Whether the operation is terminal, refreshing once when unknown.
    pub async fn done(&self) -> Result<bool> {
        if self.inner.terminal.get().is_some() {
            return Ok(true);
        }
        let operation = self
            .inner
            .operations
            .get_operation(pb::GetOperationRequest { name: self.inner.name.clone() })
            .await
            .map_err(AltusError::from)?;
        if operation.done {
            let _ = self.inner.terminal.set(outcome_of(operation));
            return Ok(true);
        }
        Ok(false)
    }

    async fn poll_until_terminal(&self, timeout: Option<Duration>) -> Result<TerminalOutcome> {
        debug!(operation = %self.inner.name, "Waiting for operation");

        let start = Instant::now();
        let mut delay = self.inner.poll.initial_interval;
        let max_delay = self.inner.poll.max_interval;

        loop {
            if let Some(limit) = timeout {
                if start.elapsed() > limit {
                    return Err(AltusError::DeadlineExceeded(format!(
                        "operation {} still running after {limit:?}",
                        self.inner.name
                    )));
                }
            }

            let operation = self
                .inner
                .operations
                .get_operation(pb::GetOperationRequest { name: self.inner.name.clone() })
                .await
                .map_err(AltusError::from)?;

            if operation.done {
                debug!(operation = %self.inner.name, "Operation is terminal");
                return Ok(outcome_of(operation));
            }

            debug!(
                operation = %self.inner.name,
                elapsed = ?start.elapsed(),
                "Operation still running, backing off"
            );
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(max_delay);
        }
    }
}

impl std::fmt::Debug for OperationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationHandle")
            .field("name", &self.inner.name)
            .field("terminal", &self.inner.terminal.get().is_some())
            .finish_non_exhaustive()
    }
}

fn outcome_of(operation: pb::Operation) -> TerminalOutcome {
    match operation.result {
        Some(pb::operation::Result::Error(status)) => Err(status.into()),
        Some(pb::operation::Result::Response(any)) => Ok(Some(any)),
        None => Ok(None),
    }
}
