//! Tensorboard façades: the telemetry side of the platform.
//!
//! The family is a containment chain: a [`Tensorboard`] holds experiments,
//! an experiment holds runs, a run holds time series. Only the tensorboard
//! itself is operation-backed; children are created with direct RPCs. Direct
//! methods first drain whatever is queued on the receiver, so creating an
//! experiment right after a deferred tensorboard creation works without the
//! caller waiting in between.
//!
//! Telemetry writes ([`TensorboardRun::write_scalars`]) are deferrable and
//! queue per run, so a training loop can stream points without blocking and
//! still rely on write order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use prost_types::Timestamp;
use tracing::debug;

use altus_proto::v1 as pb;
use altus_proto::v1::services::BlobDataStream;

use crate::context::SdkContext;
use crate::error::{AltusError, Result};
use crate::naming::{Collection, ResourceName};
use crate::operation::OperationHandle;
use crate::resource::{resolve_name, with_deadline, CallOptions, ResourceCell, RunMode};
use crate::scheduler::ResourceFuture;

use super::{datetime_of, finish};

/// One run in a [`TensorboardExperiment::batch_create_runs`] request.
#[derive(Debug, Clone, Default)]
pub struct RunSpec {
    /// Caller-chosen id, becomes the final segment of the run's name.
    pub run_id: String,
    pub display_name: String,
    pub labels: HashMap<String, String>,
}

/// Handle to one tensorboard, possibly still being created.
#[derive(Clone)]
pub struct Tensorboard {
    ctx: SdkContext,
    cell: Arc<ResourceCell<pb::Tensorboard>>,
}

impl std::fmt::Debug for Tensorboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensorboard").field("cell", &self.cell).finish_non_exhaustive()
    }
}

impl Tensorboard {
    /// Creates a tensorboard under the configured project and location.
    ///
    /// In deferred mode the returned handle is a placeholder that fills in
    /// once the creation operation completes; in inline mode the call
    /// returns the finished handle.
    ///
    /// # Errors
    /// [`AltusError::BadArgument`] for an empty display name, and in inline
    /// mode whatever the creation itself hits.
    pub async fn create(
        ctx: &SdkContext,
        display_name: impl Into<String>,
        options: CallOptions,
    ) -> Result<Self> {
        let display_name = display_name.into();
        if display_name.is_empty() {
            return Err(AltusError::BadArgument("display_name must not be empty".to_string()));
        }
        let parent = ctx.config().common_parent(None, None)?;
        let request = pb::CreateTensorboardRequest {
            parent,
            tensorboard: Some(pb::Tensorboard {
                display_name,
                encryption_spec: ctx.config().encryption_spec(),
                ..Default::default()
            }),
        };

        let handle = Self { ctx: ctx.clone(), cell: ResourceCell::new_empty() };
        let ctx = ctx.clone();
        let cell = handle.cell.clone();
        let timeout = options.timeout;
        handle.cell.dispatch("tensorboard.create", Vec::new(), move |cancel| async move {
            with_deadline(timeout, "tensorboard creation", async move {
                debug!(parent = %request.parent, "Creating tensorboard");
                let operation = ctx
                    .tensorboards()
                    .create_tensorboard(request)
                    .await
                    .map_err(AltusError::from)?;
                let created: pb::Tensorboard = OperationHandle::from_operation(&ctx, operation)
                    .wait_and_unpack_with_cancel(&cancel, None)
                    .await?;
                let name = ResourceName::parse_in(Collection::Tensorboards, &created.name)?;
                cell.fulfill(name, created);
                Ok(())
            })
            .await
        })?;

        if options.mode == RunMode::Inline {
            handle.wait().await?;
        }
        Ok(handle)
    }

    /// Looks up an existing tensorboard by canonical name or bare id.
    pub async fn get(ctx: &SdkContext, name: &str) -> Result<Self> {
        Self::get_in(ctx, name, None, None).await
    }

    /// [`Tensorboard::get`] with explicit project and location for bare ids.
    pub async fn get_in(
        ctx: &SdkContext,
        name: &str,
        project: Option<&str>,
        location: Option<&str>,
    ) -> Result<Self> {
        let name = resolve_name(ctx.config(), Collection::Tensorboards, name, project, location)?;
        let tensorboard = ctx
            .tensorboards()
            .get_tensorboard(pb::GetTensorboardRequest { name: name.to_string() })
            .await
            .map_err(AltusError::from)?;
        Ok(Self { ctx: ctx.clone(), cell: ResourceCell::new_fulfilled(name, tensorboard) })
    }

    /// Creates an experiment under this tensorboard.
    ///
    /// Direct: the call drains queued work on this tensorboard (so a
    /// deferred creation resolves first), then issues one RPC.
    ///
    /// # Errors
    /// [`AltusError::BadArgument`] for an empty id,
    /// [`AltusError::AlreadyExists`] when the id is taken, and whatever
    /// queued work on this tensorboard failed with.
    pub async fn create_experiment(
        &self,
        experiment_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<TensorboardExperiment> {
        let experiment_id = experiment_id.into();
        if experiment_id.is_empty() {
            return Err(AltusError::BadArgument("experiment_id must not be empty".to_string()));
        }
        self.cell.ensure_usable()?;
        self.wait().await?;
        let Some(parent) = self.cell.name() else {
            return Err(AltusError::Server("tensorboard has no canonical name".to_string()));
        };
        debug!(tensorboard = %parent, experiment = %experiment_id, "Creating experiment");
        let experiment = self
            .ctx
            .tensorboards()
            .create_tensorboard_experiment(pb::CreateTensorboardExperimentRequest {
                parent: parent.to_string(),
                tensorboard_experiment: Some(pb::TensorboardExperiment {
                    display_name: display_name.into(),
                    ..Default::default()
                }),
                tensorboard_experiment_id: experiment_id,
            })
            .await
            .map_err(AltusError::from)?;
        let name = ResourceName::parse_in(Collection::TensorboardExperiments, &experiment.name)?;
        Ok(TensorboardExperiment {
            ctx: self.ctx.clone(),
            cell: ResourceCell::new_fulfilled(name, experiment),
        })
    }

    /// Deletes the tensorboard and marks this handle deleted.
    pub async fn delete(&self, options: CallOptions) -> Result<ResourceFuture> {
        let ctx = self.ctx.clone();
        let cell = self.cell.clone();
        let timeout = options.timeout;
        let future =
            self.cell.dispatch("tensorboard.delete", Vec::new(), move |cancel| async move {
                with_deadline(timeout, "tensorboard deletion", async move {
                    let Some(name) = cell.name() else {
                        return Err(AltusError::Server(
                            "tensorboard has no canonical name to delete".to_string(),
                        ));
                    };
                    debug!(tensorboard = %name, "Deleting tensorboard");
                    let operation = ctx
                        .tensorboards()
                        .delete_tensorboard(pb::DeleteTensorboardRequest { name: name.to_string() })
                        .await
                        .map_err(AltusError::from)?;
                    OperationHandle::from_operation(&ctx, operation)
                        .wait_with_cancel(&cancel, None)
                        .await?;
                    cell.mark_deleted();
                    Ok(())
                })
                .await
            })?;
        finish(future, options).await
    }

    /// Canonical name, `None` while a deferred creation is still running.
    #[must_use]
    pub fn resource_name(&self) -> Option<ResourceName> {
        self.cell.name()
    }

    /// Display name from the last known snapshot.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.cell.snapshot().map(|tensorboard| tensorboard.display_name)
    }

    /// Creation instant from the last known snapshot.
    #[must_use]
    pub fn create_time(&self) -> Option<DateTime<Utc>> {
        self.cell.snapshot().and_then(|tb| tb.create_time.as_ref().and_then(datetime_of))
    }

    /// Last known server snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Option<pb::Tensorboard> {
        self.cell.snapshot()
    }

    /// The most recently queued future on this tensorboard.
    #[must_use]
    pub fn pending(&self) -> Option<ResourceFuture> {
        self.cell.pending()
    }

    /// Drains queued work on this tensorboard.
    ///
    /// # Errors
    /// The first error any of that work hit.
    pub async fn wait(&self) -> Result<()> {
        self.cell.wait().await
    }
}

/// Handle to one experiment under a tensorboard.
#[derive(Clone)]
pub struct TensorboardExperiment {
    ctx: SdkContext,
    cell: Arc<ResourceCell<pb::TensorboardExperiment>>,
}

impl std::fmt::Debug for TensorboardExperiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorboardExperiment").field("cell", &self.cell).finish_non_exhaustive()
    }
}

impl TensorboardExperiment {
    /// Looks up an existing experiment by canonical name or bare id.
    pub async fn get(ctx: &SdkContext, name: &str) -> Result<Self> {
        let name =
            resolve_name(ctx.config(), Collection::TensorboardExperiments, name, None, None)?;
        let experiment = ctx
            .tensorboards()
            .get_tensorboard_experiment(pb::GetTensorboardExperimentRequest {
                name: name.to_string(),
            })
            .await
            .map_err(AltusError::from)?;
        Ok(Self { ctx: ctx.clone(), cell: ResourceCell::new_fulfilled(name, experiment) })
    }

    /// Creates one run under this experiment. Direct RPC.
    ///
    /// # Errors
    /// [`AltusError::BadArgument`] for an empty id,
    /// [`AltusError::AlreadyExists`] when the id is taken.
    pub async fn create_run(
        &self,
        run_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<TensorboardRun> {
        let run_id = run_id.into();
        if run_id.is_empty() {
            return Err(AltusError::BadArgument("run_id must not be empty".to_string()));
        }
        self.cell.ensure_usable()?;
        self.wait().await?;
        let Some(parent) = self.cell.name() else {
            return Err(AltusError::Server("experiment has no canonical name".to_string()));
        };
        debug!(experiment = %parent, run = %run_id, "Creating run");
        let run = self
            .ctx
            .tensorboards()
            .create_tensorboard_run(run_request(&parent, RunSpec {
                run_id,
                display_name: display_name.into(),
                labels: HashMap::new(),
            }))
            .await
            .map_err(AltusError::from)?;
        TensorboardRun::from_message(&self.ctx, run)
    }

    /// Creates several runs in one round trip. Direct RPC.
    ///
    /// # Errors
    /// [`AltusError::BadArgument`] when `specs` is empty or contains an
    /// empty id; [`AltusError::AlreadyExists`] when any id is taken, in
    /// which case no run is created.
    pub async fn batch_create_runs(&self, specs: Vec<RunSpec>) -> Result<Vec<TensorboardRun>> {
        if specs.is_empty() {
            return Err(AltusError::BadArgument(
                "batch_create_runs requires at least one run".to_string(),
            ));
        }
        if let Some(spec) = specs.iter().find(|spec| spec.run_id.is_empty()) {
            return Err(AltusError::BadArgument(format!(
                "run_id must not be empty (display name {:?})",
                spec.display_name
            )));
        }
        self.cell.ensure_usable()?;
        self.wait().await?;
        let Some(parent) = self.cell.name() else {
            return Err(AltusError::Server("experiment has no canonical name".to_string()));
        };
        debug!(experiment = %parent, runs = specs.len(), "Batch-creating runs");
        let response = self
            .ctx
            .tensorboards()
            .batch_create_tensorboard_runs(pb::BatchCreateTensorboardRunsRequest {
                parent: parent.to_string(),
                requests: specs.into_iter().map(|spec| run_request(&parent, spec)).collect(),
            })
            .await
            .map_err(AltusError::from)?;
        response
            .tensorboard_runs
            .into_iter()
            .map(|run| TensorboardRun::from_message(&self.ctx, run))
            .collect()
    }

    /// Deletes the experiment and marks this handle deleted.
    pub async fn delete(&self, options: CallOptions) -> Result<ResourceFuture> {
        let ctx = self.ctx.clone();
        let cell = self.cell.clone();
        let timeout = options.timeout;
        let future =
            self.cell.dispatch("experiment.delete", Vec::new(), move |cancel| async move {
                with_deadline(timeout, "experiment deletion", async move {
                    let Some(name) = cell.name() else {
                        return Err(AltusError::Server(
                            "experiment has no canonical name to delete".to_string(),
                        ));
                    };
                    debug!(experiment = %name, "Deleting experiment");
                    let operation = ctx
                        .tensorboards()
                        .delete_tensorboard_experiment(pb::DeleteTensorboardExperimentRequest {
                            name: name.to_string(),
                        })
                        .await
                        .map_err(AltusError::from)?;
                    OperationHandle::from_operation(&ctx, operation)
                        .wait_with_cancel(&cancel, None)
                        .await?;
                    cell.mark_deleted();
                    Ok(())
                })
                .await
            })?;
        finish(future, options).await
    }

    /// Canonical name.
    #[must_use]
    pub fn resource_name(&self) -> Option<ResourceName> {
        self.cell.name()
    }

    /// Display name from the last known snapshot.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.cell.snapshot().map(|experiment| experiment.display_name)
    }

    /// Drains queued work on this experiment.
    ///
    /// # Errors
    /// The first error any of that work hit.
    pub async fn wait(&self) -> Result<()> {
        self.cell.wait().await
    }
}

fn run_request(parent: &ResourceName, spec: RunSpec) -> pb::CreateTensorboardRunRequest {
    pb::CreateTensorboardRunRequest {
        parent: parent.to_string(),
        tensorboard_run: Some(pb::TensorboardRun {
            display_name: spec.display_name,
            labels: spec.labels,
            ..Default::default()
        }),
        tensorboard_run_id: spec.run_id,
    }
}

/// Handle to one run, the unit telemetry is written against.
#[derive(Clone)]
pub struct TensorboardRun {
    ctx: SdkContext,
    cell: Arc<ResourceCell<pb::TensorboardRun>>,
}

impl std::fmt::Debug for TensorboardRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorboardRun").field("cell", &self.cell).finish_non_exhaustive()
    }
}

impl TensorboardRun {
    fn from_message(ctx: &SdkContext, run: pb::TensorboardRun) -> Result<Self> {
        let name = ResourceName::parse_in(Collection::TensorboardRuns, &run.name)?;
        Ok(Self { ctx: ctx.clone(), cell: ResourceCell::new_fulfilled(name, run) })
    }

    /// Looks up an existing run by canonical name or bare id.
    pub async fn get(ctx: &SdkContext, name: &str) -> Result<Self> {
        let name = resolve_name(ctx.config(), Collection::TensorboardRuns, name, None, None)?;
        let run = ctx
            .tensorboards()
            .get_tensorboard_run(pb::GetTensorboardRunRequest { name: name.to_string() })
            .await
            .map_err(AltusError::from)?;
        Ok(Self { ctx: ctx.clone(), cell: ResourceCell::new_fulfilled(name, run) })
    }

    /// Creates a scalar time series under this run. Direct RPC.
    pub async fn create_time_series(
        &self,
        display_name: impl Into<String>,
    ) -> Result<TensorboardTimeSeries> {
        self.create_time_series_of(
            display_name,
            pb::tensorboard_time_series::ValueType::Scalar,
        )
        .await
    }

    /// Creates a time series of an explicit value type under this run.
    pub async fn create_time_series_of(
        &self,
        display_name: impl Into<String>,
        value_type: pb::tensorboard_time_series::ValueType,
    ) -> Result<TensorboardTimeSeries> {
        self.cell.ensure_usable()?;
        self.wait().await?;
        let Some(parent) = self.cell.name() else {
            return Err(AltusError::Server("run has no canonical name".to_string()));
        };
        debug!(run = %parent, "Creating time series");
        let series = self
            .ctx
            .tensorboards()
            .create_tensorboard_time_series(pb::CreateTensorboardTimeSeriesRequest {
                parent: parent.to_string(),
                tensorboard_time_series: Some(pb::TensorboardTimeSeries {
                    display_name: display_name.into(),
                    value_type: value_type as i32,
                    ..Default::default()
                }),
            })
            .await
            .map_err(AltusError::from)?;
        let name = ResourceName::parse_in(Collection::TensorboardTimeSeries, &series.name)?;
        Ok(TensorboardTimeSeries {
            ctx: self.ctx.clone(),
            cell: ResourceCell::new_fulfilled(name, series),
        })
    }

    /// Appends `(step, value)` scalar points to one time series of this run.
    ///
    /// Deferrable: writes queue per run, so points land in call order even
    /// when a training loop fires them without waiting. Wall time is stamped
    /// at call time, not at execution time.
    ///
    /// # Errors
    /// [`AltusError::BadArgument`] for an empty batch, raised before
    /// anything is queued.
    pub async fn write_scalars(
        &self,
        time_series_id: impl Into<String>,
        points: &[(i64, f64)],
        options: CallOptions,
    ) -> Result<ResourceFuture> {
        let time_series_id = time_series_id.into();
        if points.is_empty() {
            return Err(AltusError::BadArgument(
                "write_scalars requires at least one point".to_string(),
            ));
        }
        let wall_time = Some(Timestamp::from(SystemTime::now()));
        let values: Vec<pb::TimeSeriesDataPoint> = points
            .iter()
            .map(|&(step, scalar)| pb::TimeSeriesDataPoint {
                wall_time: wall_time.clone(),
                step,
                scalar,
            })
            .collect();
        let data = pb::TimeSeriesData {
            time_series_id,
            value_type: pb::tensorboard_time_series::ValueType::Scalar as i32,
            values,
        };

        let ctx = self.ctx.clone();
        let cell = self.cell.clone();
        let timeout = options.timeout;
        let future = self.cell.dispatch("run.write_scalars", Vec::new(), move |_cancel| async move {
            with_deadline(timeout, "telemetry write", async move {
                let Some(name) = cell.name() else {
                    return Err(AltusError::Server("run has no canonical name".to_string()));
                };
                debug!(run = %name, points = data.values.len(), "Writing scalar points");
                ctx.tensorboards()
                    .write_tensorboard_run_data(pb::WriteTensorboardRunDataRequest {
                        tensorboard_run: name.to_string(),
                        time_series_data: vec![data],
                    })
                    .await
                    .map_err(AltusError::from)?;
                Ok(())
            })
            .await
        })?;
        finish(future, options).await
    }

    /// Deletes the run and marks this handle deleted.
    pub async fn delete(&self, options: CallOptions) -> Result<ResourceFuture> {
        let ctx = self.ctx.clone();
        let cell = self.cell.clone();
        let timeout = options.timeout;
        let future = self.cell.dispatch("run.delete", Vec::new(), move |cancel| async move {
            with_deadline(timeout, "run deletion", async move {
                let Some(name) = cell.name() else {
                    return Err(AltusError::Server(
                        "run has no canonical name to delete".to_string(),
                    ));
                };
                debug!(run = %name, "Deleting run");
                let operation = ctx
                    .tensorboards()
                    .delete_tensorboard_run(pb::DeleteTensorboardRunRequest {
                        name: name.to_string(),
                    })
                    .await
                    .map_err(AltusError::from)?;
                OperationHandle::from_operation(&ctx, operation)
                    .wait_with_cancel(&cancel, None)
                    .await?;
                cell.mark_deleted();
                Ok(())
            })
            .await
        })?;
        finish(future, options).await
    }

    /// Canonical name.
    #[must_use]
    pub fn resource_name(&self) -> Option<ResourceName> {
        self.cell.name()
    }

    /// Display name from the last known snapshot.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.cell.snapshot().map(|run| run.display_name)
    }

    /// The most recently queued future on this run.
    #[must_use]
    pub fn pending(&self) -> Option<ResourceFuture> {
        self.cell.pending()
    }

    /// Drains queued work on this run, telemetry writes included.
    ///
    /// # Errors
    /// The first error any of that work hit.
    pub async fn wait(&self) -> Result<()> {
        self.cell.wait().await
    }
}

/// Handle to one metric stream within a run.
#[derive(Clone)]
pub struct TensorboardTimeSeries {
    ctx: SdkContext,
    cell: Arc<ResourceCell<pb::TensorboardTimeSeries>>,
}

impl std::fmt::Debug for TensorboardTimeSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorboardTimeSeries").field("cell", &self.cell).finish_non_exhaustive()
    }
}

impl TensorboardTimeSeries {
    /// Looks up an existing time series by canonical name or bare id.
    pub async fn get(ctx: &SdkContext, name: &str) -> Result<Self> {
        let name =
            resolve_name(ctx.config(), Collection::TensorboardTimeSeries, name, None, None)?;
        let series = ctx
            .tensorboards()
            .get_tensorboard_time_series(pb::GetTensorboardTimeSeriesRequest {
                name: name.to_string(),
            })
            .await
            .map_err(AltusError::from)?;
        Ok(Self { ctx: ctx.clone(), cell: ResourceCell::new_fulfilled(name, series) })
    }

    /// Reads a downsampled window of points. Inline; zero `max_data_points`
    /// lets the server choose the window.
    pub async fn read_points(&self, max_data_points: i32) -> Result<Vec<pb::TimeSeriesDataPoint>> {
        self.cell.ensure_usable()?;
        let Some(name) = self.cell.name() else {
            return Err(AltusError::Server("time series has no canonical name".to_string()));
        };
        let response = self
            .ctx
            .tensorboards()
            .read_tensorboard_time_series_data(pb::ReadTensorboardTimeSeriesDataRequest {
                tensorboard_time_series: name.to_string(),
                max_data_points,
                filter: String::new(),
            })
            .await
            .map_err(AltusError::from)?;
        Ok(response.time_series_data.map(|data| data.values).unwrap_or_default())
    }

    /// Opens a stream over the blobs referenced by this series. Inline.
    ///
    /// # Errors
    /// [`AltusError::BadArgument`] for an empty id list; stream-open
    /// failures from the platform. Per-blob failures surface as `Err` items
    /// on the returned stream.
    pub async fn read_blob_stream(&self, blob_ids: Vec<String>) -> Result<BlobStream> {
        if blob_ids.is_empty() {
            return Err(AltusError::BadArgument(
                "read_blob_stream requires at least one blob id".to_string(),
            ));
        }
        self.cell.ensure_usable()?;
        let Some(name) = self.cell.name() else {
            return Err(AltusError::Server("time series has no canonical name".to_string()));
        };
        debug!(time_series = %name, blobs = blob_ids.len(), "Opening blob stream");
        let inner = self
            .ctx
            .tensorboards()
            .read_tensorboard_blob_data(pb::ReadTensorboardBlobDataRequest {
                time_series: name.to_string(),
                blob_ids,
            })
            .await
            .map_err(AltusError::from)?;
        Ok(BlobStream { inner })
    }

    /// Deletes the time series and marks this handle deleted.
    pub async fn delete(&self, options: CallOptions) -> Result<ResourceFuture> {
        let ctx = self.ctx.clone();
        let cell = self.cell.clone();
        let timeout = options.timeout;
        let future = self.cell.dispatch("series.delete", Vec::new(), move |cancel| async move {
            with_deadline(timeout, "time series deletion", async move {
                let Some(name) = cell.name() else {
                    return Err(AltusError::Server(
                        "time series has no canonical name to delete".to_string(),
                    ));
                };
                debug!(time_series = %name, "Deleting time series");
                let operation = ctx
                    .tensorboards()
                    .delete_tensorboard_time_series(pb::DeleteTensorboardTimeSeriesRequest {
                        name: name.to_string(),
                    })
                    .await
                    .map_err(AltusError::from)?;
                OperationHandle::from_operation(&ctx, operation)
                    .wait_with_cancel(&cancel, None)
                    .await?;
                cell.mark_deleted();
                Ok(())
            })
            .await
        })?;
        finish(future, options).await
    }

    /// Canonical name.
    #[must_use]
    pub fn resource_name(&self) -> Option<ResourceName> {
        self.cell.name()
    }

    /// What each point of this series carries.
    #[must_use]
    pub fn value_type(&self) -> Option<pb::tensorboard_time_series::ValueType> {
        self.cell.snapshot().map(|series| series.value_type())
    }

    /// Display name from the last known snapshot.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.cell.snapshot().map(|series| series.display_name)
    }
}

/// A stream of blob chunks from
/// [`TensorboardTimeSeries::read_blob_stream`].
pub struct BlobStream {
    inner: BlobDataStream,
}

impl BlobStream {
    /// The next chunk of blobs, `None` once the stream is exhausted.
    ///
    /// # Errors
    /// An `Err` item reflects a per-chunk failure (e.g. one requested blob
    /// id not existing); later chunks may still arrive.
    pub async fn next_chunk(&mut self) -> Option<Result<Vec<pb::TensorboardBlob>>> {
        let chunk = self.inner.next().await?;
        Some(chunk.map(|response| response.blobs).map_err(AltusError::from))
    }
}

impl std::fmt::Debug for BlobStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobStream").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::GlobalConfig;
    use crate::context::PlatformServices;
    use crate::operation::PollConfig;
    use crate::testing::MockPlatform;

    fn test_context(platform: &Arc<MockPlatform>) -> SdkContext {
        let config = Arc::new(GlobalConfig {
            project: Some("p".to_string()),
            location: Some("l".to_string()),
            ..GlobalConfig::default()
        });
        SdkContext::new(PlatformServices::from_single(platform.clone()), config)
            .with_poll_config(PollConfig::fast())
    }

    #[tokio::test]
    async fn test_create_inline_returns_fulfilled_handle() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let tensorboard =
            Tensorboard::create(&ctx, "training board", CallOptions::inline()).await.unwrap();

        let name = tensorboard.resource_name().unwrap();
        assert_eq!(name.collection(), Collection::Tensorboards);
        assert_eq!(tensorboard.display_name().as_deref(), Some("training board"));
        assert!(tensorboard.create_time().is_some());
    }

    #[tokio::test]
    async fn test_create_validates_display_name() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let err = Tensorboard::create(&ctx, "", CallOptions::deferred()).await.unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_experiment_after_deferred_create_waits_for_the_board() {
        let platform = Arc::new(MockPlatform::new());
        platform.set_operation_polls(2);
        let ctx = test_context(&platform);

        let tensorboard =
            Tensorboard::create(&ctx, "board", CallOptions::deferred()).await.unwrap();
        // Direct child creation drains the deferred parent creation first.
        let experiment = tensorboard.create_experiment("exp", "trial 1").await.unwrap();

        assert_eq!(
            experiment.resource_name().unwrap().collection(),
            Collection::TensorboardExperiments
        );
        let calls = platform.calls();
        let create = calls.iter().position(|m| *m == "create_tensorboard").unwrap();
        let child = calls.iter().position(|m| *m == "create_tensorboard_experiment").unwrap();
        assert!(create < child);
    }

    #[tokio::test]
    async fn test_duplicate_experiment_id_already_exists() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let tensorboard =
            Tensorboard::create(&ctx, "board", CallOptions::inline()).await.unwrap();
        tensorboard.create_experiment("exp", "first").await.unwrap();
        let err = tensorboard.create_experiment("exp", "second").await.unwrap_err();
        assert!(matches!(err, AltusError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_batch_create_runs_validates_then_creates_all() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let tensorboard =
            Tensorboard::create(&ctx, "board", CallOptions::inline()).await.unwrap();
        let experiment = tensorboard.create_experiment("exp", "trial").await.unwrap();

        let err = experiment.batch_create_runs(Vec::new()).await.unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));

        let runs = experiment
            .batch_create_runs(vec![
                RunSpec { run_id: "a".to_string(), display_name: "A".to_string(), ..Default::default() },
                RunSpec { run_id: "b".to_string(), display_name: "B".to_string(), ..Default::default() },
            ])
            .await
            .unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(platform.call_count("batch_create_tensorboard_runs"), 1);
        assert_eq!(platform.call_count("create_tensorboard_run"), 0);
    }

    #[tokio::test]
    async fn test_write_scalars_then_read_points() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let tensorboard =
            Tensorboard::create(&ctx, "board", CallOptions::inline()).await.unwrap();
        let experiment = tensorboard.create_experiment("exp", "trial").await.unwrap();
        let run = experiment.create_run("run", "baseline").await.unwrap();
        let series = run.create_time_series("loss").await.unwrap();
        assert_eq!(
            series.value_type(),
            Some(pb::tensorboard_time_series::ValueType::Scalar)
        );
        let series_id = series.resource_name().unwrap().id().to_string();

        run.write_scalars(&series_id, &[(1, 0.9), (2, 0.5)], CallOptions::deferred())
            .await
            .unwrap();
        run.write_scalars(&series_id, &[(3, 0.2)], CallOptions::deferred()).await.unwrap();
        run.wait().await.unwrap();

        let points = series.read_points(0).await.unwrap();
        let steps: Vec<i64> = points.iter().map(|point| point.step).collect();
        assert_eq!(steps, vec![1, 2, 3], "queued writes land in call order");
    }

    #[tokio::test]
    async fn test_write_scalars_rejects_empty_batch() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let tensorboard =
            Tensorboard::create(&ctx, "board", CallOptions::inline()).await.unwrap();
        let experiment = tensorboard.create_experiment("exp", "trial").await.unwrap();
        let run = experiment.create_run("run", "baseline").await.unwrap();

        let err = run.write_scalars("1", &[], CallOptions::deferred()).await.unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));
        assert_eq!(platform.call_count("write_tensorboard_run_data"), 0);
    }

    #[tokio::test]
    async fn test_blob_stream_round_trip() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let tensorboard =
            Tensorboard::create(&ctx, "board", CallOptions::inline()).await.unwrap();
        let experiment = tensorboard.create_experiment("exp", "trial").await.unwrap();
        let run = experiment.create_run("run", "baseline").await.unwrap();
        let series = run
            .create_time_series_of(
                "attention maps",
                pb::tensorboard_time_series::ValueType::BlobSequence,
            )
            .await
            .unwrap();
        let series_name = series.resource_name().unwrap().to_string();
        platform.insert_blob(
            &series_name,
            pb::TensorboardBlob { id: "x".to_string(), data: b"payload".to_vec() },
        );

        let err = series.read_blob_stream(Vec::new()).await.unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));

        let mut stream = series.read_blob_stream(vec!["x".to_string()]).await.unwrap();
        let chunk = stream.next_chunk().await.unwrap().unwrap();
        assert_eq!(chunk[0].data, b"payload");
        assert!(stream.next_chunk().await.is_none());
    }

    #[tokio::test]
    async fn test_delete_marks_the_handle_deleted() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let tensorboard =
            Tensorboard::create(&ctx, "board", CallOptions::inline()).await.unwrap();
        tensorboard.delete(CallOptions::inline()).await.unwrap();

        let err = tensorboard.create_experiment("exp", "late").await.unwrap_err();
        assert!(matches!(err, AltusError::Deleted(_)));
        assert_eq!(platform.call_count("create_tensorboard_experiment"), 0);
    }
}
