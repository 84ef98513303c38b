//! Typed façades over the platform's managed resources.
//!
//! Every façade wraps a [`crate::resource::ResourceCell`] and follows one
//! calling convention:
//!
//! - factories (`create`, `run`) take [`CallOptions`] and return the handle.
//!   In deferred mode the handle comes back immediately as a placeholder
//!   that fills in when the queued work completes; in inline mode the call
//!   returns once the resource exists.
//! - other mutating methods take [`CallOptions`] and return the queued
//!   [`ResourceFuture`], already settled in inline mode, so callers can
//!   observe or cancel the work either way.
//! - reads (`get`, `list`, point and blob reads) always run inline.
//!
//! Handles are cheap to clone; clones share the same cell, so queued work
//! and failures are visible through every clone.

use chrono::{DateTime, Utc};
use prost_types::Timestamp;

use crate::error::Result;
use crate::resource::{CallOptions, RunMode};
use crate::scheduler::ResourceFuture;

mod dataset;
mod model;
mod pipeline;
mod tensorboard;

pub use dataset::{
    AnySchema, Dataset, DatasetHandle, DatasetSpec, DatasetUpdate, ImageDataset, ImageSchema,
    SchemaFamily, TabularDataset, TabularSchema,
};
pub use model::Model;
pub use pipeline::{TrainingPipeline, TrainingSpec};
pub use tensorboard::{
    BlobStream, RunSpec, Tensorboard, TensorboardExperiment, TensorboardRun,
    TensorboardTimeSeries,
};

/// Common knobs accepted by every `list` call.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    /// Server-side filter; the platform understands `display_name="value"`.
    pub filter: Option<String>,
    /// Page size hint. Listing always drains every page regardless.
    pub page_size: Option<i32>,
    /// Project override; falls back to the configured default.
    pub project: Option<String>,
    /// Location override; falls back to the configured default.
    pub location: Option<String>,
}

/// Applies the caller's run mode to freshly queued work: inline awaits the
/// outcome, deferred returns right away. The future is handed back either
/// way.
pub(crate) async fn finish(future: ResourceFuture, options: CallOptions) -> Result<ResourceFuture> {
    if options.mode == RunMode::Inline {
        future.outcome().await?;
    }
    Ok(future)
}

/// Converts a wire timestamp into a `chrono` instant. Out-of-range values
/// come back as `None`.
pub(crate) fn datetime_of(ts: &Timestamp) -> Option<DateTime<Utc>> {
    u32::try_from(ts.nanos).ok().and_then(|nanos| DateTime::from_timestamp(ts.seconds, nanos))
}
