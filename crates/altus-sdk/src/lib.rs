//! Altus SDK - Client library for the Altus managed ML platform.
//!
//! This crate provides typed handles over the platform's resources:
//! - Datasets (tabular and image) with bundled item import
//! - Training pipelines that register models on success
//! - Tensorboards, experiments, runs and time series for telemetry
//! - Long-running operation polling and cancellation
//!
//! Mutating calls can run inline or deferred. A deferred call queues on a
//! shared execution pool and returns a placeholder handle immediately; work
//! queued against one resource runs in submission order, and cross-resource
//! dependencies (a pipeline consuming a dataset that is still being created)
//! are awaited before the dependent work starts.
//!
//! # Example
//!
//! ```rust,no_run
//! use altus_sdk::{CallOptions, Dataset, GlobalConfig, SdkContext, TabularDataset};
//!
//! #[tokio::main]
//! async fn main() -> altus_sdk::Result<()> {
//!     altus_sdk::config::init(GlobalConfig {
//!         project: Some("my-project".to_string()),
//!         location: Some("us-central1".to_string()),
//!         ..GlobalConfig::default()
//!     });
//!     let ctx = SdkContext::from_global()?;
//!
//!     let dataset = TabularDataset::create_from_storage(
//!         &ctx,
//!         "sales",
//!         vec!["gs://my-bucket/sales.csv".to_string()],
//!         CallOptions::deferred(),
//!     )
//!     .await?;
//!     dataset.wait().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod datasources;
pub mod error;
pub mod naming;
pub mod operation;
pub mod resource;
pub mod resources;
pub mod scheduler;
pub mod schema;
pub mod testing;

pub use config::{Credentials, GlobalConfig};
pub use context::{GrpcPlatform, PlatformServices, SdkContext};
pub use datasources::Datasource;
pub use error::{AltusError, Result};
pub use naming::{Collection, ResourceName};
pub use operation::{OperationHandle, PollConfig};
pub use resource::{CallOptions, RunMode};
pub use resources::{
    AnySchema, BlobStream, Dataset, DatasetHandle, DatasetSpec, DatasetUpdate, ImageDataset,
    ImageSchema, ListParams, Model, RunSpec, SchemaFamily, TabularDataset, TabularSchema,
    Tensorboard, TensorboardExperiment, TensorboardRun, TensorboardTimeSeries, TrainingPipeline,
    TrainingSpec,
};
pub use scheduler::{FutureState, ResourceFuture, Scheduler, SchedulerStats};

/// Drains the deferred-execution pool, then aborts whatever is still running
/// once `drain` has passed. Call once at program exit when deferred calls
/// were used.
pub async fn shutdown(drain: std::time::Duration) {
    scheduler::global().shutdown(drain).await;
}
