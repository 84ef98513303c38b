//! Message types for the `altus.v1` package.
//!
//! Field tags and oneof layouts match the platform's published protos; keep
//! them stable, the wire does not forgive renumbering.

use std::collections::HashMap;

use prost_types::{Any, FieldMask, Timestamp};

/// Customer-managed encryption key configuration applied to a resource.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EncryptionSpec {
    /// Fully qualified KMS key name.
    #[prost(string, tag = "1")]
    pub kms_key_name: String,
}

/// Canonical RPC failure description carried inside terminal operations.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Status {
    /// Canonical RPC status code.
    #[prost(int32, tag = "1")]
    pub code: i32,
    /// Developer-facing error message.
    #[prost(string, tag = "2")]
    pub message: String,
}

/// A set of objects in blob storage, addressed by `gs://` URIs.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StorageSource {
    #[prost(string, repeated, tag = "1")]
    pub uris: Vec<String>,
}

/// A warehouse table, addressed by a `bq://` URI.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TableSource {
    #[prost(string, tag = "1")]
    pub uri: String,
}

/// Generic metadata attached to long-running operations.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OperationMetadata {
    #[prost(message, optional, tag = "1")]
    pub create_time: Option<Timestamp>,
    #[prost(message, optional, tag = "2")]
    pub update_time: Option<Timestamp>,
}

impl ::prost::Name for OperationMetadata {
    const NAME: &'static str = "OperationMetadata";
    const PACKAGE: &'static str = "altus.v1";
    fn full_name() -> String {
        "altus.v1.OperationMetadata".into()
    }
    fn type_url() -> String {
        "type.altus.dev/altus.v1.OperationMetadata".into()
    }
}

/// A long-running operation returned by mutating RPCs.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Operation {
    /// Server-assigned operation name, unique within the service.
    #[prost(string, tag = "1")]
    pub name: String,
    /// Service-specific progress metadata.
    #[prost(message, optional, tag = "2")]
    pub metadata: Option<Any>,
    /// True once the operation has reached a terminal state.
    #[prost(bool, tag = "3")]
    pub done: bool,
    /// Terminal outcome, set only when `done` is true.
    #[prost(oneof = "operation::Result", tags = "4, 5")]
    pub result: Option<operation::Result>,
}

pub mod operation {
    /// Terminal outcome of an [`Operation`](super::Operation).
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        /// The operation failed.
        #[prost(message, tag = "4")]
        Error(super::Status),
        /// The operation succeeded; payload type depends on the RPC.
        #[prost(message, tag = "5")]
        Response(::prost_types::Any),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetOperationRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CancelOperationRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CancelOperationResponse {}

/// Payload packed into the terminal response of delete operations.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteOperationResponse {}

impl ::prost::Name for DeleteOperationResponse {
    const NAME: &'static str = "DeleteOperationResponse";
    const PACKAGE: &'static str = "altus.v1";
    fn full_name() -> String {
        "altus.v1.DeleteOperationResponse".into()
    }
    fn type_url() -> String {
        "type.altus.dev/altus.v1.DeleteOperationResponse".into()
    }
}

/// A managed collection of data items used to train models.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Dataset {
    /// Canonical resource name.
    #[prost(string, tag = "1")]
    pub name: String,
    /// Human-readable display name, not unique.
    #[prost(string, tag = "2")]
    pub display_name: String,
    /// Schema URI describing what kind of data the dataset holds.
    #[prost(string, tag = "3")]
    pub metadata_schema_uri: String,
    /// Kind-specific metadata, validated against `metadata_schema_uri`.
    #[prost(message, optional, tag = "4")]
    pub metadata: Option<DatasetMetadata>,
    #[prost(map = "string, string", tag = "5")]
    pub labels: HashMap<String, String>,
    #[prost(message, optional, tag = "6")]
    pub encryption_spec: Option<EncryptionSpec>,
    #[prost(message, optional, tag = "7")]
    pub create_time: Option<Timestamp>,
    #[prost(message, optional, tag = "8")]
    pub update_time: Option<Timestamp>,
}

impl ::prost::Name for Dataset {
    const NAME: &'static str = "Dataset";
    const PACKAGE: &'static str = "altus.v1";
    fn full_name() -> String {
        "altus.v1.Dataset".into()
    }
    fn type_url() -> String {
        "type.altus.dev/altus.v1.Dataset".into()
    }
}

/// Kind-specific dataset metadata.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DatasetMetadata {
    /// Present only for tabular datasets, which bind their source at
    /// creation time instead of importing items later.
    #[prost(message, optional, tag = "1")]
    pub input_config: Option<TabularInputConfig>,
}

/// Where a tabular dataset reads its rows from.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TabularInputConfig {
    #[prost(oneof = "tabular_input_config::Source", tags = "1, 2")]
    pub source: Option<tabular_input_config::Source>,
}

pub mod tabular_input_config {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Source {
        /// CSV objects in blob storage.
        #[prost(message, tag = "1")]
        Storage(super::StorageSource),
        /// A warehouse table.
        #[prost(message, tag = "2")]
        Table(super::TableSource),
    }
}

/// Describes one batch of items to ingest into a non-tabular dataset.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ImportDataConfig {
    #[prost(oneof = "import_data_config::Source", tags = "1")]
    pub source: Option<import_data_config::Source>,
    /// Labels applied to every imported data item.
    #[prost(map = "string, string", tag = "2")]
    pub data_item_labels: HashMap<String, String>,
    /// Schema URI describing the layout of the source files.
    #[prost(string, tag = "3")]
    pub import_schema_uri: String,
}

pub mod import_data_config {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Source {
        #[prost(message, tag = "1")]
        Storage(super::StorageSource),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateDatasetRequest {
    /// Parent location, `projects/{project}/locations/{location}`.
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(message, optional, tag = "2")]
    pub dataset: Option<Dataset>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetDatasetRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListDatasetsRequest {
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(string, tag = "2")]
    pub filter: String,
    #[prost(int32, tag = "3")]
    pub page_size: i32,
    #[prost(string, tag = "4")]
    pub page_token: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListDatasetsResponse {
    #[prost(message, repeated, tag = "1")]
    pub datasets: Vec<Dataset>,
    /// Empty when there are no further pages.
    #[prost(string, tag = "2")]
    pub next_page_token: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateDatasetRequest {
    #[prost(message, optional, tag = "1")]
    pub dataset: Option<Dataset>,
    /// Which fields of `dataset` to apply.
    #[prost(message, optional, tag = "2")]
    pub update_mask: Option<FieldMask>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteDatasetRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ImportDataRequest {
    /// Dataset to import into.
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, repeated, tag = "2")]
    pub import_configs: Vec<ImportDataConfig>,
}

/// Payload packed into the terminal response of import operations.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ImportDataResponse {}

impl ::prost::Name for ImportDataResponse {
    const NAME: &'static str = "ImportDataResponse";
    const PACKAGE: &'static str = "altus.v1";
    fn full_name() -> String {
        "altus.v1.ImportDataResponse".into()
    }
    fn type_url() -> String {
        "type.altus.dev/altus.v1.ImportDataResponse".into()
    }
}

/// A training pipeline run.
///
/// Pipelines are created directly (no operation handle); clients observe
/// progress by re-reading `state` until it is terminal.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TrainingPipeline {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub display_name: String,
    /// Dataset binding; absent for pipelines that bring their own data.
    #[prost(message, optional, tag = "3")]
    pub input_data_config: Option<InputDataConfig>,
    /// Schema URI selecting the training task.
    #[prost(string, tag = "4")]
    pub training_task_definition: String,
    /// Task-specific inputs, validated against `training_task_definition`.
    #[prost(message, optional, tag = "5")]
    pub training_task_inputs: Option<Any>,
    /// Model the pipeline uploads on success; `name` is filled in by the
    /// server once the upload happens.
    #[prost(message, optional, tag = "6")]
    pub model_to_upload: Option<Model>,
    #[prost(enumeration = "PipelineState", tag = "7")]
    pub state: i32,
    /// Failure description, set when `state` is `Failed` or `Cancelled`.
    #[prost(message, optional, tag = "8")]
    pub error: Option<Status>,
    #[prost(map = "string, string", tag = "9")]
    pub labels: HashMap<String, String>,
    #[prost(message, optional, tag = "10")]
    pub encryption_spec: Option<EncryptionSpec>,
    #[prost(message, optional, tag = "11")]
    pub create_time: Option<Timestamp>,
    #[prost(message, optional, tag = "12")]
    pub start_time: Option<Timestamp>,
    #[prost(message, optional, tag = "13")]
    pub end_time: Option<Timestamp>,
}

/// How a pipeline consumes its bound dataset.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InputDataConfig {
    /// Bare id of the dataset within the pipeline's location.
    #[prost(string, tag = "1")]
    pub dataset_id: String,
    #[prost(message, optional, tag = "2")]
    pub fraction_split: Option<FractionSplit>,
}

/// Fractional train/validation/test split. Fractions must sum to 1.0.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FractionSplit {
    #[prost(double, tag = "1")]
    pub training_fraction: f64,
    #[prost(double, tag = "2")]
    pub validation_fraction: f64,
    #[prost(double, tag = "3")]
    pub test_fraction: f64,
}

/// Lifecycle states of a [`TrainingPipeline`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum PipelineState {
    Unspecified = 0,
    Queued = 1,
    Pending = 2,
    Running = 3,
    Succeeded = 4,
    Failed = 5,
    Cancelling = 6,
    Cancelled = 7,
    Paused = 8,
}

impl PipelineState {
    /// The proto identifier of the value, for logs and filters.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Unspecified => "PIPELINE_STATE_UNSPECIFIED",
            Self::Queued => "PIPELINE_STATE_QUEUED",
            Self::Pending => "PIPELINE_STATE_PENDING",
            Self::Running => "PIPELINE_STATE_RUNNING",
            Self::Succeeded => "PIPELINE_STATE_SUCCEEDED",
            Self::Failed => "PIPELINE_STATE_FAILED",
            Self::Cancelling => "PIPELINE_STATE_CANCELLING",
            Self::Cancelled => "PIPELINE_STATE_CANCELLED",
            Self::Paused => "PIPELINE_STATE_PAUSED",
        }
    }

    /// Whether the state is terminal (the pipeline will not progress).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateTrainingPipelineRequest {
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(message, optional, tag = "2")]
    pub training_pipeline: Option<TrainingPipeline>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetTrainingPipelineRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListTrainingPipelinesRequest {
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(string, tag = "2")]
    pub filter: String,
    #[prost(int32, tag = "3")]
    pub page_size: i32,
    #[prost(string, tag = "4")]
    pub page_token: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListTrainingPipelinesResponse {
    #[prost(message, repeated, tag = "1")]
    pub training_pipelines: Vec<TrainingPipeline>,
    #[prost(string, tag = "2")]
    pub next_page_token: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteTrainingPipelineRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CancelTrainingPipelineRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CancelTrainingPipelineResponse {}

/// A trained model hosted by the platform.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Model {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub display_name: String,
    #[prost(map = "string, string", tag = "3")]
    pub labels: HashMap<String, String>,
    #[prost(message, optional, tag = "4")]
    pub encryption_spec: Option<EncryptionSpec>,
    #[prost(message, optional, tag = "5")]
    pub create_time: Option<Timestamp>,
    #[prost(message, optional, tag = "6")]
    pub update_time: Option<Timestamp>,
}

impl ::prost::Name for Model {
    const NAME: &'static str = "Model";
    const PACKAGE: &'static str = "altus.v1";
    fn full_name() -> String {
        "altus.v1.Model".into()
    }
    fn type_url() -> String {
        "type.altus.dev/altus.v1.Model".into()
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetModelRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListModelsRequest {
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(string, tag = "2")]
    pub filter: String,
    #[prost(int32, tag = "3")]
    pub page_size: i32,
    #[prost(string, tag = "4")]
    pub page_token: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListModelsResponse {
    #[prost(message, repeated, tag = "1")]
    pub models: Vec<Model>,
    #[prost(string, tag = "2")]
    pub next_page_token: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteModelRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

/// A visualization backend for training telemetry.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Tensorboard {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub display_name: String,
    #[prost(map = "string, string", tag = "3")]
    pub labels: HashMap<String, String>,
    #[prost(message, optional, tag = "4")]
    pub encryption_spec: Option<EncryptionSpec>,
    #[prost(message, optional, tag = "5")]
    pub create_time: Option<Timestamp>,
    #[prost(message, optional, tag = "6")]
    pub update_time: Option<Timestamp>,
}

impl ::prost::Name for Tensorboard {
    const NAME: &'static str = "Tensorboard";
    const PACKAGE: &'static str = "altus.v1";
    fn full_name() -> String {
        "altus.v1.Tensorboard".into()
    }
    fn type_url() -> String {
        "type.altus.dev/altus.v1.Tensorboard".into()
    }
}

/// Groups the runs of one logical experiment.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TensorboardExperiment {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub display_name: String,
    #[prost(map = "string, string", tag = "3")]
    pub labels: HashMap<String, String>,
    #[prost(message, optional, tag = "4")]
    pub create_time: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub update_time: Option<Timestamp>,
}

/// One execution of an experiment, the unit telemetry is written against.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TensorboardRun {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub display_name: String,
    #[prost(map = "string, string", tag = "3")]
    pub labels: HashMap<String, String>,
    #[prost(message, optional, tag = "4")]
    pub create_time: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub update_time: Option<Timestamp>,
}

/// One metric stream within a run.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TensorboardTimeSeries {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub display_name: String,
    #[prost(enumeration = "tensorboard_time_series::ValueType", tag = "3")]
    pub value_type: i32,
    /// Plugin that renders this stream, e.g. "scalars".
    #[prost(string, tag = "4")]
    pub plugin_name: String,
    #[prost(message, optional, tag = "5")]
    pub create_time: Option<Timestamp>,
    #[prost(message, optional, tag = "6")]
    pub update_time: Option<Timestamp>,
}

pub mod tensorboard_time_series {
    /// What each point of the series carries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum ValueType {
        Unspecified = 0,
        Scalar = 1,
        Tensor = 2,
        BlobSequence = 3,
    }
}

/// A single observation in a time series.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TimeSeriesDataPoint {
    #[prost(message, optional, tag = "1")]
    pub wall_time: Option<Timestamp>,
    /// Global training step the point was recorded at.
    #[prost(int64, tag = "2")]
    pub step: i64,
    #[prost(double, tag = "3")]
    pub scalar: f64,
}

/// A batch of points for one time series.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TimeSeriesData {
    /// Bare id of the target time series within its run.
    #[prost(string, tag = "1")]
    pub time_series_id: String,
    #[prost(enumeration = "tensorboard_time_series::ValueType", tag = "2")]
    pub value_type: i32,
    #[prost(message, repeated, tag = "3")]
    pub values: Vec<TimeSeriesDataPoint>,
}

/// An opaque blob referenced by a blob-sequence time series.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TensorboardBlob {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateTensorboardRequest {
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(message, optional, tag = "2")]
    pub tensorboard: Option<Tensorboard>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetTensorboardRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteTensorboardRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateTensorboardExperimentRequest {
    /// Parent tensorboard resource name.
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(message, optional, tag = "2")]
    pub tensorboard_experiment: Option<TensorboardExperiment>,
    /// Caller-chosen id, becomes the final segment of the resource name.
    #[prost(string, tag = "3")]
    pub tensorboard_experiment_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetTensorboardExperimentRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteTensorboardExperimentRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateTensorboardRunRequest {
    /// Parent experiment resource name.
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(message, optional, tag = "2")]
    pub tensorboard_run: Option<TensorboardRun>,
    /// Caller-chosen id, becomes the final segment of the resource name.
    #[prost(string, tag = "3")]
    pub tensorboard_run_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchCreateTensorboardRunsRequest {
    #[prost(string, tag = "1")]
    pub parent: String,
    /// Individual create requests; their `parent` must match the batch's.
    #[prost(message, repeated, tag = "2")]
    pub requests: Vec<CreateTensorboardRunRequest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchCreateTensorboardRunsResponse {
    #[prost(message, repeated, tag = "1")]
    pub tensorboard_runs: Vec<TensorboardRun>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetTensorboardRunRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteTensorboardRunRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateTensorboardTimeSeriesRequest {
    /// Parent run resource name.
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(message, optional, tag = "2")]
    pub tensorboard_time_series: Option<TensorboardTimeSeries>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetTensorboardTimeSeriesRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteTensorboardTimeSeriesRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WriteTensorboardRunDataRequest {
    /// Run the data is recorded under.
    #[prost(string, tag = "1")]
    pub tensorboard_run: String,
    #[prost(message, repeated, tag = "2")]
    pub time_series_data: Vec<TimeSeriesData>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WriteTensorboardRunDataResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadTensorboardTimeSeriesDataRequest {
    #[prost(string, tag = "1")]
    pub tensorboard_time_series: String,
    /// Maximum points to return; the server downsamples beyond this.
    #[prost(int32, tag = "2")]
    pub max_data_points: i32,
    #[prost(string, tag = "3")]
    pub filter: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadTensorboardTimeSeriesDataResponse {
    #[prost(message, optional, tag = "1")]
    pub time_series_data: Option<TimeSeriesData>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadTensorboardBlobDataRequest {
    /// Blob-sequence time series resource name.
    #[prost(string, tag = "1")]
    pub time_series: String,
    #[prost(string, repeated, tag = "2")]
    pub blob_ids: Vec<String>,
}

/// One chunk of a blob read; a stream of these covers the requested ids.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadTensorboardBlobDataResponse {
    #[prost(message, repeated, tag = "1")]
    pub blobs: Vec<TensorboardBlob>,
}

#[cfg(test)]
mod tests {
    use prost::Message;
    use prost_types::Any;

    use super::*;

    #[test]
    fn test_operation_result_roundtrip() {
        let op = Operation {
            name: "projects/p/locations/l/operations/123".to_string(),
            metadata: None,
            done: true,
            result: Some(operation::Result::Error(Status {
                code: 5,
                message: "no such dataset".to_string(),
            })),
        };

        let bytes = op.encode_to_vec();
        let decoded = Operation::decode(bytes.as_slice()).unwrap();
        assert!(decoded.done);
        match decoded.result {
            Some(operation::Result::Error(status)) => {
                assert_eq!(status.code, 5);
                assert_eq!(status.message, "no such dataset");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_any_packing_uses_platform_type_urls() {
        let dataset = Dataset {
            name: "projects/p/locations/l/datasets/1".to_string(),
            display_name: "d".to_string(),
            ..Default::default()
        };

        let packed = Any::from_msg(&dataset).unwrap();
        assert_eq!(packed.type_url, "type.altus.dev/altus.v1.Dataset");

        let unpacked: Dataset = packed.to_msg().unwrap();
        assert_eq!(unpacked, dataset);
    }

    #[test]
    fn test_any_unpack_rejects_wrong_message() {
        let model = Model {
            name: "projects/p/locations/l/models/1".to_string(),
            ..Default::default()
        };
        let packed = Any::from_msg(&model).unwrap();
        assert!(packed.to_msg::<Dataset>().is_err());
    }

    #[test]
    fn test_pipeline_state_accessors() {
        let mut pipeline = TrainingPipeline::default();
        assert_eq!(pipeline.state(), PipelineState::Unspecified);

        pipeline.set_state(PipelineState::Running);
        assert_eq!(pipeline.state, 3);
        assert!(!pipeline.state().is_terminal());

        pipeline.set_state(PipelineState::Succeeded);
        assert!(pipeline.state().is_terminal());
        assert_eq!(pipeline.state().as_str_name(), "PIPELINE_STATE_SUCCEEDED");
    }

    #[test]
    fn test_tabular_input_config_sources_are_exclusive() {
        let config = TabularInputConfig {
            source: Some(tabular_input_config::Source::Table(TableSource {
                uri: "bq://proj.dataset.table".to_string(),
            })),
        };

        let bytes = config.encode_to_vec();
        let decoded = TabularInputConfig::decode(bytes.as_slice()).unwrap();
        match decoded.source {
            Some(tabular_input_config::Source::Table(table)) => {
                assert_eq!(table.uri, "bq://proj.dataset.table");
            }
            other => panic!("unexpected source: {other:?}"),
        }
    }
}
