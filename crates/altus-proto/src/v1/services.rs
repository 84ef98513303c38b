//! Transport-agnostic service traits for the `altus.v1` API.
//!
//! The SDK programs exclusively against these traits. Production code wires
//! in the gRPC stubs from [`clients`](super::clients); tests wire in an
//! in-process implementation. Errors stay in the wire vocabulary
//! ([`tonic::Status`]); translating them into SDK errors is the caller's job.

use async_trait::async_trait;
use futures::stream::BoxStream;
use tonic::Status;

use super::*;

/// Stream of blob-read chunks produced by
/// [`TensorboardService::read_tensorboard_blob_data`].
pub type BlobDataStream = BoxStream<'static, Result<ReadTensorboardBlobDataResponse, Status>>;

/// Access to long-running operations, shared by every mutating service.
///
/// All implementations must be `Send + Sync`; the SDK polls operations from
/// background workers.
#[async_trait]
pub trait OperationsService: Send + Sync {
    /// Fetches the current state of an operation.
    ///
    /// # Errors
    /// Returns a `Status` if the operation does not exist or the call fails.
    async fn get_operation(&self, request: GetOperationRequest) -> Result<Operation, Status>;

    /// Requests cancellation of a running operation.
    ///
    /// Cancellation is asynchronous: a successful response only means the
    /// server accepted the request. The operation itself reaches a terminal
    /// `Cancelled` outcome later, observable via `get_operation`.
    ///
    /// # Errors
    /// Returns a `Status` if the operation does not exist or the call fails.
    async fn cancel_operation(
        &self,
        request: CancelOperationRequest,
    ) -> Result<CancelOperationResponse, Status>;
}

/// Dataset CRUD and data ingestion.
#[async_trait]
pub trait DatasetService: Send + Sync {
    /// Starts creating a dataset. Returns a long-running operation whose
    /// terminal response packs the created [`Dataset`].
    async fn create_dataset(&self, request: CreateDatasetRequest) -> Result<Operation, Status>;

    async fn get_dataset(&self, request: GetDatasetRequest) -> Result<Dataset, Status>;

    async fn list_datasets(
        &self,
        request: ListDatasetsRequest,
    ) -> Result<ListDatasetsResponse, Status>;

    /// Applies the masked fields of `request.dataset` and returns the
    /// updated resource. Not operation-backed.
    async fn update_dataset(&self, request: UpdateDatasetRequest) -> Result<Dataset, Status>;

    /// Starts deleting a dataset. The returned operation completes with an
    /// empty response.
    async fn delete_dataset(&self, request: DeleteDatasetRequest) -> Result<Operation, Status>;

    /// Starts importing data items into a non-tabular dataset.
    async fn import_data(&self, request: ImportDataRequest) -> Result<Operation, Status>;
}

/// Training pipeline lifecycle.
#[async_trait]
pub trait PipelineService: Send + Sync {
    /// Creates a pipeline. The pipeline starts in a non-terminal state and
    /// is observed by polling `get_training_pipeline`.
    async fn create_training_pipeline(
        &self,
        request: CreateTrainingPipelineRequest,
    ) -> Result<TrainingPipeline, Status>;

    async fn get_training_pipeline(
        &self,
        request: GetTrainingPipelineRequest,
    ) -> Result<TrainingPipeline, Status>;

    async fn list_training_pipelines(
        &self,
        request: ListTrainingPipelinesRequest,
    ) -> Result<ListTrainingPipelinesResponse, Status>;

    /// Starts deleting a pipeline. Only terminal pipelines can be deleted.
    async fn delete_training_pipeline(
        &self,
        request: DeleteTrainingPipelineRequest,
    ) -> Result<Operation, Status>;

    /// Requests cancellation of a running pipeline. Like operation
    /// cancellation this is asynchronous; the pipeline later reports a
    /// terminal `Cancelled` state.
    async fn cancel_training_pipeline(
        &self,
        request: CancelTrainingPipelineRequest,
    ) -> Result<CancelTrainingPipelineResponse, Status>;
}

/// Read and delete access to trained models.
#[async_trait]
pub trait ModelService: Send + Sync {
    async fn get_model(&self, request: GetModelRequest) -> Result<Model, Status>;

    async fn list_models(&self, request: ListModelsRequest) -> Result<ListModelsResponse, Status>;

    async fn delete_model(&self, request: DeleteModelRequest) -> Result<Operation, Status>;
}

/// Tensorboard resources and telemetry I/O.
#[async_trait]
pub trait TensorboardService: Send + Sync {
    /// Starts creating a tensorboard. Returns a long-running operation whose
    /// terminal response packs the created [`Tensorboard`].
    async fn create_tensorboard(
        &self,
        request: CreateTensorboardRequest,
    ) -> Result<Operation, Status>;

    async fn get_tensorboard(&self, request: GetTensorboardRequest) -> Result<Tensorboard, Status>;

    async fn delete_tensorboard(
        &self,
        request: DeleteTensorboardRequest,
    ) -> Result<Operation, Status>;

    /// Creates an experiment synchronously.
    async fn create_tensorboard_experiment(
        &self,
        request: CreateTensorboardExperimentRequest,
    ) -> Result<TensorboardExperiment, Status>;

    async fn get_tensorboard_experiment(
        &self,
        request: GetTensorboardExperimentRequest,
    ) -> Result<TensorboardExperiment, Status>;

    async fn delete_tensorboard_experiment(
        &self,
        request: DeleteTensorboardExperimentRequest,
    ) -> Result<Operation, Status>;

    /// Creates a run synchronously.
    async fn create_tensorboard_run(
        &self,
        request: CreateTensorboardRunRequest,
    ) -> Result<TensorboardRun, Status>;

    /// Creates several runs in one round trip.
    async fn batch_create_tensorboard_runs(
        &self,
        request: BatchCreateTensorboardRunsRequest,
    ) -> Result<BatchCreateTensorboardRunsResponse, Status>;

    async fn get_tensorboard_run(
        &self,
        request: GetTensorboardRunRequest,
    ) -> Result<TensorboardRun, Status>;

    async fn delete_tensorboard_run(
        &self,
        request: DeleteTensorboardRunRequest,
    ) -> Result<Operation, Status>;

    /// Creates a time series synchronously.
    async fn create_tensorboard_time_series(
        &self,
        request: CreateTensorboardTimeSeriesRequest,
    ) -> Result<TensorboardTimeSeries, Status>;

    async fn get_tensorboard_time_series(
        &self,
        request: GetTensorboardTimeSeriesRequest,
    ) -> Result<TensorboardTimeSeries, Status>;

    async fn delete_tensorboard_time_series(
        &self,
        request: DeleteTensorboardTimeSeriesRequest,
    ) -> Result<Operation, Status>;

    /// Appends points to one or more time series of a run.
    async fn write_tensorboard_run_data(
        &self,
        request: WriteTensorboardRunDataRequest,
    ) -> Result<WriteTensorboardRunDataResponse, Status>;

    /// Reads a downsampled window of a scalar time series.
    async fn read_tensorboard_time_series_data(
        &self,
        request: ReadTensorboardTimeSeriesDataRequest,
    ) -> Result<ReadTensorboardTimeSeriesDataResponse, Status>;

    /// Streams blob payloads referenced by a blob-sequence time series.
    ///
    /// # Errors
    /// Returns a `Status` if the stream cannot be opened; per-chunk failures
    /// surface as `Err` items on the stream itself.
    async fn read_tensorboard_blob_data(
        &self,
        request: ReadTensorboardBlobDataRequest,
    ) -> Result<BlobDataStream, Status>;
}
