//! gRPC client stubs for the `altus.v1` services.
//!
//! Thin wrappers over [`tonic::client::Grpc`]; one method per RPC, each
//! hitting the service's canonical path. Clients are cheap to clone and
//! share the underlying channel.

use http::uri::PathAndQuery;
use tonic::codec::ProstCodec;
use tonic::transport::Channel;

use super::*;

fn not_ready(e: tonic::transport::Error) -> tonic::Status {
    tonic::Status::unknown(format!("Service was not ready: {e}"))
}

/// Client for `altus.v1.OperationsService`.
#[derive(Debug, Clone)]
pub struct OperationsServiceClient {
    inner: tonic::client::Grpc<Channel>,
}

impl OperationsServiceClient {
    #[must_use]
    pub fn new(channel: Channel) -> Self {
        Self { inner: tonic::client::Grpc::new(channel) }
    }

    pub async fn get_operation(
        &mut self,
        request: impl tonic::IntoRequest<GetOperationRequest>,
    ) -> Result<tonic::Response<Operation>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.OperationsService/GetOperation");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn cancel_operation(
        &mut self,
        request: impl tonic::IntoRequest<CancelOperationRequest>,
    ) -> Result<tonic::Response<CancelOperationResponse>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.OperationsService/CancelOperation");
        self.inner.unary(request.into_request(), path, codec).await
    }
}

/// Client for `altus.v1.DatasetService`.
#[derive(Debug, Clone)]
pub struct DatasetServiceClient {
    inner: tonic::client::Grpc<Channel>,
}

impl DatasetServiceClient {
    #[must_use]
    pub fn new(channel: Channel) -> Self {
        Self { inner: tonic::client::Grpc::new(channel) }
    }

    pub async fn create_dataset(
        &mut self,
        request: impl tonic::IntoRequest<CreateDatasetRequest>,
    ) -> Result<tonic::Response<Operation>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.DatasetService/CreateDataset");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn get_dataset(
        &mut self,
        request: impl tonic::IntoRequest<GetDatasetRequest>,
    ) -> Result<tonic::Response<Dataset>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.DatasetService/GetDataset");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn list_datasets(
        &mut self,
        request: impl tonic::IntoRequest<ListDatasetsRequest>,
    ) -> Result<tonic::Response<ListDatasetsResponse>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.DatasetService/ListDatasets");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn update_dataset(
        &mut self,
        request: impl tonic::IntoRequest<UpdateDatasetRequest>,
    ) -> Result<tonic::Response<Dataset>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.DatasetService/UpdateDataset");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn delete_dataset(
        &mut self,
        request: impl tonic::IntoRequest<DeleteDatasetRequest>,
    ) -> Result<tonic::Response<Operation>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.DatasetService/DeleteDataset");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn import_data(
        &mut self,
        request: impl tonic::IntoRequest<ImportDataRequest>,
    ) -> Result<tonic::Response<Operation>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.DatasetService/ImportData");
        self.inner.unary(request.into_request(), path, codec).await
    }
}

/// Client for `altus.v1.PipelineService`.
#[derive(Debug, Clone)]
pub struct PipelineServiceClient {
    inner: tonic::client::Grpc<Channel>,
}

impl PipelineServiceClient {
    #[must_use]
    pub fn new(channel: Channel) -> Self {
        Self { inner: tonic::client::Grpc::new(channel) }
    }

    pub async fn create_training_pipeline(
        &mut self,
        request: impl tonic::IntoRequest<CreateTrainingPipelineRequest>,
    ) -> Result<tonic::Response<TrainingPipeline>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.PipelineService/CreateTrainingPipeline");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn get_training_pipeline(
        &mut self,
        request: impl tonic::IntoRequest<GetTrainingPipelineRequest>,
    ) -> Result<tonic::Response<TrainingPipeline>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.PipelineService/GetTrainingPipeline");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn list_training_pipelines(
        &mut self,
        request: impl tonic::IntoRequest<ListTrainingPipelinesRequest>,
    ) -> Result<tonic::Response<ListTrainingPipelinesResponse>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.PipelineService/ListTrainingPipelines");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn delete_training_pipeline(
        &mut self,
        request: impl tonic::IntoRequest<DeleteTrainingPipelineRequest>,
    ) -> Result<tonic::Response<Operation>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.PipelineService/DeleteTrainingPipeline");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn cancel_training_pipeline(
        &mut self,
        request: impl tonic::IntoRequest<CancelTrainingPipelineRequest>,
    ) -> Result<tonic::Response<CancelTrainingPipelineResponse>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.PipelineService/CancelTrainingPipeline");
        self.inner.unary(request.into_request(), path, codec).await
    }
}

/// Client for `altus.v1.ModelService`.
#[derive(Debug, Clone)]
pub struct ModelServiceClient {
    inner: tonic::client::Grpc<Channel>,
}

impl ModelServiceClient {
    #[must_use]
    pub fn new(channel: Channel) -> Self {
        Self { inner: tonic::client::Grpc::new(channel) }
    }

    pub async fn get_model(
        &mut self,
        request: impl tonic::IntoRequest<GetModelRequest>,
    ) -> Result<tonic::Response<Model>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.ModelService/GetModel");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn list_models(
        &mut self,
        request: impl tonic::IntoRequest<ListModelsRequest>,
    ) -> Result<tonic::Response<ListModelsResponse>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.ModelService/ListModels");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn delete_model(
        &mut self,
        request: impl tonic::IntoRequest<DeleteModelRequest>,
    ) -> Result<tonic::Response<Operation>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.ModelService/DeleteModel");
        self.inner.unary(request.into_request(), path, codec).await
    }
}

/// Client for `altus.v1.TensorboardService`.
#[derive(Debug, Clone)]
pub struct TensorboardServiceClient {
    inner: tonic::client::Grpc<Channel>,
}

impl TensorboardServiceClient {
    #[must_use]
    pub fn new(channel: Channel) -> Self {
        Self { inner: tonic::client::Grpc::new(channel) }
    }

    pub async fn create_tensorboard(
        &mut self,
        request: impl tonic::IntoRequest<CreateTensorboardRequest>,
    ) -> Result<tonic::Response<Operation>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.TensorboardService/CreateTensorboard");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn get_tensorboard(
        &mut self,
        request: impl tonic::IntoRequest<GetTensorboardRequest>,
    ) -> Result<tonic::Response<Tensorboard>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.TensorboardService/GetTensorboard");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn delete_tensorboard(
        &mut self,
        request: impl tonic::IntoRequest<DeleteTensorboardRequest>,
    ) -> Result<tonic::Response<Operation>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.TensorboardService/DeleteTensorboard");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn create_tensorboard_experiment(
        &mut self,
        request: impl tonic::IntoRequest<CreateTensorboardExperimentRequest>,
    ) -> Result<tonic::Response<TensorboardExperiment>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path =
            PathAndQuery::from_static("/altus.v1.TensorboardService/CreateTensorboardExperiment");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn get_tensorboard_experiment(
        &mut self,
        request: impl tonic::IntoRequest<GetTensorboardExperimentRequest>,
    ) -> Result<tonic::Response<TensorboardExperiment>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path =
            PathAndQuery::from_static("/altus.v1.TensorboardService/GetTensorboardExperiment");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn delete_tensorboard_experiment(
        &mut self,
        request: impl tonic::IntoRequest<DeleteTensorboardExperimentRequest>,
    ) -> Result<tonic::Response<Operation>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path =
            PathAndQuery::from_static("/altus.v1.TensorboardService/DeleteTensorboardExperiment");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn create_tensorboard_run(
        &mut self,
        request: impl tonic::IntoRequest<CreateTensorboardRunRequest>,
    ) -> Result<tonic::Response<TensorboardRun>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.TensorboardService/CreateTensorboardRun");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn batch_create_tensorboard_runs(
        &mut self,
        request: impl tonic::IntoRequest<BatchCreateTensorboardRunsRequest>,
    ) -> Result<tonic::Response<BatchCreateTensorboardRunsResponse>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path =
            PathAndQuery::from_static("/altus.v1.TensorboardService/BatchCreateTensorboardRuns");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn get_tensorboard_run(
        &mut self,
        request: impl tonic::IntoRequest<GetTensorboardRunRequest>,
    ) -> Result<tonic::Response<TensorboardRun>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.TensorboardService/GetTensorboardRun");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn delete_tensorboard_run(
        &mut self,
        request: impl tonic::IntoRequest<DeleteTensorboardRunRequest>,
    ) -> Result<tonic::Response<Operation>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path = PathAndQuery::from_static("/altus.v1.TensorboardService/DeleteTensorboardRun");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn create_tensorboard_time_series(
        &mut self,
        request: impl tonic::IntoRequest<CreateTensorboardTimeSeriesRequest>,
    ) -> Result<tonic::Response<TensorboardTimeSeries>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path =
            PathAndQuery::from_static("/altus.v1.TensorboardService/CreateTensorboardTimeSeries");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn get_tensorboard_time_series(
        &mut self,
        request: impl tonic::IntoRequest<GetTensorboardTimeSeriesRequest>,
    ) -> Result<tonic::Response<TensorboardTimeSeries>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path =
            PathAndQuery::from_static("/altus.v1.TensorboardService/GetTensorboardTimeSeries");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn delete_tensorboard_time_series(
        &mut self,
        request: impl tonic::IntoRequest<DeleteTensorboardTimeSeriesRequest>,
    ) -> Result<tonic::Response<Operation>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path =
            PathAndQuery::from_static("/altus.v1.TensorboardService/DeleteTensorboardTimeSeries");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn write_tensorboard_run_data(
        &mut self,
        request: impl tonic::IntoRequest<WriteTensorboardRunDataRequest>,
    ) -> Result<tonic::Response<WriteTensorboardRunDataResponse>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path =
            PathAndQuery::from_static("/altus.v1.TensorboardService/WriteTensorboardRunData");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn read_tensorboard_time_series_data(
        &mut self,
        request: impl tonic::IntoRequest<ReadTensorboardTimeSeriesDataRequest>,
    ) -> Result<tonic::Response<ReadTensorboardTimeSeriesDataResponse>, tonic::Status> {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path =
            PathAndQuery::from_static("/altus.v1.TensorboardService/ReadTensorboardTimeSeriesData");
        self.inner.unary(request.into_request(), path, codec).await
    }

    pub async fn read_tensorboard_blob_data(
        &mut self,
        request: impl tonic::IntoRequest<ReadTensorboardBlobDataRequest>,
    ) -> Result<tonic::Response<tonic::codec::Streaming<ReadTensorboardBlobDataResponse>>, tonic::Status>
    {
        self.inner.ready().await.map_err(not_ready)?;
        let codec: ProstCodec<_, _> = ProstCodec::default();
        let path =
            PathAndQuery::from_static("/altus.v1.TensorboardService/ReadTensorboardBlobData");
        self.inner.server_streaming(request.into_request(), path, codec).await
    }
}
