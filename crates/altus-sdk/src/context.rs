//! SDK context: the bundle of services and defaults every façade runs against.
//!
//! A [`SdkContext`] is cheap to clone and safe to share; it pins the
//! configuration record that was current when it was built, so a later
//! [`crate::config::init`] does not change the behaviour of live handles.

use std::sync::Arc;

use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{ClientTlsConfig, Endpoint};
use tracing::info;

use altus_proto::v1 as pb;
use altus_proto::v1::clients::{
    DatasetServiceClient, ModelServiceClient, OperationsServiceClient, PipelineServiceClient,
    TensorboardServiceClient,
};
use altus_proto::v1::services::{
    BlobDataStream, DatasetService, ModelService, OperationsService, PipelineService,
    TensorboardService,
};

use crate::config::{self, Credentials, GlobalConfig};
use crate::error::{AltusError, Result};
use crate::operation::PollConfig;

/// The five service seams of the platform, as shared trait objects.
///
/// Production wiring points all of them at one [`GrpcPlatform`]; tests point
/// them at an in-process implementation.
#[derive(Clone)]
pub struct PlatformServices {
    pub operations: Arc<dyn OperationsService>,
    pub datasets: Arc<dyn DatasetService>,
    pub pipelines: Arc<dyn PipelineService>,
    pub models: Arc<dyn ModelService>,
    pub tensorboards: Arc<dyn TensorboardService>,
}

impl PlatformServices {
    /// Wires all five seams to one backend that implements every service.
    pub fn from_single<S>(service: Arc<S>) -> Self
    where
        S: OperationsService
            + DatasetService
            + PipelineService
            + ModelService
            + TensorboardService
            + 'static,
    {
        Self {
            operations: service.clone(),
            datasets: service.clone(),
            pipelines: service.clone(),
            models: service.clone(),
            tensorboards: service,
        }
    }
}

/// Shared handle for façades: services, pinned configuration, poll tuning.
#[derive(Clone)]
pub struct SdkContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    services: PlatformServices,
    config: Arc<GlobalConfig>,
    poll: PollConfig,
}

impl SdkContext {
    /// Builds a context from explicit services and a configuration record.
    #[must_use]
    pub fn new(services: PlatformServices, config: Arc<GlobalConfig>) -> Self {
        Self {
            inner: Arc::new(ContextInner { services, config, poll: PollConfig::default() }),
        }
    }

    /// Builds a context from the process-wide configuration, dialing the
    /// platform endpoint lazily.
    ///
    /// # Errors
    /// Fails when no location can be resolved (it selects the endpoint), the
    /// endpoint URL is malformed, or credentials cannot become metadata.
    pub fn from_global() -> Result<Self> {
        let config = config::global();
        let location = config.resolved_location(None)?;
        let endpoint = config.endpoint_for(&location);
        let platform = GrpcPlatform::connect(&endpoint, config.credentials.as_ref())?;
        info!(endpoint = %endpoint, "Altus SDK context ready");
        Ok(Self::new(PlatformServices::from_single(Arc::new(platform)), config))
    }

    /// Returns a context identical to this one but with different poll
    /// tuning. Mostly useful in tests against local backends.
    #[must_use]
    pub fn with_poll_config(&self, poll: PollConfig) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                services: self.inner.services.clone(),
                config: self.inner.config.clone(),
                poll,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &GlobalConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn poll_config(&self) -> &PollConfig {
        &self.inner.poll
    }

    #[must_use]
    pub fn operations(&self) -> Arc<dyn OperationsService> {
        self.inner.services.operations.clone()
    }

    #[must_use]
    pub fn datasets(&self) -> Arc<dyn DatasetService> {
        self.inner.services.datasets.clone()
    }

    #[must_use]
    pub fn pipelines(&self) -> Arc<dyn PipelineService> {
        self.inner.services.pipelines.clone()
    }

    #[must_use]
    pub fn models(&self) -> Arc<dyn ModelService> {
        self.inner.services.models.clone()
    }

    #[must_use]
    pub fn tensorboards(&self) -> Arc<dyn TensorboardService> {
        self.inner.services.tensorboards.clone()
    }
}

impl std::fmt::Debug for SdkContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkContext")
            .field("config", &self.inner.config)
            .field("poll", &self.inner.poll)
            .finish_non_exhaustive()
    }
}

/// Production backend: the five gRPC stubs over one shared channel.
pub struct GrpcPlatform {
    operations: OperationsServiceClient,
    datasets: DatasetServiceClient,
    pipelines: PipelineServiceClient,
    models: ModelServiceClient,
    tensorboards: TensorboardServiceClient,
    auth: Option<(&'static str, MetadataValue<Ascii>)>,
}

impl GrpcPlatform {
    /// Dials `endpoint` lazily and prepares authentication metadata.
    ///
    /// # Errors
    /// Fails on a malformed endpoint URL, TLS setup problems, or credentials
    /// that cannot be encoded as ASCII metadata.
    pub fn connect(endpoint: &str, credentials: Option<&Credentials>) -> Result<Self> {
        let mut builder = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| AltusError::BadArgument(format!("invalid endpoint {endpoint:?}: {e}")))?;
        if endpoint.starts_with("https://") {
            builder = builder
                .tls_config(ClientTlsConfig::new().with_native_roots())
                .map_err(|e| AltusError::Transport(format!("TLS setup failed: {e}")))?;
        }
        let channel = builder.connect_lazy();

        let auth = match credentials {
            Some(credentials) => {
                let (key, value) = credentials.metadata();
                let value = value.parse::<MetadataValue<Ascii>>().map_err(|_| {
                    AltusError::BadArgument("credentials are not valid ASCII metadata".to_string())
                })?;
                Some((key, value))
            }
            None => None,
        };

        Ok(Self {
            operations: OperationsServiceClient::new(channel.clone()),
            datasets: DatasetServiceClient::new(channel.clone()),
            pipelines: PipelineServiceClient::new(channel.clone()),
            models: ModelServiceClient::new(channel.clone()),
            tensorboards: TensorboardServiceClient::new(channel),
            auth,
        })
    }

    fn request<T>(&self, message: T) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        if let Some((key, value)) = &self.auth {
            request.metadata_mut().insert(*key, value.clone());
        }
        request
    }
}

impl std::fmt::Debug for GrpcPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrpcPlatform")
            .field("authenticated", &self.auth.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl OperationsService for GrpcPlatform {
    async fn get_operation(
        &self,
        request: pb::GetOperationRequest,
    ) -> std::result::Result<pb::Operation, tonic::Status> {
        self.operations
            .clone()
            .get_operation(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn cancel_operation(
        &self,
        request: pb::CancelOperationRequest,
    ) -> std::result::Result<pb::CancelOperationResponse, tonic::Status> {
        self.operations
            .clone()
            .cancel_operation(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }
}

#[async_trait::async_trait]
impl DatasetService for GrpcPlatform {
    async fn create_dataset(
        &self,
        request: pb::CreateDatasetRequest,
    ) -> std::result::Result<pb::Operation, tonic::Status> {
        self.datasets
            .clone()
            .create_dataset(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn get_dataset(
        &self,
        request: pb::GetDatasetRequest,
    ) -> std::result::Result<pb::Dataset, tonic::Status> {
        self.datasets
            .clone()
            .get_dataset(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn list_datasets(
        &self,
        request: pb::ListDatasetsRequest,
    ) -> std::result::Result<pb::ListDatasetsResponse, tonic::Status> {
        self.datasets
            .clone()
            .list_datasets(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn update_dataset(
        &self,
        request: pb::UpdateDatasetRequest,
    ) -> std::result::Result<pb::Dataset, tonic::Status> {
        self.datasets
            .clone()
            .update_dataset(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn delete_dataset(
        &self,
        request: pb::DeleteDatasetRequest,
    ) -> std::result::Result<pb::Operation, tonic::Status> {
        self.datasets
            .clone()
            .delete_dataset(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn import_data(
        &self,
        request: pb::ImportDataRequest,
    ) -> std::result::Result<pb::Operation, tonic::Status> {
        self.datasets
            .clone()
            .import_data(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }
}

#[async_trait::async_trait]
impl PipelineService for GrpcPlatform {
    async fn create_training_pipeline(
        &self,
        request: pb::CreateTrainingPipelineRequest,
    ) -> std::result::Result<pb::TrainingPipeline, tonic::Status> {
        self.pipelines
            .clone()
            .create_training_pipeline(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn get_training_pipeline(
        &self,
        request: pb::GetTrainingPipelineRequest,
    ) -> std::result::Result<pb::TrainingPipeline, tonic::Status> {
        self.pipelines
            .clone()
            .get_training_pipeline(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn list_training_pipelines(
        &self,
        request: pb::ListTrainingPipelinesRequest,
    ) -> std::result::Result<pb::ListTrainingPipelinesResponse, tonic::Status> {
        self.pipelines
            .clone()
            .list_training_pipelines(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn delete_training_pipeline(
        &self,
        request: pb::DeleteTrainingPipelineRequest,
    ) -> std::result::Result<pb::Operation, tonic::Status> {
        self.pipelines
            .clone()
            .delete_training_pipeline(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn cancel_training_pipeline(
        &self,
        request: pb::CancelTrainingPipelineRequest,
    ) -> std::result::Result<pb::CancelTrainingPipelineResponse, tonic::Status> {
        self.pipelines
            .clone()
            .cancel_training_pipeline(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }
}

#[async_trait::async_trait]
impl ModelService for GrpcPlatform {
    async fn get_model(
        &self,
        request: pb::GetModelRequest,
    ) -> std::result::Result<pb::Model, tonic::Status> {
        self.models
            .clone()
            .get_model(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn list_models(
        &self,
        request: pb::ListModelsRequest,
    ) -> std::result::Result<pb::ListModelsResponse, tonic::Status> {
        self.models
            .clone()
            .list_models(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn delete_model(
        &self,
        request: pb::DeleteModelRequest,
    ) -> std::result::Result<pb::Operation, tonic::Status> {
        self.models
            .clone()
            .delete_model(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }
}

#[async_trait::async_trait]
impl TensorboardService for GrpcPlatform {
    async fn create_tensorboard(
        &self,
        request: pb::CreateTensorboardRequest,
    ) -> std::result::Result<pb::Operation, tonic::Status> {
        self.tensorboards
            .clone()
            .create_tensorboard(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn get_tensorboard(
        &self,
        request: pb::GetTensorboardRequest,
    ) -> std::result::Result<pb::Tensorboard, tonic::Status> {
        self.tensorboards
            .clone()
            .get_tensorboard(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn delete_tensorboard(
        &self,
        request: pb::DeleteTensorboardRequest,
    ) -> std::result::Result<pb::Operation, tonic::Status> {
        self.tensorboards
            .clone()
            .delete_tensorboard(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn create_tensorboard_experiment(
        &self,
        request: pb::CreateTensorboardExperimentRequest,
    ) -> std::result::Result<pb::TensorboardExperiment, tonic::Status> {
        self.tensorboards
            .clone()
            .create_tensorboard_experiment(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn get_tensorboard_experiment(
        &self,
        request: pb::GetTensorboardExperimentRequest,
    ) -> std::result::Result<pb::TensorboardExperiment, tonic::Status> {
        self.tensorboards
            .clone()
            .get_tensorboard_experiment(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn delete_tensorboard_experiment(
        &self,
        request: pb::DeleteTensorboardExperimentRequest,
    ) -> std::result::Result<pb::Operation, tonic::Status> {
        self.tensorboards
            .clone()
            .delete_tensorboard_experiment(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn create_tensorboard_run(
        &self,
        request: pb::CreateTensorboardRunRequest,
    ) -> std::result::Result<pb::TensorboardRun, tonic::Status> {
        self.tensorboards
            .clone()
            .create_tensorboard_run(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn batch_create_tensorboard_runs(
        &self,
        request: pb::BatchCreateTensorboardRunsRequest,
    ) -> std::result::Result<pb::BatchCreateTensorboardRunsResponse, tonic::Status> {
        self.tensorboards
            .clone()
            .batch_create_tensorboard_runs(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn get_tensorboard_run(
        &self,
        request: pb::GetTensorboardRunRequest,
    ) -> std::result::Result<pb::TensorboardRun, tonic::Status> {
        self.tensorboards
            .clone()
            .get_tensorboard_run(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn delete_tensorboard_run(
        &self,
        request: pb::DeleteTensorboardRunRequest,
    ) -> std::result::Result<pb::Operation, tonic::Status> {
        self.tensorboards
            .clone()
            .delete_tensorboard_run(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn create_tensorboard_time_series(
        &self,
        request: pb::CreateTensorboardTimeSeriesRequest,
    ) -> std::result::Result<pb::TensorboardTimeSeries, tonic::Status> {
        self.tensorboards
            .clone()
            .create_tensorboard_time_series(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn get_tensorboard_time_series(
        &self,
        request: pb::GetTensorboardTimeSeriesRequest,
    ) -> std::result::Result<pb::TensorboardTimeSeries, tonic::Status> {
        self.tensorboards
            .clone()
            .get_tensorboard_time_series(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn delete_tensorboard_time_series(
        &self,
        request: pb::DeleteTensorboardTimeSeriesRequest,
    ) -> std::result::Result<pb::Operation, tonic::Status> {
        self.tensorboards
            .clone()
            .delete_tensorboard_time_series(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn write_tensorboard_run_data(
        &self,
        request: pb::WriteTensorboardRunDataRequest,
    ) -> std::result::Result<pb::WriteTensorboardRunDataResponse, tonic::Status> {
        self.tensorboards
            .clone()
            .write_tensorboard_run_data(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn read_tensorboard_time_series_data(
        &self,
        request: pb::ReadTensorboardTimeSeriesDataRequest,
    ) -> std::result::Result<pb::ReadTensorboardTimeSeriesDataResponse, tonic::Status> {
        self.tensorboards
            .clone()
            .read_tensorboard_time_series_data(self.request(request))
            .await
            .map(tonic::Response::into_inner)
    }

    async fn read_tensorboard_blob_data(
        &self,
        request: pb::ReadTensorboardBlobDataRequest,
    ) -> std::result::Result<BlobDataStream, tonic::Status> {
        let streaming = self
            .tensorboards
            .clone()
            .read_tensorboard_blob_data(self.request(request))
            .await?
            .into_inner();
        Ok(Box::pin(streaming))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_malformed_endpoint() {
        let err = GrpcPlatform::connect("not a url", None).unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));
    }

    #[tokio::test]
    async fn test_connect_is_lazy() {
        // No listener anywhere near this port; lazy dialing must still succeed.
        let platform = GrpcPlatform::connect("http://127.0.0.1:1", None).unwrap();
        assert!(format!("{platform:?}").contains("authenticated: false"));
    }

    #[tokio::test]
    async fn test_connect_builds_auth_metadata() {
        let creds = Credentials::BearerToken("tok".to_string());
        let platform = GrpcPlatform::connect("http://127.0.0.1:1", Some(&creds)).unwrap();
        assert!(format!("{platform:?}").contains("authenticated: true"));
    }

    #[tokio::test]
    async fn test_connect_rejects_non_ascii_credentials() {
        let creds = Credentials::ApiKey("clé".to_string());
        let err = GrpcPlatform::connect("http://127.0.0.1:1", Some(&creds)).unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));
    }
}
