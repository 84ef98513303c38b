//! In-process platform backend for tests and local development.
//!
//! [`MockPlatform`] implements all five service traits over shared in-memory
//! tables keyed by canonical resource name. It records every call, can fail
//! the next call to a chosen method, and completes operations after a
//! configurable number of polls, so operation and scheduling paths can be
//! exercised deterministically without a server.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use async_trait::async_trait;
use futures::StreamExt;
use prost_types::{Any, Timestamp};
use tonic::Status;
use tracing::debug;

use altus_proto::v1 as pb;
use altus_proto::v1::services::{
    BlobDataStream, DatasetService, ModelService, OperationsService, PipelineService,
    TensorboardService,
};

/// An in-memory stand-in for the whole platform.
///
/// Wire it into every seam with
/// [`PlatformServices::from_single`](crate::context::PlatformServices::from_single).
/// Mutating calls allocate ids monotonically, so resource names are
/// deterministic within one instance.
pub struct MockPlatform {
    state: Mutex<MockState>,
}

struct MockState {
    next_id: u64,
    operation_polls: u32,
    pipeline_polls: u32,
    operations: HashMap<String, PendingOperation>,
    datasets: HashMap<String, pb::Dataset>,
    pipelines: HashMap<String, pb::TrainingPipeline>,
    pipeline_steps: HashMap<String, u32>,
    models: HashMap<String, pb::Model>,
    tensorboards: HashMap<String, pb::Tensorboard>,
    experiments: HashMap<String, pb::TensorboardExperiment>,
    runs: HashMap<String, pb::TensorboardRun>,
    time_series: HashMap<String, pb::TensorboardTimeSeries>,
    /// Child resource name to parent resource name, for the tensorboard
    /// family. Children get flat names under the location; this map keeps
    /// the containment relation.
    parents: HashMap<String, String>,
    points: HashMap<String, Vec<pb::TimeSeriesDataPoint>>,
    blobs: HashMap<String, Vec<pb::TensorboardBlob>>,
    calls: Vec<(&'static str, String)>,
    fail_next: HashMap<&'static str, Status>,
}

/// An operation that has been started but whose terminal outcome has not
/// been observed yet.
struct PendingOperation {
    /// How many `get_operation` calls remain before the terminal view.
    remaining_polls: u32,
    outcome: Result<Any, pb::Status>,
    cancelled: bool,
}

impl MockPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: 1,
                operation_polls: 0,
                pipeline_polls: 1,
                operations: HashMap::new(),
                datasets: HashMap::new(),
                pipelines: HashMap::new(),
                pipeline_steps: HashMap::new(),
                models: HashMap::new(),
                tensorboards: HashMap::new(),
                experiments: HashMap::new(),
                runs: HashMap::new(),
                time_series: HashMap::new(),
                parents: HashMap::new(),
                points: HashMap::new(),
                blobs: HashMap::new(),
                calls: Vec::new(),
                fail_next: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Method names of every call received so far, in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.iter().map(|(method, _)| *method).collect()
    }

    /// How many calls the named method has received.
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.lock().calls.iter().filter(|(m, _)| *m == method).count()
    }

    /// Fails the next call to `method` with `status`. Single shot: the call
    /// after that behaves normally again.
    pub fn fail_next(&self, method: &'static str, status: Status) {
        self.lock().fail_next.insert(method, status);
    }

    /// Operations started after this call report `done` only after `polls`
    /// `get_operation` calls. Zero (the default) means operations come back
    /// already terminal.
    pub fn set_operation_polls(&self, polls: u32) {
        self.lock().operation_polls = polls;
    }

    /// Pipelines created after this call need `polls` `get_training_pipeline`
    /// calls to reach a terminal state.
    pub fn set_pipeline_polls(&self, polls: u32) {
        self.lock().pipeline_polls = polls;
    }

    /// Seeds a dataset without going through `create_dataset`.
    pub fn insert_dataset(&self, dataset: pb::Dataset) {
        self.lock().datasets.insert(dataset.name.clone(), dataset);
    }

    /// Seeds a model without running a pipeline.
    pub fn insert_model(&self, model: pb::Model) {
        self.lock().models.insert(model.name.clone(), model);
    }

    /// Attaches a blob to a time series so `read_tensorboard_blob_data` has
    /// something to stream. The write RPC only carries scalars.
    pub fn insert_blob(&self, time_series: &str, blob: pb::TensorboardBlob) {
        self.lock().blobs.entry(time_series.to_string()).or_default().push(blob);
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("MockPlatform")
            .field("calls", &state.calls.len())
            .field("operations", &state.operations.len())
            .finish_non_exhaustive()
    }
}

impl MockState {
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Logs the call, then applies any scripted failure for `method`.
    fn record(&mut self, method: &'static str, resource: &str) -> Result<(), Status> {
        debug!(method, resource, "Mock platform call");
        self.calls.push((method, resource.to_string()));
        match self.fail_next.remove(method) {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }

    /// Registers an operation and returns its initial view: terminal right
    /// away when `operation_polls` is zero, otherwise still running.
    fn start_operation(&mut self, outcome: Result<Any, pb::Status>) -> pb::Operation {
        let name = format!("operations/{}", self.allocate_id());
        let pending =
            PendingOperation { remaining_polls: self.operation_polls, outcome, cancelled: false };
        debug!(operation = %name, polls = pending.remaining_polls, "Mock operation started");
        let view = if pending.remaining_polls == 0 {
            terminal_view(&name, &pending)
        } else {
            running_view(&name)
        };
        self.operations.insert(name, pending);
        view
    }
}

fn running_view(name: &str) -> pb::Operation {
    pb::Operation { name: name.to_string(), metadata: None, done: false, result: None }
}

fn terminal_view(name: &str, pending: &PendingOperation) -> pb::Operation {
    let result = match &pending.outcome {
        Ok(payload) => pb::operation::Result::Response(payload.clone()),
        Err(status) => pb::operation::Result::Error(status.clone()),
    };
    pb::Operation { name: name.to_string(), metadata: None, done: true, result: Some(result) }
}

fn cancelled_status() -> pb::Status {
    pb::Status {
        code: tonic::Code::Cancelled as i32,
        message: "operation cancelled by caller".to_string(),
    }
}

fn not_found(what: &str, name: &str) -> Status {
    Status::not_found(format!("{what} {name:?} not found"))
}

fn pack<M: prost::Name>(message: &M) -> Result<Any, Status> {
    Any::from_msg(message).map_err(|e| Status::internal(format!("failed to encode payload: {e}")))
}

fn now() -> Option<Timestamp> {
    Some(Timestamp::from(SystemTime::now()))
}

/// The `projects/{project}/locations/{location}` prefix of a resource name.
fn location_prefix(name: &str) -> String {
    name.split('/').take(4).collect::<Vec<_>>().join("/")
}

/// Supports the single filter form `display_name="value"`. An empty filter
/// matches everything.
fn filter_matches(filter: &str, display_name: &str) -> Result<bool, Status> {
    let filter = filter.trim();
    if filter.is_empty() {
        return Ok(true);
    }
    let Some(wanted) = filter.strip_prefix("display_name=") else {
        return Err(Status::invalid_argument(format!("unsupported filter {filter:?}")));
    };
    Ok(display_name == wanted.trim().trim_matches('"'))
}

/// Applies page-token paging over a sorted snapshot. Tokens are plain
/// decimal offsets; an empty next token means the listing is exhausted.
fn page<T>(items: Vec<T>, page_size: i32, page_token: &str) -> Result<(Vec<T>, String), Status> {
    let start = if page_token.is_empty() {
        0
    } else {
        page_token
            .parse::<usize>()
            .map_err(|_| Status::invalid_argument(format!("bad page token {page_token:?}")))?
    };
    if start >= items.len() {
        return Ok((Vec::new(), String::new()));
    }
    let size = match usize::try_from(page_size) {
        Ok(0) | Err(_) => items.len(),
        Ok(size) => size,
    };
    let end = items.len().min(start + size);
    let next = if end < items.len() { end.to_string() } else { String::new() };
    let page = items.into_iter().skip(start).take(end - start).collect();
    Ok((page, next))
}

#[async_trait]
impl OperationsService for MockPlatform {
    async fn get_operation(&self, request: pb::GetOperationRequest) -> Result<pb::Operation, Status> {
        let mut state = self.lock();
        state.record("get_operation", &request.name)?;
        let Some(pending) = state.operations.get_mut(&request.name) else {
            return Err(not_found("operation", &request.name));
        };
        if pending.cancelled && pending.remaining_polls > 0 {
            pending.remaining_polls = 0;
            pending.outcome = Err(cancelled_status());
        }
        if pending.remaining_polls > 1 {
            pending.remaining_polls -= 1;
            return Ok(running_view(&request.name));
        }
        pending.remaining_polls = 0;
        Ok(terminal_view(&request.name, pending))
    }

    async fn cancel_operation(
        &self,
        request: pb::CancelOperationRequest,
    ) -> Result<pb::CancelOperationResponse, Status> {
        let mut state = self.lock();
        state.record("cancel_operation", &request.name)?;
        let Some(pending) = state.operations.get_mut(&request.name) else {
            return Err(not_found("operation", &request.name));
        };
        // Cancelling a finished operation is accepted and changes nothing.
        if pending.remaining_polls > 0 {
            pending.cancelled = true;
        }
        Ok(pb::CancelOperationResponse {})
    }
}

#[async_trait]
impl DatasetService for MockPlatform {
    async fn create_dataset(
        &self,
        request: pb::CreateDatasetRequest,
    ) -> Result<pb::Operation, Status> {
        let mut state = self.lock();
        state.record("create_dataset", &request.parent)?;
        let Some(mut dataset) = request.dataset else {
            return Err(Status::invalid_argument("create_dataset requires a dataset"));
        };
        dataset.name = format!("{}/datasets/{}", request.parent, state.allocate_id());
        dataset.create_time = now();
        dataset.update_time = dataset.create_time.clone();
        let payload = pack(&dataset)?;
        state.datasets.insert(dataset.name.clone(), dataset);
        Ok(state.start_operation(Ok(payload)))
    }

    async fn get_dataset(&self, request: pb::GetDatasetRequest) -> Result<pb::Dataset, Status> {
        let mut state = self.lock();
        state.record("get_dataset", &request.name)?;
        state
            .datasets
            .get(&request.name)
            .cloned()
            .ok_or_else(|| not_found("dataset", &request.name))
    }

    async fn list_datasets(
        &self,
        request: pb::ListDatasetsRequest,
    ) -> Result<pb::ListDatasetsResponse, Status> {
        let mut state = self.lock();
        state.record("list_datasets", &request.parent)?;
        let prefix = format!("{}/datasets/", request.parent);
        let mut matched = Vec::new();
        for dataset in state.datasets.values() {
            if dataset.name.starts_with(&prefix)
                && filter_matches(&request.filter, &dataset.display_name)?
            {
                matched.push(dataset.clone());
            }
        }
        matched.sort_by(|a, b| a.name.cmp(&b.name));
        let (datasets, next_page_token) = page(matched, request.page_size, &request.page_token)?;
        Ok(pb::ListDatasetsResponse { datasets, next_page_token })
    }

    async fn update_dataset(
        &self,
        request: pb::UpdateDatasetRequest,
    ) -> Result<pb::Dataset, Status> {
        let mut state = self.lock();
        let target = request.dataset.as_ref().map_or(String::new(), |d| d.name.clone());
        state.record("update_dataset", &target)?;
        let Some(update) = request.dataset else {
            return Err(Status::invalid_argument("update_dataset requires a dataset"));
        };
        let paths = request.update_mask.map(|mask| mask.paths).unwrap_or_default();
        if paths.is_empty() {
            return Err(Status::invalid_argument("update_dataset requires a non-empty update mask"));
        }
        let Some(existing) = state.datasets.get_mut(&update.name) else {
            return Err(not_found("dataset", &update.name));
        };
        for path in &paths {
            match path.as_str() {
                "display_name" => existing.display_name = update.display_name.clone(),
                "labels" => existing.labels = update.labels.clone(),
                other => {
                    return Err(Status::invalid_argument(format!(
                        "unsupported update path {other:?}"
                    )));
                }
            }
        }
        existing.update_time = now();
        Ok(existing.clone())
    }

    async fn delete_dataset(
        &self,
        request: pb::DeleteDatasetRequest,
    ) -> Result<pb::Operation, Status> {
        let mut state = self.lock();
        state.record("delete_dataset", &request.name)?;
        if state.datasets.remove(&request.name).is_none() {
            return Err(not_found("dataset", &request.name));
        }
        let payload = pack(&pb::DeleteOperationResponse {})?;
        Ok(state.start_operation(Ok(payload)))
    }

    async fn import_data(&self, request: pb::ImportDataRequest) -> Result<pb::Operation, Status> {
        let mut state = self.lock();
        state.record("import_data", &request.name)?;
        if !state.datasets.contains_key(&request.name) {
            return Err(not_found("dataset", &request.name));
        }
        if request.import_configs.is_empty() {
            return Err(Status::invalid_argument("import_data requires at least one import config"));
        }
        let payload = pack(&pb::ImportDataResponse {})?;
        Ok(state.start_operation(Ok(payload)))
    }
}

#[async_trait]
impl PipelineService for MockPlatform {
    async fn create_training_pipeline(
        &self,
        request: pb::CreateTrainingPipelineRequest,
    ) -> Result<pb::TrainingPipeline, Status> {
        let mut state = self.lock();
        state.record("create_training_pipeline", &request.parent)?;
        let Some(mut pipeline) = request.training_pipeline else {
            return Err(Status::invalid_argument(
                "create_training_pipeline requires a training pipeline",
            ));
        };
        pipeline.name = format!("{}/trainingPipelines/{}", request.parent, state.allocate_id());
        pipeline.set_state(pb::PipelineState::Pending);
        pipeline.create_time = now();
        let steps = state.pipeline_polls;
        state.pipeline_steps.insert(pipeline.name.clone(), steps);
        state.pipelines.insert(pipeline.name.clone(), pipeline.clone());
        Ok(pipeline)
    }

    async fn get_training_pipeline(
        &self,
        request: pb::GetTrainingPipelineRequest,
    ) -> Result<pb::TrainingPipeline, Status> {
        let mut state = self.lock();
        state.record("get_training_pipeline", &request.name)?;
        let Some(pipeline) = state.pipelines.get(&request.name) else {
            return Err(not_found("training pipeline", &request.name));
        };
        if pipeline.state().is_terminal() {
            return Ok(pipeline.clone());
        }
        let mut pipeline = pipeline.clone();

        if pipeline.state() == pb::PipelineState::Cancelling {
            pipeline.set_state(pb::PipelineState::Cancelled);
            pipeline.error = Some(pb::Status {
                code: tonic::Code::Cancelled as i32,
                message: "training pipeline cancelled by caller".to_string(),
            });
            pipeline.end_time = now();
            state.pipelines.insert(request.name.clone(), pipeline.clone());
            return Ok(pipeline);
        }

        let remaining = state.pipeline_steps.get(&request.name).copied().unwrap_or(0);
        if remaining > 1 {
            state.pipeline_steps.insert(request.name.clone(), remaining - 1);
            pipeline.set_state(pb::PipelineState::Running);
            if pipeline.start_time.is_none() {
                pipeline.start_time = now();
            }
            state.pipelines.insert(request.name.clone(), pipeline.clone());
            return Ok(pipeline);
        }

        pipeline.set_state(pb::PipelineState::Succeeded);
        pipeline.end_time = now();
        let model_id = state.allocate_id();
        let mut model = pipeline.model_to_upload.take().unwrap_or_default();
        model.name = format!("{}/models/{model_id}", location_prefix(&request.name));
        if model.create_time.is_none() {
            model.create_time = now();
        }
        model.update_time = model.create_time.clone();
        state.models.insert(model.name.clone(), model.clone());
        pipeline.model_to_upload = Some(model);
        state.pipelines.insert(request.name.clone(), pipeline.clone());
        Ok(pipeline)
    }

    async fn list_training_pipelines(
        &self,
        request: pb::ListTrainingPipelinesRequest,
    ) -> Result<pb::ListTrainingPipelinesResponse, Status> {
        let mut state = self.lock();
        state.record("list_training_pipelines", &request.parent)?;
        let prefix = format!("{}/trainingPipelines/", request.parent);
        let mut matched = Vec::new();
        for pipeline in state.pipelines.values() {
            if pipeline.name.starts_with(&prefix)
                && filter_matches(&request.filter, &pipeline.display_name)?
            {
                matched.push(pipeline.clone());
            }
        }
        matched.sort_by(|a, b| a.name.cmp(&b.name));
        let (training_pipelines, next_page_token) =
            page(matched, request.page_size, &request.page_token)?;
        Ok(pb::ListTrainingPipelinesResponse { training_pipelines, next_page_token })
    }

    async fn delete_training_pipeline(
        &self,
        request: pb::DeleteTrainingPipelineRequest,
    ) -> Result<pb::Operation, Status> {
        let mut state = self.lock();
        state.record("delete_training_pipeline", &request.name)?;
        let Some(pipeline) = state.pipelines.get(&request.name) else {
            return Err(not_found("training pipeline", &request.name));
        };
        if !pipeline.state().is_terminal() {
            return Err(Status::failed_precondition(format!(
                "training pipeline {:?} is still running",
                request.name
            )));
        }
        state.pipelines.remove(&request.name);
        state.pipeline_steps.remove(&request.name);
        let payload = pack(&pb::DeleteOperationResponse {})?;
        Ok(state.start_operation(Ok(payload)))
    }

    async fn cancel_training_pipeline(
        &self,
        request: pb::CancelTrainingPipelineRequest,
    ) -> Result<pb::CancelTrainingPipelineResponse, Status> {
        let mut state = self.lock();
        state.record("cancel_training_pipeline", &request.name)?;
        let Some(pipeline) = state.pipelines.get_mut(&request.name) else {
            return Err(not_found("training pipeline", &request.name));
        };
        // Cancellation is asynchronous: the next poll observes the terminal
        // state, not this response.
        if !pipeline.state().is_terminal() {
            pipeline.set_state(pb::PipelineState::Cancelling);
        }
        Ok(pb::CancelTrainingPipelineResponse {})
    }
}

#[async_trait]
impl ModelService for MockPlatform {
    async fn get_model(&self, request: pb::GetModelRequest) -> Result<pb::Model, Status> {
        let mut state = self.lock();
        state.record("get_model", &request.name)?;
        state.models.get(&request.name).cloned().ok_or_else(|| not_found("model", &request.name))
    }

    async fn list_models(&self, request: pb::ListModelsRequest) -> Result<pb::ListModelsResponse, Status> {
        let mut state = self.lock();
        state.record("list_models", &request.parent)?;
        let prefix = format!("{}/models/", request.parent);
        let mut matched = Vec::new();
        for model in state.models.values() {
            if model.name.starts_with(&prefix)
                && filter_matches(&request.filter, &model.display_name)?
            {
                matched.push(model.clone());
            }
        }
        matched.sort_by(|a, b| a.name.cmp(&b.name));
        let (models, next_page_token) = page(matched, request.page_size, &request.page_token)?;
        Ok(pb::ListModelsResponse { models, next_page_token })
    }

    async fn delete_model(&self, request: pb::DeleteModelRequest) -> Result<pb::Operation, Status> {
        let mut state = self.lock();
        state.record("delete_model", &request.name)?;
        if state.models.remove(&request.name).is_none() {
            return Err(not_found("model", &request.name));
        }
        let payload = pack(&pb::DeleteOperationResponse {})?;
        Ok(state.start_operation(Ok(payload)))
    }
}

/// Creates one run under an existing experiment; shared by the single and
/// batch create RPCs.
fn create_run(
    state: &mut MockState,
    request: pb::CreateTensorboardRunRequest,
) -> Result<pb::TensorboardRun, Status> {
    if !state.experiments.contains_key(&request.parent) {
        return Err(not_found("tensorboard experiment", &request.parent));
    }
    let id = if request.tensorboard_run_id.is_empty() {
        state.allocate_id().to_string()
    } else {
        request.tensorboard_run_id
    };
    let name = format!("{}/tensorboardRuns/{id}", location_prefix(&request.parent));
    if state.runs.contains_key(&name) {
        return Err(Status::already_exists(format!("tensorboard run {name:?} already exists")));
    }
    let mut run = request.tensorboard_run.unwrap_or_default();
    run.name = name.clone();
    run.create_time = now();
    run.update_time = run.create_time.clone();
    state.parents.insert(name.clone(), request.parent);
    state.runs.insert(name, run.clone());
    Ok(run)
}

#[async_trait]
impl TensorboardService for MockPlatform {
    async fn create_tensorboard(
        &self,
        request: pb::CreateTensorboardRequest,
    ) -> Result<pb::Operation, Status> {
        let mut state = self.lock();
        state.record("create_tensorboard", &request.parent)?;
        let Some(mut tensorboard) = request.tensorboard else {
            return Err(Status::invalid_argument("create_tensorboard requires a tensorboard"));
        };
        tensorboard.name = format!("{}/tensorboards/{}", request.parent, state.allocate_id());
        tensorboard.create_time = now();
        tensorboard.update_time = tensorboard.create_time.clone();
        let payload = pack(&tensorboard)?;
        state.tensorboards.insert(tensorboard.name.clone(), tensorboard);
        Ok(state.start_operation(Ok(payload)))
    }

    async fn get_tensorboard(
        &self,
        request: pb::GetTensorboardRequest,
    ) -> Result<pb::Tensorboard, Status> {
        let mut state = self.lock();
        state.record("get_tensorboard", &request.name)?;
        state
            .tensorboards
            .get(&request.name)
            .cloned()
            .ok_or_else(|| not_found("tensorboard", &request.name))
    }

    async fn delete_tensorboard(
        &self,
        request: pb::DeleteTensorboardRequest,
    ) -> Result<pb::Operation, Status> {
        let mut state = self.lock();
        state.record("delete_tensorboard", &request.name)?;
        if state.tensorboards.remove(&request.name).is_none() {
            return Err(not_found("tensorboard", &request.name));
        }
        let payload = pack(&pb::DeleteOperationResponse {})?;
        Ok(state.start_operation(Ok(payload)))
    }

    async fn create_tensorboard_experiment(
        &self,
        request: pb::CreateTensorboardExperimentRequest,
    ) -> Result<pb::TensorboardExperiment, Status> {
        let mut state = self.lock();
        state.record("create_tensorboard_experiment", &request.parent)?;
        if !state.tensorboards.contains_key(&request.parent) {
            return Err(not_found("tensorboard", &request.parent));
        }
        let id = if request.tensorboard_experiment_id.is_empty() {
            state.allocate_id().to_string()
        } else {
            request.tensorboard_experiment_id
        };
        let name = format!("{}/tensorboardExperiments/{id}", location_prefix(&request.parent));
        if state.experiments.contains_key(&name) {
            return Err(Status::already_exists(format!(
                "tensorboard experiment {name:?} already exists"
            )));
        }
        let mut experiment = request.tensorboard_experiment.unwrap_or_default();
        experiment.name = name.clone();
        experiment.create_time = now();
        experiment.update_time = experiment.create_time.clone();
        state.parents.insert(name.clone(), request.parent);
        state.experiments.insert(name, experiment.clone());
        Ok(experiment)
    }

    async fn get_tensorboard_experiment(
        &self,
        request: pb::GetTensorboardExperimentRequest,
    ) -> Result<pb::TensorboardExperiment, Status> {
        let mut state = self.lock();
        state.record("get_tensorboard_experiment", &request.name)?;
        state
            .experiments
            .get(&request.name)
            .cloned()
            .ok_or_else(|| not_found("tensorboard experiment", &request.name))
    }

    async fn delete_tensorboard_experiment(
        &self,
        request: pb::DeleteTensorboardExperimentRequest,
    ) -> Result<pb::Operation, Status> {
        let mut state = self.lock();
        state.record("delete_tensorboard_experiment", &request.name)?;
        if state.experiments.remove(&request.name).is_none() {
            return Err(not_found("tensorboard experiment", &request.name));
        }
        state.parents.remove(&request.name);
        let payload = pack(&pb::DeleteOperationResponse {})?;
        Ok(state.start_operation(Ok(payload)))
    }

    async fn create_tensorboard_run(
        &self,
        request: pb::CreateTensorboardRunRequest,
    ) -> Result<pb::TensorboardRun, Status> {
        let mut state = self.lock();
        state.record("create_tensorboard_run", &request.parent)?;
        create_run(&mut state, request)
    }

    async fn batch_create_tensorboard_runs(
        &self,
        request: pb::BatchCreateTensorboardRunsRequest,
    ) -> Result<pb::BatchCreateTensorboardRunsResponse, Status> {
        let mut state = self.lock();
        state.record("batch_create_tensorboard_runs", &request.parent)?;
        let mut tensorboard_runs = Vec::with_capacity(request.requests.len());
        for sub in request.requests {
            if sub.parent != request.parent {
                return Err(Status::invalid_argument(format!(
                    "run parent {:?} does not match batch parent {:?}",
                    sub.parent, request.parent
                )));
            }
            tensorboard_runs.push(create_run(&mut state, sub)?);
        }
        Ok(pb::BatchCreateTensorboardRunsResponse { tensorboard_runs })
    }

    async fn get_tensorboard_run(
        &self,
        request: pb::GetTensorboardRunRequest,
    ) -> Result<pb::TensorboardRun, Status> {
        let mut state = self.lock();
        state.record("get_tensorboard_run", &request.name)?;
        state
            .runs
            .get(&request.name)
            .cloned()
            .ok_or_else(|| not_found("tensorboard run", &request.name))
    }

    async fn delete_tensorboard_run(
        &self,
        request: pb::DeleteTensorboardRunRequest,
    ) -> Result<pb::Operation, Status> {
        let mut state = self.lock();
        state.record("delete_tensorboard_run", &request.name)?;
        if state.runs.remove(&request.name).is_none() {
            return Err(not_found("tensorboard run", &request.name));
        }
        state.parents.remove(&request.name);
        let payload = pack(&pb::DeleteOperationResponse {})?;
        Ok(state.start_operation(Ok(payload)))
    }

    async fn create_tensorboard_time_series(
        &self,
        request: pb::CreateTensorboardTimeSeriesRequest,
    ) -> Result<pb::TensorboardTimeSeries, Status> {
        let mut state = self.lock();
        state.record("create_tensorboard_time_series", &request.parent)?;
        if !state.runs.contains_key(&request.parent) {
            return Err(not_found("tensorboard run", &request.parent));
        }
        let id = state.allocate_id();
        let name = format!("{}/tensorboardTimeSeries/{id}", location_prefix(&request.parent));
        let mut series = request.tensorboard_time_series.unwrap_or_default();
        series.name = name.clone();
        if series.value_type() == pb::tensorboard_time_series::ValueType::Unspecified {
            series.value_type = pb::tensorboard_time_series::ValueType::Scalar as i32;
        }
        if series.plugin_name.is_empty() {
            series.plugin_name = "scalars".to_string();
        }
        series.create_time = now();
        series.update_time = series.create_time.clone();
        state.parents.insert(name.clone(), request.parent);
        state.time_series.insert(name, series.clone());
        Ok(series)
    }

    async fn get_tensorboard_time_series(
        &self,
        request: pb::GetTensorboardTimeSeriesRequest,
    ) -> Result<pb::TensorboardTimeSeries, Status> {
        let mut state = self.lock();
        state.record("get_tensorboard_time_series", &request.name)?;
        state
            .time_series
            .get(&request.name)
            .cloned()
            .ok_or_else(|| not_found("tensorboard time series", &request.name))
    }

    async fn delete_tensorboard_time_series(
        &self,
        request: pb::DeleteTensorboardTimeSeriesRequest,
    ) -> Result<pb::Operation, Status> {
        let mut state = self.lock();
        state.record("delete_tensorboard_time_series", &request.name)?;
        if state.time_series.remove(&request.name).is_none() {
            return Err(not_found("tensorboard time series", &request.name));
        }
        state.parents.remove(&request.name);
        state.points.remove(&request.name);
        state.blobs.remove(&request.name);
        let payload = pack(&pb::DeleteOperationResponse {})?;
        Ok(state.start_operation(Ok(payload)))
    }

    async fn write_tensorboard_run_data(
        &self,
        request: pb::WriteTensorboardRunDataRequest,
    ) -> Result<pb::WriteTensorboardRunDataResponse, Status> {
        let mut state = self.lock();
        state.record("write_tensorboard_run_data", &request.tensorboard_run)?;
        if !state.runs.contains_key(&request.tensorboard_run) {
            return Err(not_found("tensorboard run", &request.tensorboard_run));
        }
        let location = location_prefix(&request.tensorboard_run);
        for data in request.time_series_data {
            let series_name = format!("{location}/tensorboardTimeSeries/{}", data.time_series_id);
            if state.parents.get(&series_name) != Some(&request.tensorboard_run) {
                return Err(not_found("time series in run", &series_name));
            }
            state.points.entry(series_name).or_default().extend(data.values);
        }
        Ok(pb::WriteTensorboardRunDataResponse {})
    }

    async fn read_tensorboard_time_series_data(
        &self,
        request: pb::ReadTensorboardTimeSeriesDataRequest,
    ) -> Result<pb::ReadTensorboardTimeSeriesDataResponse, Status> {
        let mut state = self.lock();
        state.record("read_tensorboard_time_series_data", &request.tensorboard_time_series)?;
        let Some(series) = state.time_series.get(&request.tensorboard_time_series) else {
            return Err(not_found("tensorboard time series", &request.tensorboard_time_series));
        };
        let value_type = series.value_type;
        let mut values =
            state.points.get(&request.tensorboard_time_series).cloned().unwrap_or_default();
        let max = usize::try_from(request.max_data_points).unwrap_or(0);
        if max > 0 && values.len() > max {
            // Downsampling keeps the most recent window.
            values.drain(..values.len() - max);
        }
        let time_series_id =
            request.tensorboard_time_series.rsplit('/').next().unwrap_or_default().to_string();
        Ok(pb::ReadTensorboardTimeSeriesDataResponse {
            time_series_data: Some(pb::TimeSeriesData { time_series_id, value_type, values }),
        })
    }

    async fn read_tensorboard_blob_data(
        &self,
        request: pb::ReadTensorboardBlobDataRequest,
    ) -> Result<BlobDataStream, Status> {
        let mut state = self.lock();
        state.record("read_tensorboard_blob_data", &request.time_series)?;
        if !state.time_series.contains_key(&request.time_series) {
            return Err(not_found("tensorboard time series", &request.time_series));
        }
        let stored = state.blobs.get(&request.time_series).cloned().unwrap_or_default();
        let chunks: Vec<Result<pb::ReadTensorboardBlobDataResponse, Status>> = request
            .blob_ids
            .iter()
            .map(|id| {
                stored.iter().find(|blob| &blob.id == id).map_or_else(
                    || Err(not_found("blob", id)),
                    |blob| Ok(pb::ReadTensorboardBlobDataResponse { blobs: vec![blob.clone()] }),
                )
            })
            .collect();
        Ok(futures::stream::iter(chunks).boxed())
    }
}
