//! Training pipeline façade.
//!
//! A run is one deferred unit of work: create the pipeline, then poll its
//! server-side state with backoff until it is terminal. Passing a dataset
//! handle wires a cross-resource dependency, so a run queued behind a
//! deferred dataset creation starts only once the dataset exists.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use altus_proto::v1 as pb;

use crate::context::SdkContext;
use crate::error::{AltusError, Result};
use crate::naming::{Collection, ResourceName};
use crate::operation::OperationHandle;
use crate::resource::{resolve_name, with_deadline, CallOptions, ResourceCell, RunMode};
use crate::scheduler::ResourceFuture;

use super::{finish, DatasetHandle, ListParams, Model, SchemaFamily};

/// Everything [`TrainingPipeline::run`] needs besides the input dataset.
#[derive(Debug, Clone, Default)]
pub struct TrainingSpec {
    pub display_name: String,
    /// Schema URI of the training task, see [`crate::schema::training`].
    pub training_task_definition: String,
    /// Task-specific parameters, packed by the caller.
    pub training_task_inputs: Option<prost_types::Any>,
    /// Display name for the produced model. Without one the platform keeps
    /// the trained artifact unregistered.
    pub model_display_name: Option<String>,
    /// Train/validation/test split applied to the input dataset.
    pub fraction_split: Option<pb::FractionSplit>,
    pub labels: HashMap<String, String>,
    pub project: Option<String>,
    pub location: Option<String>,
}

/// Handle to one training pipeline.
#[derive(Clone)]
pub struct TrainingPipeline {
    ctx: SdkContext,
    cell: Arc<ResourceCell<pb::TrainingPipeline>>,
}

impl std::fmt::Debug for TrainingPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainingPipeline").field("cell", &self.cell).finish_non_exhaustive()
    }
}

impl TrainingPipeline {
    fn from_cell(ctx: &SdkContext, cell: Arc<ResourceCell<pb::TrainingPipeline>>) -> Self {
        Self { ctx: ctx.clone(), cell }
    }

    /// Starts a training run and follows it to a terminal state.
    ///
    /// `dataset` is optional; when given, its bare id becomes the pipeline's
    /// input and any creation still queued on it becomes a dependency of the
    /// run. In inline mode the call returns once the pipeline is terminal;
    /// in deferred mode the returned handle observes the run through
    /// [`TrainingPipeline::wait`].
    ///
    /// # Errors
    /// [`AltusError::BadArgument`] for an unusable spec; the pipeline's own
    /// failure or cancellation once terminal.
    pub async fn run<K: SchemaFamily>(
        ctx: &SdkContext,
        spec: TrainingSpec,
        dataset: Option<&DatasetHandle<K>>,
        options: CallOptions,
    ) -> Result<Self> {
        if spec.display_name.is_empty() {
            return Err(AltusError::BadArgument("display_name must not be empty".to_string()));
        }
        if spec.training_task_definition.is_empty() {
            return Err(AltusError::BadArgument(
                "training_task_definition must not be empty".to_string(),
            ));
        }
        let parent =
            ctx.config().common_parent(spec.project.as_deref(), spec.location.as_deref())?;

        let template = pb::TrainingPipeline {
            display_name: spec.display_name,
            training_task_definition: spec.training_task_definition,
            training_task_inputs: spec.training_task_inputs,
            model_to_upload: spec
                .model_display_name
                .map(|display_name| pb::Model { display_name, ..Default::default() }),
            labels: spec.labels,
            encryption_spec: ctx.config().encryption_spec(),
            ..Default::default()
        };
        let fraction_split = spec.fraction_split;

        let deps: Vec<ResourceFuture> = dataset.and_then(DatasetHandle::pending).into_iter().collect();
        let dataset_cell = dataset.map(|dataset| dataset.cell().clone());

        let handle = Self::from_cell(ctx, ResourceCell::new_empty());
        let ctx = ctx.clone();
        let cell = handle.cell.clone();
        let timeout = options.timeout;
        handle.cell.dispatch("pipeline.run", deps, move |cancel| async move {
            with_deadline(timeout, "training run", async move {
                let mut pipeline = template;
                if let Some(dataset_cell) = dataset_cell {
                    let Some(dataset_name) = dataset_cell.name() else {
                        return Err(AltusError::Server(
                            "input dataset has no canonical name".to_string(),
                        ));
                    };
                    pipeline.input_data_config = Some(pb::InputDataConfig {
                        dataset_id: dataset_name.id().to_string(),
                        fraction_split,
                    });
                }
                debug!(parent = %parent, "Creating training pipeline");
                let created = ctx
                    .pipelines()
                    .create_training_pipeline(pb::CreateTrainingPipelineRequest {
                        parent,
                        training_pipeline: Some(pipeline),
                    })
                    .await
                    .map_err(AltusError::from)?;
                let name = ResourceName::parse_in(Collection::TrainingPipelines, &created.name)?;
                cell.fulfill(name.clone(), created);
                poll_to_terminal(&ctx, &cell, &name, &cancel).await
            })
            .await
        })?;

        if options.mode == RunMode::Inline {
            handle.wait().await?;
        }
        Ok(handle)
    }

    /// Looks up an existing pipeline by canonical name or bare id.
    pub async fn get(ctx: &SdkContext, name: &str) -> Result<Self> {
        Self::get_in(ctx, name, None, None).await
    }

    /// [`TrainingPipeline::get`] with explicit project and location for bare
    /// ids.
    pub async fn get_in(
        ctx: &SdkContext,
        name: &str,
        project: Option<&str>,
        location: Option<&str>,
    ) -> Result<Self> {
        let name =
            resolve_name(ctx.config(), Collection::TrainingPipelines, name, project, location)?;
        let pipeline = ctx
            .pipelines()
            .get_training_pipeline(pb::GetTrainingPipelineRequest { name: name.to_string() })
            .await
            .map_err(AltusError::from)?;
        Ok(Self::from_cell(ctx, ResourceCell::new_fulfilled(name, pipeline)))
    }

    /// Lists pipelines under one parent, draining every page.
    pub async fn list(ctx: &SdkContext, params: ListParams) -> Result<Vec<Self>> {
        let parent =
            ctx.config().common_parent(params.project.as_deref(), params.location.as_deref())?;
        let filter = params.filter.unwrap_or_default();
        let page_size = params.page_size.unwrap_or(0);

        let mut handles = Vec::new();
        let mut page_token = String::new();
        loop {
            let response = ctx
                .pipelines()
                .list_training_pipelines(pb::ListTrainingPipelinesRequest {
                    parent: parent.clone(),
                    filter: filter.clone(),
                    page_size,
                    page_token,
                })
                .await
                .map_err(AltusError::from)?;
            for pipeline in response.training_pipelines {
                let name = ResourceName::parse_in(Collection::TrainingPipelines, &pipeline.name)?;
                handles.push(Self::from_cell(ctx, ResourceCell::new_fulfilled(name, pipeline)));
            }
            if response.next_page_token.is_empty() {
                break;
            }
            page_token = response.next_page_token;
        }
        Ok(handles)
    }

    /// Cancels the run.
    ///
    /// A queued or in-flight run is cancelled locally, which also forwards
    /// the request to the server when the pipeline is already created.
    /// Otherwise the server is asked directly. Idempotent; cancelling a
    /// terminal pipeline does nothing.
    pub async fn cancel(&self) -> Result<()> {
        if let Some(future) = self.cell.pending() {
            future.cancel();
            return Ok(());
        }
        let Some(name) = self.cell.name() else {
            return Ok(());
        };
        debug!(pipeline = %name, "Requesting pipeline cancellation");
        self.ctx
            .pipelines()
            .cancel_training_pipeline(pb::CancelTrainingPipelineRequest { name: name.to_string() })
            .await
            .map_err(AltusError::from)?;
        Ok(())
    }

    /// Deletes the pipeline and marks this handle deleted. The platform
    /// refuses to delete a pipeline that is still running.
    pub async fn delete(&self, options: CallOptions) -> Result<ResourceFuture> {
        let ctx = self.ctx.clone();
        let cell = self.cell.clone();
        let timeout = options.timeout;
        let future = self.cell.dispatch("pipeline.delete", Vec::new(), move |cancel| async move {
            with_deadline(timeout, "pipeline deletion", async move {
                let Some(name) = cell.name() else {
                    return Err(AltusError::Server(
                        "training pipeline has no canonical name to delete".to_string(),
                    ));
                };
                debug!(pipeline = %name, "Deleting training pipeline");
                let operation = ctx
                    .pipelines()
                    .delete_training_pipeline(pb::DeleteTrainingPipelineRequest {
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

    /// Handle to the model produced by a successful run.
    ///
    /// # Errors
    /// [`AltusError::NotFound`] until the run has succeeded and registered
    /// its model.
    pub fn model(&self) -> Result<Model> {
        let model = self
            .cell
            .snapshot()
            .and_then(|pipeline| pipeline.model_to_upload)
            .filter(|model| !model.name.is_empty());
        let Some(model) = model else {
            return Err(AltusError::NotFound(
                "training pipeline has not produced a model yet".to_string(),
            ));
        };
        let name = ResourceName::parse_in(Collection::Models, &model.name)?;
        Ok(Model::from_parts(&self.ctx, name, model))
    }

    /// Canonical name, `None` while a deferred run has not created the
    /// pipeline yet.
    #[must_use]
    pub fn resource_name(&self) -> Option<ResourceName> {
        self.cell.name()
    }

    /// Display name from the last known snapshot.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.cell.snapshot().map(|pipeline| pipeline.display_name)
    }

    /// Last observed pipeline state.
    #[must_use]
    pub fn state(&self) -> Option<pb::PipelineState> {
        self.cell.snapshot().map(|pipeline| pipeline.state())
    }

    /// Last known server snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Option<pb::TrainingPipeline> {
        self.cell.snapshot()
    }

    /// The most recently queued future on this pipeline.
    #[must_use]
    pub fn pending(&self) -> Option<ResourceFuture> {
        self.cell.pending()
    }

    /// Drains queued work on this pipeline, including the run itself.
    ///
    /// # Errors
    /// The first error any of that work hit, which for a run is the
    /// pipeline's terminal failure or cancellation.
    pub async fn wait(&self) -> Result<()> {
        self.cell.wait().await
    }
}

/// Polls the pipeline with backoff until it is terminal, keeping the cell's
/// snapshot fresh. A fired cancellation token is forwarded to the server
/// before giving up.
async fn poll_to_terminal(
    ctx: &SdkContext,
    cell: &Arc<ResourceCell<pb::TrainingPipeline>>,
    name: &ResourceName,
    cancel: &CancellationToken,
) -> Result<()> {
    let poll = ctx.poll_config().clone();
    let mut delay = poll.initial_interval;
    loop {
        let Some(snapshot) = cell.snapshot() else {
            return Err(AltusError::Server("training pipeline lost its snapshot".to_string()));
        };
        match snapshot.state() {
            pb::PipelineState::Succeeded => {
                debug!(pipeline = %name, "Training pipeline succeeded");
                return Ok(());
            }
            pb::PipelineState::Failed => {
                return Err(snapshot.error.map_or_else(
                    || AltusError::Server(format!("training pipeline {name} failed")),
                    AltusError::from,
                ));
            }
            pb::PipelineState::Cancelled => {
                return Err(AltusError::Cancelled(format!(
                    "training pipeline {name} was cancelled"
                )));
            }
            _ => {}
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(pipeline = %name, "Run interrupted, forwarding pipeline cancellation");
                let request =
                    pb::CancelTrainingPipelineRequest { name: name.to_string() };
                if let Err(error) = ctx.pipelines().cancel_training_pipeline(request).await {
                    debug!(pipeline = %name, error = %error, "Cancel request failed");
                }
                return Err(AltusError::Cancelled(format!(
                    "run of training pipeline {name} was cancelled"
                )));
            }
            () = tokio::time::sleep(delay) => {}
        }
        delay = (delay * 2).min(poll.max_interval);

        let fresh = ctx
            .pipelines()
            .get_training_pipeline(pb::GetTrainingPipelineRequest { name: name.to_string() })
            .await
            .map_err(AltusError::from)?;
        cell.update_snapshot(fresh);
    }
}
