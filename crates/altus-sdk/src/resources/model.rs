//! Trained model façade.
//!
//! Models are registered by successful training runs, never created directly,
//! so this façade only looks up, lists and deletes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use altus_proto::v1 as pb;

use crate::context::SdkContext;
use crate::error::{AltusError, Result};
use crate::naming::{Collection, ResourceName};
use crate::operation::OperationHandle;
use crate::resource::{resolve_name, with_deadline, CallOptions, ResourceCell};
use crate::scheduler::ResourceFuture;

use super::{datetime_of, finish, ListParams};

/// Handle to one registered model.
#[derive(Clone)]
pub struct Model {
    ctx: SdkContext,
    cell: Arc<ResourceCell<pb::Model>>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model").field("cell", &self.cell).finish_non_exhaustive()
    }
}

impl Model {
    pub(crate) fn from_parts(ctx: &SdkContext, name: ResourceName, snapshot: pb::Model) -> Self {
        Self { ctx: ctx.clone(), cell: ResourceCell::new_fulfilled(name, snapshot) }
    }

    /// Looks up an existing model by canonical name or bare id.
    ///
    /// # Errors
    /// [`AltusError::NotFound`] / [`AltusError::PermissionDenied`] from the
    /// platform, and name errors for unusable input.
    pub async fn get(ctx: &SdkContext, name: &str) -> Result<Self> {
        Self::get_in(ctx, name, None, None).await
    }

    /// [`Model::get`] with explicit project and location for bare ids.
    pub async fn get_in(
        ctx: &SdkContext,
        name: &str,
        project: Option<&str>,
        location: Option<&str>,
    ) -> Result<Self> {
        let name = resolve_name(ctx.config(), Collection::Models, name, project, location)?;
        let model = ctx
            .models()
            .get_model(pb::GetModelRequest { name: name.to_string() })
            .await
            .map_err(AltusError::from)?;
        Ok(Self::from_parts(ctx, name, model))
    }

    /// Lists models under one parent, draining every page.
    pub async fn list(ctx: &SdkContext, params: ListParams) -> Result<Vec<Self>> {
        let parent =
            ctx.config().common_parent(params.project.as_deref(), params.location.as_deref())?;
        let filter = params.filter.unwrap_or_default();
        let page_size = params.page_size.unwrap_or(0);

        let mut handles = Vec::new();
        let mut page_token = String::new();
        loop {
            let response = ctx
                .models()
                .list_models(pb::ListModelsRequest {
                    parent: parent.clone(),
                    filter: filter.clone(),
                    page_size,
                    page_token,
                })
                .await
                .map_err(AltusError::from)?;
            for model in response.models {
                let name = ResourceName::parse_in(Collection::Models, &model.name)?;
                handles.push(Self::from_parts(ctx, name, model));
            }
            if response.next_page_token.is_empty() {
                break;
            }
            page_token = response.next_page_token;
        }
        Ok(handles)
    }

    /// Deletes the model and marks this handle deleted; every later
    /// operation through it fails with [`AltusError::Deleted`].
    pub async fn delete(&self, options: CallOptions) -> Result<ResourceFuture> {
        let ctx = self.ctx.clone();
        let cell = self.cell.clone();
        let timeout = options.timeout;
        let future = self.cell.dispatch("model.delete", Vec::new(), move |cancel| async move {
            with_deadline(timeout, "model deletion", async move {
                let Some(name) = cell.name() else {
                    return Err(AltusError::Server(
                        "model has no canonical name to delete".to_string(),
                    ));
                };
                debug!(model = %name, "Deleting model");
                let operation = ctx
                    .models()
                    .delete_model(pb::DeleteModelRequest { name: name.to_string() })
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
        self.cell.snapshot().map(|model| model.display_name)
    }

    /// Registration instant from the last known snapshot.
    #[must_use]
    pub fn create_time(&self) -> Option<DateTime<Utc>> {
        self.cell.snapshot().and_then(|model| model.create_time.as_ref().and_then(datetime_of))
    }

    /// Last known server snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Option<pb::Model> {
        self.cell.snapshot()
    }

    /// The most recently queued future on this model.
    #[must_use]
    pub fn pending(&self) -> Option<ResourceFuture> {
        self.cell.pending()
    }

    /// Drains queued work on this model.
    ///
    /// # Errors
    /// The first error any of that work hit.
    pub async fn wait(&self) -> Result<()> {
        self.cell.wait().await
    }
}
