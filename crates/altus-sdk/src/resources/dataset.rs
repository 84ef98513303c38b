//! Dataset façades.
//!
//! [`DatasetHandle`] is generic over a [`SchemaFamily`] marker pinning which
//! metadata schemas the handle accepts. [`Dataset`] takes any schema;
//! [`TabularDataset`] and [`ImageDataset`] narrow the set and carry only the
//! operations that make sense for their family: tabular datasets bind their
//! source at creation and have no import method, image datasets are created
//! empty or populated by import.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use prost_types::FieldMask;
use tracing::debug;

use altus_proto::v1 as pb;

use crate::context::SdkContext;
use crate::datasources::{self, Datasource};
use crate::error::{AltusError, Result};
use crate::naming::{Collection, ResourceName};
use crate::operation::OperationHandle;
use crate::resource::{
    check_schema, resolve_name, with_deadline, CallOptions, ResourceCell, RunMode,
};
use crate::scheduler::ResourceFuture;
use crate::schema;

use super::{datetime_of, finish, ListParams};

/// Which metadata schemas a dataset façade stands for.
///
/// Implemented by uninhabited marker types only; the façade carries the
/// marker as a type parameter and never a value.
pub trait SchemaFamily: Send + Sync + 'static {
    /// Façade name used in errors.
    const KIND: &'static str;
    /// Accepted metadata schema URIs. Empty accepts every schema.
    const ACCEPTED: &'static [&'static str];
}

/// Marker for datasets of any schema.
#[derive(Debug)]
pub enum AnySchema {}

/// Marker for the tabular family (tabular and time-series schemas).
#[derive(Debug)]
pub enum TabularSchema {}

/// Marker for image datasets.
#[derive(Debug)]
pub enum ImageSchema {}

impl SchemaFamily for AnySchema {
    const KIND: &'static str = "Dataset";
    const ACCEPTED: &'static [&'static str] = &[];
}

impl SchemaFamily for TabularSchema {
    const KIND: &'static str = "TabularDataset";
    const ACCEPTED: &'static [&'static str] =
        &[schema::metadata::TABULAR, schema::metadata::TIME_SERIES];
}

impl SchemaFamily for ImageSchema {
    const KIND: &'static str = "ImageDataset";
    const ACCEPTED: &'static [&'static str] = &[schema::metadata::IMAGE];
}

/// Everything [`DatasetHandle::create`] needs.
///
/// The source fields feed the datasource selector; `project` and `location`
/// override the configured defaults.
#[derive(Debug, Clone, Default)]
pub struct DatasetSpec {
    pub display_name: String,
    pub metadata_schema_uri: String,
    pub labels: HashMap<String, String>,
    /// Object-storage source. For tabular schemas this binds the rows at
    /// creation; for non-tabular schemas it triggers an import right after.
    pub storage_uris: Option<Vec<String>>,
    /// Warehouse table source, tabular schemas only.
    pub table_uri: Option<String>,
    /// Import format, required alongside `storage_uris` for non-tabular
    /// schemas.
    pub import_schema_uri: Option<String>,
    /// Labels stamped on imported items.
    pub data_item_labels: Option<HashMap<String, String>>,
    pub project: Option<String>,
    pub location: Option<String>,
}

/// Fields touched by [`DatasetHandle::update`]. Unset fields keep their
/// server-side value.
#[derive(Debug, Clone, Default)]
pub struct DatasetUpdate {
    pub display_name: Option<String>,
    pub labels: Option<HashMap<String, String>>,
}

/// Handle to one dataset, possibly still being created.
pub struct DatasetHandle<K: SchemaFamily> {
    ctx: SdkContext,
    cell: Arc<ResourceCell<pb::Dataset>>,
    family: PhantomData<K>,
}

/// Dataset of any schema.
pub type Dataset = DatasetHandle<AnySchema>;
/// Table-backed dataset. The source is bound at creation; there is no
/// import method.
pub type TabularDataset = DatasetHandle<TabularSchema>;
/// Image dataset, created empty or populated by import.
pub type ImageDataset = DatasetHandle<ImageSchema>;

impl<K: SchemaFamily> Clone for DatasetHandle<K> {
    fn clone(&self) -> Self {
        Self { ctx: self.ctx.clone(), cell: self.cell.clone(), family: PhantomData }
    }
}

impl<K: SchemaFamily> std::fmt::Debug for DatasetHandle<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(K::KIND).field("cell", &self.cell).finish_non_exhaustive()
    }
}

impl<K: SchemaFamily> DatasetHandle<K> {
    fn from_cell(ctx: &SdkContext, cell: Arc<ResourceCell<pb::Dataset>>) -> Self {
        Self { ctx: ctx.clone(), cell, family: PhantomData }
    }

    pub(crate) fn cell(&self) -> &Arc<ResourceCell<pb::Dataset>> {
        &self.cell
    }

    /// Creates the dataset described by `spec`.
    ///
    /// Arguments are validated on the calling task before anything is queued
    /// or sent. In deferred mode the returned handle is a placeholder that
    /// fills in once creation (plus the import bundled into the datasource,
    /// if any) completes; in inline mode the call returns the finished
    /// handle.
    ///
    /// # Errors
    /// [`AltusError::BadArgument`] for spec combinations outside the
    /// datasource decision table, [`AltusError::WrongKind`] when the schema
    /// is outside this façade's family, and in inline mode whatever the
    /// creation itself hits.
    pub async fn create(ctx: &SdkContext, spec: DatasetSpec, options: CallOptions) -> Result<Self> {
        if spec.display_name.is_empty() {
            return Err(AltusError::BadArgument("display_name must not be empty".to_string()));
        }
        if spec.metadata_schema_uri.is_empty() {
            return Err(AltusError::BadArgument(
                "metadata_schema_uri must not be empty".to_string(),
            ));
        }
        check_schema(K::KIND, K::ACCEPTED, &spec.metadata_schema_uri)?;
        let source = Datasource::select(
            &spec.metadata_schema_uri,
            spec.import_schema_uri.as_deref(),
            spec.storage_uris.clone(),
            spec.table_uri.as_deref(),
            spec.data_item_labels.clone(),
        )?;
        let parent =
            ctx.config().common_parent(spec.project.as_deref(), spec.location.as_deref())?;

        let request = pb::CreateDatasetRequest {
            parent,
            dataset: Some(pb::Dataset {
                display_name: spec.display_name,
                metadata_schema_uri: spec.metadata_schema_uri,
                metadata: source.dataset_metadata(),
                labels: spec.labels,
                encryption_spec: ctx.config().encryption_spec(),
                ..Default::default()
            }),
        };
        let import = source.import_config();

        let handle = Self::from_cell(ctx, ResourceCell::new_empty());
        let ctx = ctx.clone();
        let cell = handle.cell.clone();
        let timeout = options.timeout;
        handle.cell.dispatch("dataset.create", Vec::new(), move |cancel| async move {
            with_deadline(timeout, "dataset creation", async move {
                debug!(parent = %request.parent, "Creating dataset");
                let operation =
                    ctx.datasets().create_dataset(request).await.map_err(AltusError::from)?;
                let created: pb::Dataset = OperationHandle::from_operation(&ctx, operation)
                    .wait_and_unpack_with_cancel(&cancel, None)
                    .await?;
                let name = ResourceName::parse_in(Collection::Datasets, &created.name)?;
                cell.fulfill(name.clone(), created);

                if let Some(config) = import {
                    debug!(dataset = %name, "Importing items bundled with creation");
                    let operation = ctx
                        .datasets()
                        .import_data(pb::ImportDataRequest {
                            name: name.to_string(),
                            import_configs: vec![config],
                        })
                        .await
                        .map_err(AltusError::from)?;
                    OperationHandle::from_operation(&ctx, operation)
                        .wait_with_cancel(&cancel, None)
                        .await?;
                }
                Ok(())
            })
            .await
        })?;

        if options.mode == RunMode::Inline {
            handle.wait().await?;
        }
        Ok(handle)
    }

    /// Looks up an existing dataset by canonical name or bare id.
    ///
    /// The fetched snapshot's schema is checked against what this façade
    /// accepts.
    ///
    /// # Errors
    /// [`AltusError::NotFound`] / [`AltusError::PermissionDenied`] from the
    /// platform, [`AltusError::WrongKind`] on a schema mismatch, and name
    /// errors for unusable input.
    pub async fn get(ctx: &SdkContext, name: &str) -> Result<Self> {
        Self::get_in(ctx, name, None, None).await
    }

    /// [`DatasetHandle::get`] with explicit project and location for bare
    /// ids.
    pub async fn get_in(
        ctx: &SdkContext,
        name: &str,
        project: Option<&str>,
        location: Option<&str>,
    ) -> Result<Self> {
        let name = resolve_name(ctx.config(), Collection::Datasets, name, project, location)?;
        let dataset = ctx
            .datasets()
            .get_dataset(pb::GetDatasetRequest { name: name.to_string() })
            .await
            .map_err(AltusError::from)?;
        check_schema(K::KIND, K::ACCEPTED, &dataset.metadata_schema_uri)?;
        Ok(Self::from_cell(ctx, ResourceCell::new_fulfilled(name, dataset)))
    }

    /// Lists datasets under one parent, draining every page.
    ///
    /// Datasets outside this façade's schema family are skipped, so a
    /// [`TabularDataset`] listing returns only tabular datasets.
    pub async fn list(ctx: &SdkContext, params: ListParams) -> Result<Vec<Self>> {
        let parent =
            ctx.config().common_parent(params.project.as_deref(), params.location.as_deref())?;
        let filter = params.filter.unwrap_or_default();
        let page_size = params.page_size.unwrap_or(0);

        let mut handles = Vec::new();
        let mut page_token = String::new();
        loop {
            let response = ctx
                .datasets()
                .list_datasets(pb::ListDatasetsRequest {
                    parent: parent.clone(),
                    filter: filter.clone(),
                    page_size,
                    page_token,
                })
                .await
                .map_err(AltusError::from)?;
            for dataset in response.datasets {
                if check_schema(K::KIND, K::ACCEPTED, &dataset.metadata_schema_uri).is_err() {
                    continue;
                }
                let name = ResourceName::parse_in(Collection::Datasets, &dataset.name)?;
                handles.push(Self::from_cell(ctx, ResourceCell::new_fulfilled(name, dataset)));
            }
            if response.next_page_token.is_empty() {
                break;
            }
            page_token = response.next_page_token;
        }
        Ok(handles)
    }

    /// Updates the masked fields and refreshes the snapshot.
    ///
    /// # Errors
    /// [`AltusError::BadArgument`] when `update` changes nothing; otherwise
    /// whatever the queued work hits.
    pub async fn update(
        &self,
        update: DatasetUpdate,
        options: CallOptions,
    ) -> Result<ResourceFuture> {
        if update.display_name.is_none() && update.labels.is_none() {
            return Err(AltusError::BadArgument(
                "update changes nothing: set display_name or labels".to_string(),
            ));
        }
        let ctx = self.ctx.clone();
        let cell = self.cell.clone();
        let timeout = options.timeout;
        let future = self.cell.dispatch("dataset.update", Vec::new(), move |_cancel| async move {
            with_deadline(timeout, "dataset update", async move {
                let Some(name) = cell.name() else {
                    return Err(AltusError::Server(
                        "dataset has no canonical name to update".to_string(),
                    ));
                };
                let mut dataset = pb::Dataset { name: name.to_string(), ..Default::default() };
                let mut paths = Vec::new();
                if let Some(display_name) = update.display_name {
                    dataset.display_name = display_name;
                    paths.push("display_name".to_string());
                }
                if let Some(labels) = update.labels {
                    dataset.labels = labels;
                    paths.push("labels".to_string());
                }
                debug!(dataset = %name, fields = ?paths, "Updating dataset");
                let updated = ctx
                    .datasets()
                    .update_dataset(pb::UpdateDatasetRequest {
                        dataset: Some(dataset),
                        update_mask: Some(FieldMask { paths }),
                    })
                    .await
                    .map_err(AltusError::from)?;
                cell.update_snapshot(updated);
                Ok(())
            })
            .await
        })?;
        finish(future, options).await
    }

    /// Deletes the dataset and marks this handle deleted; every later
    /// operation through it fails with [`AltusError::Deleted`].
    pub async fn delete(&self, options: CallOptions) -> Result<ResourceFuture> {
        let ctx = self.ctx.clone();
        let cell = self.cell.clone();
        let timeout = options.timeout;
        let future = self.cell.dispatch("dataset.delete", Vec::new(), move |cancel| async move {
            with_deadline(timeout, "dataset deletion", async move {
                let Some(name) = cell.name() else {
                    return Err(AltusError::Server(
                        "dataset has no canonical name to delete".to_string(),
                    ));
                };
                debug!(dataset = %name, "Deleting dataset");
                let operation = ctx
                    .datasets()
                    .delete_dataset(pb::DeleteDatasetRequest { name: name.to_string() })
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

    /// Shared body of the public `import_data` methods. Not exposed on the
    /// tabular façade; the runtime check below covers handles whose family
    /// admits tabular schemas.
    async fn import_items(
        &self,
        storage_uris: Vec<String>,
        import_schema_uri: &str,
        data_item_labels: Option<HashMap<String, String>>,
        options: CallOptions,
    ) -> Result<ResourceFuture> {
        let config =
            datasources::import_request_config(storage_uris, import_schema_uri, data_item_labels)?;
        if let Some(snapshot) = self.cell.snapshot() {
            if datasources::is_tabular_schema(&snapshot.metadata_schema_uri) {
                return Err(tabular_import_error());
            }
        }
        let ctx = self.ctx.clone();
        let cell = self.cell.clone();
        let timeout = options.timeout;
        let future = self.cell.dispatch("dataset.import", Vec::new(), move |cancel| async move {
            with_deadline(timeout, "dataset import", async move {
                let (name, snapshot) = cell.name_and_snapshot();
                let Some(name) = name else {
                    return Err(AltusError::Server(
                        "dataset has no canonical name to import into".to_string(),
                    ));
                };
                // A deferred creation may have resolved the schema only now.
                if let Some(snapshot) = snapshot {
                    if datasources::is_tabular_schema(&snapshot.metadata_schema_uri) {
                        return Err(tabular_import_error());
                    }
                }
                debug!(dataset = %name, "Importing data items");
                let operation = ctx
                    .datasets()
                    .import_data(pb::ImportDataRequest {
                        name: name.to_string(),
                        import_configs: vec![config],
                    })
                    .await
                    .map_err(AltusError::from)?;
                OperationHandle::from_operation(&ctx, operation)
                    .wait_with_cancel(&cancel, None)
                    .await?;
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

    /// Project segment of the canonical name.
    #[must_use]
    pub fn project(&self) -> Option<String> {
        self.cell.name().map(|name| name.project().to_string())
    }

    /// Location segment of the canonical name.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        self.cell.name().map(|name| name.location().to_string())
    }

    /// Display name from the last known snapshot.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.cell.snapshot().map(|dataset| dataset.display_name)
    }

    /// Metadata schema URI from the last known snapshot.
    #[must_use]
    pub fn metadata_schema_uri(&self) -> Option<String> {
        self.cell.snapshot().map(|dataset| dataset.metadata_schema_uri)
    }

    /// Creation instant from the last known snapshot.
    #[must_use]
    pub fn create_time(&self) -> Option<DateTime<Utc>> {
        self.cell.snapshot().and_then(|dataset| dataset.create_time.as_ref().and_then(datetime_of))
    }

    /// Last known server snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Option<pb::Dataset> {
        self.cell.snapshot()
    }

    /// The most recently queued future on this dataset, for observation or
    /// cancellation.
    #[must_use]
    pub fn pending(&self) -> Option<ResourceFuture> {
        self.cell.pending()
    }

    /// Drains queued work on this dataset.
    ///
    /// # Errors
    /// The first error any of that work hit.
    pub async fn wait(&self) -> Result<()> {
        self.cell.wait().await
    }
}

impl DatasetHandle<AnySchema> {
    /// Imports items from object storage into this dataset.
    ///
    /// # Errors
    /// [`AltusError::BadArgument`] for empty input, bad URI schemes, or a
    /// dataset that turns out to be tabular.
    pub async fn import_data(
        &self,
        storage_uris: Vec<String>,
        import_schema_uri: &str,
        data_item_labels: Option<HashMap<String, String>>,
        options: CallOptions,
    ) -> Result<ResourceFuture> {
        self.import_items(storage_uris, import_schema_uri, data_item_labels, options).await
    }
}

impl DatasetHandle<TabularSchema> {
    /// Creates a tabular dataset reading rows from object storage.
    pub async fn create_from_storage(
        ctx: &SdkContext,
        display_name: impl Into<String>,
        storage_uris: Vec<String>,
        options: CallOptions,
    ) -> Result<Self> {
        Self::create(
            ctx,
            DatasetSpec {
                display_name: display_name.into(),
                metadata_schema_uri: schema::metadata::TABULAR.to_string(),
                storage_uris: Some(storage_uris),
                ..Default::default()
            },
            options,
        )
        .await
    }

    /// Creates a tabular dataset reading rows from one warehouse table.
    pub async fn create_from_table(
        ctx: &SdkContext,
        display_name: impl Into<String>,
        table_uri: impl Into<String>,
        options: CallOptions,
    ) -> Result<Self> {
        Self::create(
            ctx,
            DatasetSpec {
                display_name: display_name.into(),
                metadata_schema_uri: schema::metadata::TABULAR.to_string(),
                table_uri: Some(table_uri.into()),
                ..Default::default()
            },
            options,
        )
        .await
    }
}

impl DatasetHandle<ImageSchema> {
    /// Creates an empty image dataset.
    pub async fn create_empty(
        ctx: &SdkContext,
        display_name: impl Into<String>,
        options: CallOptions,
    ) -> Result<Self> {
        Self::create(
            ctx,
            DatasetSpec {
                display_name: display_name.into(),
                metadata_schema_uri: schema::metadata::IMAGE.to_string(),
                ..Default::default()
            },
            options,
        )
        .await
    }

    /// Creates an image dataset and imports items into it right away.
    pub async fn create_with_import(
        ctx: &SdkContext,
        display_name: impl Into<String>,
        storage_uris: Vec<String>,
        import_schema_uri: impl Into<String>,
        options: CallOptions,
    ) -> Result<Self> {
        Self::create(
            ctx,
            DatasetSpec {
                display_name: display_name.into(),
                metadata_schema_uri: schema::metadata::IMAGE.to_string(),
                storage_uris: Some(storage_uris),
                import_schema_uri: Some(import_schema_uri.into()),
                ..Default::default()
            },
            options,
        )
        .await
    }

    /// Imports further items from object storage into this dataset.
    pub async fn import_data(
        &self,
        storage_uris: Vec<String>,
        import_schema_uri: &str,
        data_item_labels: Option<HashMap<String, String>>,
        options: CallOptions,
    ) -> Result<ResourceFuture> {
        self.import_items(storage_uris, import_schema_uri, data_item_labels, options).await
    }
}

fn tabular_import_error() -> AltusError {
    AltusError::BadArgument(
        "tabular datasets do not import items; bind the source at creation instead".to_string(),
    )
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

        let spec = DatasetSpec {
            display_name: "flowers".to_string(),
            metadata_schema_uri: schema::metadata::IMAGE.to_string(),
            ..Default::default()
        };
        let dataset = Dataset::create(&ctx, spec, CallOptions::inline()).await.unwrap();

        let name = dataset.resource_name().unwrap();
        assert_eq!(name.project(), "p");
        assert_eq!(name.collection(), Collection::Datasets);
        assert_eq!(dataset.display_name().as_deref(), Some("flowers"));
        assert_eq!(dataset.metadata_schema_uri().as_deref(), Some(schema::metadata::IMAGE));
        assert!(dataset.create_time().is_some());
        assert_eq!(platform.calls(), vec!["create_dataset"]);
    }

    #[tokio::test]
    async fn test_create_validates_before_anything_is_sent() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let err = Dataset::create(&ctx, DatasetSpec::default(), CallOptions::inline())
            .await
            .unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));

        let spec = DatasetSpec {
            display_name: "x".to_string(),
            metadata_schema_uri: schema::metadata::IMAGE.to_string(),
            storage_uris: Some(vec!["http://x/y".to_string()]),
            import_schema_uri: Some("schema".to_string()),
            ..Default::default()
        };
        let err = Dataset::create(&ctx, spec, CallOptions::deferred()).await.unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));

        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_checks_schema_family() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let spec = DatasetSpec {
            display_name: "not tabular".to_string(),
            metadata_schema_uri: schema::metadata::IMAGE.to_string(),
            ..Default::default()
        };
        let err = TabularDataset::create(&ctx, spec, CallOptions::inline()).await.unwrap_err();
        assert!(matches!(err, AltusError::WrongKind(_)));
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_from_storage_binds_the_source() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let dataset = TabularDataset::create_from_storage(
            &ctx,
            "sales",
            vec!["gs://b/rows.csv".to_string()],
            CallOptions::inline(),
        )
        .await
        .unwrap();

        let snapshot = dataset.snapshot().unwrap();
        match snapshot.metadata.unwrap().input_config.unwrap().source.unwrap() {
            pb::tabular_input_config::Source::Storage(storage) => {
                assert_eq!(storage.uris, vec!["gs://b/rows.csv".to_string()]);
            }
            other => panic!("expected storage source, got {other:?}"),
        }
        assert_eq!(platform.calls(), vec!["create_dataset"]);
    }

    #[tokio::test]
    async fn test_create_with_import_issues_both_rpcs_in_order() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let dataset = ImageDataset::create_with_import(
            &ctx,
            "flowers",
            vec!["gs://b/items.jsonl".to_string()],
            schema::ioformat::IMAGE_CLASSIFICATION_SINGLE_LABEL,
            CallOptions::inline(),
        )
        .await
        .unwrap();

        assert!(dataset.resource_name().is_some());
        assert_eq!(platform.calls(), vec!["create_dataset", "import_data"]);
    }

    #[tokio::test]
    async fn test_deferred_create_fills_in_after_wait() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let spec = DatasetSpec {
            display_name: "later".to_string(),
            metadata_schema_uri: schema::metadata::TEXT.to_string(),
            ..Default::default()
        };
        let dataset = Dataset::create(&ctx, spec, CallOptions::deferred()).await.unwrap();
        assert!(dataset.pending().is_some());

        dataset.wait().await.unwrap();
        let name = dataset.resource_name().unwrap();
        assert_eq!(name.project(), "p");
        assert_eq!(dataset.display_name().as_deref(), Some("later"));
        // A second wait observes the same state.
        dataset.wait().await.unwrap();
        assert_eq!(dataset.resource_name(), Some(name));
    }

    #[tokio::test]
    async fn test_get_hydrates_and_checks_kind() {
        let platform = Arc::new(MockPlatform::new());
        platform.insert_dataset(pb::Dataset {
            name: "projects/p/locations/l/datasets/9".to_string(),
            display_name: "pictures".to_string(),
            metadata_schema_uri: schema::metadata::IMAGE.to_string(),
            ..Default::default()
        });
        let ctx = test_context(&platform);

        let dataset = Dataset::get(&ctx, "9").await.unwrap();
        assert_eq!(dataset.display_name().as_deref(), Some("pictures"));

        let err = TabularDataset::get(&ctx, "9").await.unwrap_err();
        assert!(matches!(err, AltusError::WrongKind(_)));
    }

    #[tokio::test]
    async fn test_get_missing_dataset_is_not_found() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let err = Dataset::get(&ctx, "404").await.unwrap_err();
        assert!(matches!(err, AltusError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_applies_only_masked_fields() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let spec = DatasetSpec {
            display_name: "before".to_string(),
            metadata_schema_uri: schema::metadata::TEXT.to_string(),
            ..Default::default()
        };
        let dataset = Dataset::create(&ctx, spec, CallOptions::inline()).await.unwrap();

        let err = dataset
            .update(DatasetUpdate::default(), CallOptions::inline())
            .await
            .unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));

        let update =
            DatasetUpdate { display_name: Some("after".to_string()), ..Default::default() };
        dataset.update(update, CallOptions::inline()).await.unwrap();

        assert_eq!(dataset.display_name().as_deref(), Some("after"));
        assert_eq!(
            dataset.metadata_schema_uri().as_deref(),
            Some(schema::metadata::TEXT),
            "unmasked fields survive the update",
        );
    }

    #[tokio::test]
    async fn test_delete_marks_the_handle_deleted() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let spec = DatasetSpec {
            display_name: "short-lived".to_string(),
            metadata_schema_uri: schema::metadata::VIDEO.to_string(),
            ..Default::default()
        };
        let dataset = Dataset::create(&ctx, spec, CallOptions::inline()).await.unwrap();
        dataset.delete(CallOptions::inline()).await.unwrap();

        let err = dataset
            .update(
                DatasetUpdate { display_name: Some("zombie".to_string()), ..Default::default() },
                CallOptions::inline(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AltusError::Deleted(_)));
        assert_eq!(platform.call_count("update_dataset"), 0);
    }

    #[tokio::test]
    async fn test_list_filters_by_schema_family() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        TabularDataset::create_from_table(&ctx, "rows", "bq://p.d.t", CallOptions::inline())
            .await
            .unwrap();
        ImageDataset::create_empty(&ctx, "pictures", CallOptions::inline()).await.unwrap();

        let all = Dataset::list(&ctx, ListParams::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let tabular = TabularDataset::list(&ctx, ListParams::default()).await.unwrap();
        assert_eq!(tabular.len(), 1);
        assert_eq!(tabular[0].display_name().as_deref(), Some("rows"));

        let named = Dataset::list(
            &ctx,
            ListParams { filter: Some("display_name=\"pictures\"".to_string()), ..Default::default() },
        )
        .await
        .unwrap();
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].display_name().as_deref(), Some("pictures"));
    }

    #[tokio::test]
    async fn test_import_refuses_tabular_snapshot() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = test_context(&platform);

        let tabular =
            TabularDataset::create_from_table(&ctx, "rows", "bq://p.d.t", CallOptions::inline())
                .await
                .unwrap();
        let name = tabular.resource_name().unwrap().to_string();

        // Through the schema-agnostic façade the refusal is a runtime check.
        let dataset = Dataset::get(&ctx, &name).await.unwrap();
        let err = dataset
            .import_data(
                vec!["gs://b/items.jsonl".to_string()],
                "schema",
                None,
                CallOptions::inline(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));
        assert_eq!(platform.call_count("import_data"), 0);
    }
}
