//! Datasource selection for dataset creation and import.
//!
//! Callers hand a façade loose pieces (storage URIs, a table URI, an import
//! schema, item labels); [`Datasource::select`] decides which of the four
//! legal shapes they form, or rejects the combination with
//! [`AltusError::BadArgument`] before anything touches the network.
//!
//! Tabular datasets bind their source at creation time and never import;
//! non-tabular datasets are created empty and may import items afterwards.

use std::collections::HashMap;

use altus_proto::v1 as pb;

use crate::error::{AltusError, Result};
use crate::schema;

const STORAGE_SCHEME: &str = "gs://";
const TABLE_SCHEMES: [&str; 2] = ["bq://", "bigquery://"];

/// Whether a metadata schema belongs to the tabular family.
///
/// Time-series datasets are table-backed and follow tabular rules.
#[must_use]
pub fn is_tabular_schema(metadata_schema_uri: &str) -> bool {
    metadata_schema_uri == schema::metadata::TABULAR
        || metadata_schema_uri == schema::metadata::TIME_SERIES
}

/// One validated way of sourcing a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Datasource {
    /// Non-tabular dataset created empty; items can be imported later.
    EmptyNonTabular,
    /// Tabular dataset reading rows from object storage.
    TabularFromStorage { storage_uris: Vec<String> },
    /// Tabular dataset reading rows from one warehouse table.
    TabularFromTable { table_uri: String },
    /// Non-tabular dataset populated by an import right after creation.
    NonTabularImport {
        storage_uris: Vec<String>,
        import_schema_uri: String,
        data_item_labels: HashMap<String, String>,
    },
}

impl Datasource {
    /// Classifies the caller's source arguments for a dataset whose kind is
    /// `metadata_schema_uri`.
    ///
    /// An empty `storage_uris` list counts as unset.
    ///
    /// # Errors
    /// [`AltusError::BadArgument`] for any combination outside the four
    /// legal shapes, and for URIs with an unrecognized scheme.
    pub fn select(
        metadata_schema_uri: &str,
        import_schema_uri: Option<&str>,
        storage_uris: Option<Vec<String>>,
        table_uri: Option<&str>,
        data_item_labels: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let storage_uris = storage_uris.filter(|uris| !uris.is_empty());

        if is_tabular_schema(metadata_schema_uri) {
            if import_schema_uri.is_some() {
                return Err(AltusError::BadArgument(
                    "tabular datasets do not import items; bind the source at creation instead"
                        .to_string(),
                ));
            }
            return match (storage_uris, table_uri) {
                (Some(uris), None) => {
                    check_storage_uris(&uris)?;
                    Ok(Self::TabularFromStorage { storage_uris: uris })
                }
                (None, Some(table)) => {
                    check_table_uri(table)?;
                    Ok(Self::TabularFromTable { table_uri: table.to_string() })
                }
                (Some(_), Some(_)) => Err(AltusError::BadArgument(
                    "exactly one of storage_uris or table_uri may be set for a tabular dataset"
                        .to_string(),
                )),
                (None, None) => Err(AltusError::BadArgument(
                    "a tabular dataset needs a source: set storage_uris or table_uri".to_string(),
                )),
            };
        }

        if table_uri.is_some() {
            return Err(AltusError::BadArgument(
                "table sources only apply to tabular datasets".to_string(),
            ));
        }
        match (storage_uris, import_schema_uri) {
            (None, None) => Ok(Self::EmptyNonTabular),
            (Some(uris), Some(import_schema)) => {
                check_storage_uris(&uris)?;
                Ok(Self::NonTabularImport {
                    storage_uris: uris,
                    import_schema_uri: import_schema.to_string(),
                    data_item_labels: data_item_labels.unwrap_or_default(),
                })
            }
            (Some(_), None) | (None, Some(_)) => Err(AltusError::BadArgument(
                "importing into a non-tabular dataset needs both storage_uris and import_schema_uri"
                    .to_string(),
            )),
        }
    }

    /// Metadata embedded in the `CreateDataset` request. Only tabular
    /// variants carry any.
    pub(crate) fn dataset_metadata(&self) -> Option<pb::DatasetMetadata> {
        let source = match self {
            Self::TabularFromStorage { storage_uris } => {
                pb::tabular_input_config::Source::Storage(pb::StorageSource {
                    uris: storage_uris.clone(),
                })
            }
            Self::TabularFromTable { table_uri } => {
                pb::tabular_input_config::Source::Table(pb::TableSource {
                    uri: table_uri.clone(),
                })
            }
            Self::EmptyNonTabular | Self::NonTabularImport { .. } => return None,
        };
        Some(pb::DatasetMetadata {
            input_config: Some(pb::TabularInputConfig { source: Some(source) }),
        })
    }

    /// The import issued right after creation, when this source has one.
    pub(crate) fn import_config(&self) -> Option<pb::ImportDataConfig> {
        match self {
            Self::NonTabularImport { storage_uris, import_schema_uri, data_item_labels } => {
                Some(pb::ImportDataConfig {
                    source: Some(pb::import_data_config::Source::Storage(pb::StorageSource {
                        uris: storage_uris.clone(),
                    })),
                    data_item_labels: data_item_labels.clone(),
                    import_schema_uri: import_schema_uri.clone(),
                })
            }
            Self::EmptyNonTabular
            | Self::TabularFromStorage { .. }
            | Self::TabularFromTable { .. } => None,
        }
    }
}

/// Builds the one-off import config used by `import_data` on an existing
/// dataset, applying the same URI validation as creation.
///
/// # Errors
/// [`AltusError::BadArgument`] for empty input or bad URI schemes.
pub(crate) fn import_request_config(
    storage_uris: Vec<String>,
    import_schema_uri: &str,
    data_item_labels: Option<HashMap<String, String>>,
) -> Result<pb::ImportDataConfig> {
    if storage_uris.is_empty() {
        return Err(AltusError::BadArgument(
            "import needs at least one storage URI".to_string(),
        ));
    }
    if import_schema_uri.is_empty() {
        return Err(AltusError::BadArgument(
            "import needs an import_schema_uri".to_string(),
        ));
    }
    check_storage_uris(&storage_uris)?;
    Ok(pb::ImportDataConfig {
        source: Some(pb::import_data_config::Source::Storage(pb::StorageSource {
            uris: storage_uris,
        })),
        data_item_labels: data_item_labels.unwrap_or_default(),
        import_schema_uri: import_schema_uri.to_string(),
    })
}

fn check_storage_uris(uris: &[String]) -> Result<()> {
    for uri in uris {
        if !uri.starts_with(STORAGE_SCHEME) {
            return Err(AltusError::BadArgument(format!(
                "storage URIs must use the {STORAGE_SCHEME} scheme, got {uri:?}"
            )));
        }
    }
    Ok(())
}

fn check_table_uri(uri: &str) -> Result<()> {
    if TABLE_SCHEMES.iter().any(|scheme| uri.starts_with(scheme)) {
        return Ok(());
    }
    Err(AltusError::BadArgument(format!(
        "table URIs must use the bq:// or bigquery:// scheme, got {uri:?}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_tabular_from_storage() {
        let source = Datasource::select(
            schema::metadata::TABULAR,
            None,
            Some(strings(&["gs://b/f.csv"])),
            None,
            None,
        )
        .unwrap();
        assert_eq!(
            source,
            Datasource::TabularFromStorage { storage_uris: strings(&["gs://b/f.csv"]) }
        );

        let metadata = source.dataset_metadata().unwrap();
        match metadata.input_config.unwrap().source.unwrap() {
            pb::tabular_input_config::Source::Storage(storage) => {
                assert_eq!(storage.uris, strings(&["gs://b/f.csv"]));
            }
            other => panic!("expected storage source, got {other:?}"),
        }
        assert!(source.import_config().is_none());
    }

    #[test]
    fn test_tabular_from_table() {
        for uri in ["bq://p.d.t", "bigquery://p.d.t"] {
            let source =
                Datasource::select(schema::metadata::TABULAR, None, None, Some(uri), None)
                    .unwrap();
            assert_eq!(source, Datasource::TabularFromTable { table_uri: uri.to_string() });
        }
    }

    #[test]
    fn test_tabular_with_both_sources_is_exactly_one() {
        let err = Datasource::select(
            schema::metadata::TABULAR,
            None,
            Some(strings(&["gs://b/f.csv"])),
            Some("bq://p.d.t"),
            None,
        )
        .unwrap_err();
        match err {
            AltusError::BadArgument(msg) => assert!(msg.contains("exactly one")),
            other => panic!("expected BadArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_tabular_with_no_source_is_rejected() {
        let err =
            Datasource::select(schema::metadata::TABULAR, None, None, None, None).unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));

        // An empty URI list counts as no source.
        let err = Datasource::select(schema::metadata::TABULAR, None, Some(vec![]), None, None)
            .unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));
    }

    #[test]
    fn test_tabular_rejects_import_schema() {
        let err = Datasource::select(
            schema::metadata::TIME_SERIES,
            Some(schema::ioformat::IMAGE_CLASSIFICATION_SINGLE_LABEL),
            Some(strings(&["gs://b/f.csv"])),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));
    }

    #[test]
    fn test_empty_non_tabular() {
        let source =
            Datasource::select(schema::metadata::IMAGE, None, None, None, None).unwrap();
        assert_eq!(source, Datasource::EmptyNonTabular);
        assert!(source.dataset_metadata().is_none());
        assert!(source.import_config().is_none());
    }

    #[test]
    fn test_non_tabular_import_carries_labels() {
        let labels: HashMap<String, String> =
            [("split".to_string(), "train".to_string())].into();
        let source = Datasource::select(
            schema::metadata::IMAGE,
            Some(schema::ioformat::IMAGE_CLASSIFICATION_SINGLE_LABEL),
            Some(strings(&["gs://b/a.jsonl"])),
            None,
            Some(labels.clone()),
        )
        .unwrap();

        let config = source.import_config().unwrap();
        assert_eq!(config.import_schema_uri, schema::ioformat::IMAGE_CLASSIFICATION_SINGLE_LABEL);
        assert_eq!(config.data_item_labels, labels);
        assert!(source.dataset_metadata().is_none());
    }

    #[test]
    fn test_non_tabular_needs_schema_and_storage_together() {
        let err = Datasource::select(
            schema::metadata::IMAGE,
            None,
            Some(strings(&["gs://b/a.jsonl"])),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));

        let err = Datasource::select(
            schema::metadata::IMAGE,
            Some(schema::ioformat::IMAGE_CLASSIFICATION_SINGLE_LABEL),
            None,
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));
    }

    #[test]
    fn test_non_tabular_rejects_table_source() {
        let err = Datasource::select(schema::metadata::VIDEO, None, None, Some("bq://p.d.t"), None)
            .unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));
    }

    #[test]
    fn test_bad_storage_scheme_mentions_the_scheme() {
        let err = Datasource::select(
            schema::metadata::IMAGE,
            Some(schema::ioformat::IMAGE_CLASSIFICATION_SINGLE_LABEL),
            Some(strings(&["http://x/y"])),
            None,
            None,
        )
        .unwrap_err();
        match err {
            AltusError::BadArgument(msg) => {
                assert!(msg.contains("gs://"));
                assert!(msg.contains("http://x/y"));
            }
            other => panic!("expected BadArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_table_scheme_is_rejected() {
        let err = Datasource::select(
            schema::metadata::TABULAR,
            None,
            None,
            Some("postgres://p.d.t"),
            None,
        )
        .unwrap_err();
        match err {
            AltusError::BadArgument(msg) => assert!(msg.contains("bq://")),
            other => panic!("expected BadArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_import_request_config_validates() {
        let config = import_request_config(
            strings(&["gs://b/a.jsonl"]),
            schema::ioformat::IMAGE_OBJECT_DETECTION,
            None,
        )
        .unwrap();
        assert_eq!(config.import_schema_uri, schema::ioformat::IMAGE_OBJECT_DETECTION);

        let err = import_request_config(vec![], schema::ioformat::IMAGE_OBJECT_DETECTION, None)
            .unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));

        let err = import_request_config(strings(&["s3://b/a"]), "schema", None).unwrap_err();
        assert!(matches!(err, AltusError::BadArgument(_)));
    }
}
