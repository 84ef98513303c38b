//! Published schema URIs.
//!
//! The platform identifies dataset kinds, import layouts, and training tasks
//! by versioned YAML schemas hosted under `gs://altus-platform-schemas`. The
//! URIs are opaque to the SDK; they are compared as strings.

/// Dataset metadata schemas. A dataset's `metadata_schema_uri` decides which
/// façades accept it.
pub mod metadata {
    pub const TABULAR: &str =
        "gs://altus-platform-schemas/dataset/metadata/tabular_1.0.0.yaml";
    pub const IMAGE: &str = "gs://altus-platform-schemas/dataset/metadata/image_1.0.0.yaml";
    pub const TEXT: &str = "gs://altus-platform-schemas/dataset/metadata/text_1.0.0.yaml";
    pub const VIDEO: &str = "gs://altus-platform-schemas/dataset/metadata/video_1.0.0.yaml";
    pub const TIME_SERIES: &str =
        "gs://altus-platform-schemas/dataset/metadata/time_series_1.0.0.yaml";
}

/// Import file-layout schemas, used by `import_data`.
pub mod ioformat {
    pub const IMAGE_CLASSIFICATION_SINGLE_LABEL: &str =
        "gs://altus-platform-schemas/dataset/ioformat/image_classification_single_label_io_format_1.0.0.yaml";
    pub const IMAGE_CLASSIFICATION_MULTI_LABEL: &str =
        "gs://altus-platform-schemas/dataset/ioformat/image_classification_multi_label_io_format_1.0.0.yaml";
    pub const IMAGE_OBJECT_DETECTION: &str =
        "gs://altus-platform-schemas/dataset/ioformat/image_object_detection_io_format_1.0.0.yaml";
    pub const TEXT_CLASSIFICATION_SINGLE_LABEL: &str =
        "gs://altus-platform-schemas/dataset/ioformat/text_classification_single_label_io_format_1.0.0.yaml";
}

/// Training task definitions for pipelines.
pub mod training {
    pub const AUTOML_TABULAR: &str =
        "gs://altus-platform-schemas/trainingjob/definition/automl_tabular_1.0.0.yaml";
    pub const AUTOML_IMAGE_CLASSIFICATION: &str =
        "gs://altus-platform-schemas/trainingjob/definition/automl_image_classification_1.0.0.yaml";
    pub const CUSTOM_TASK: &str =
        "gs://altus-platform-schemas/trainingjob/definition/custom_task_1.0.0.yaml";
}
