//! Integration tests for deferred execution: ordering, cancellation
//! propagation and call deadlines.

use std::sync::Arc;
use std::time::Duration;

use altus_sdk::testing::MockPlatform;
use altus_sdk::{
    AltusError, CallOptions, GlobalConfig, ImageDataset, PlatformServices, PollConfig, SdkContext,
    TabularDataset, TrainingPipeline, TrainingSpec,
};

fn test_context(platform: &Arc<MockPlatform>) -> SdkContext {
    let config = Arc::new(GlobalConfig {
        project: Some("itest-project".to_string()),
        location: Some("us-central1".to_string()),
        ..GlobalConfig::default()
    });
    SdkContext::new(PlatformServices::from_single(platform.clone()), config)
        .with_poll_config(PollConfig::fast())
}

fn training_spec(display_name: &str) -> TrainingSpec {
    TrainingSpec {
        display_name: display_name.to_string(),
        training_task_definition: altus_sdk::schema::training::AUTOML_TABULAR.to_string(),
        model_display_name: Some(format!("{display_name}-model")),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_cancelling_a_dataset_fails_the_dependent_run() {
    let platform = Arc::new(MockPlatform::new());
    // Keep the dataset creation in flight so the cancellation races nothing.
    platform.set_operation_polls(100_000);
    let ctx = test_context(&platform);

    let dataset = TabularDataset::create_from_table(
        &ctx,
        "rows",
        "bq://itest-project.sales.2026",
        CallOptions::deferred(),
    )
    .await
    .unwrap();
    let pipeline =
        TrainingPipeline::run(&ctx, training_spec("train"), Some(&dataset), CallOptions::deferred())
            .await
            .unwrap();

    dataset.pending().unwrap().cancel();

    let err = dataset.wait().await.unwrap_err();
    assert!(matches!(err, AltusError::Cancelled(_)), "got {err:?}");

    // The run never starts; its failure names the dependency and keeps the
    // cancellation as the ultimate cause.
    let err = pipeline.wait().await.unwrap_err();
    assert!(matches!(err, AltusError::DependencyFailed { .. }), "got {err:?}");
    assert!(matches!(err.ultimate_cause(), AltusError::Cancelled(_)));
    assert_eq!(platform.call_count("create_training_pipeline"), 0);
}

#[tokio::test]
async fn test_cancelling_the_create_fails_the_queued_import() {
    let platform = Arc::new(MockPlatform::new());
    platform.set_operation_polls(100_000);
    let ctx = test_context(&platform);

    let dataset = ImageDataset::create_empty(&ctx, "flowers", CallOptions::deferred())
        .await
        .unwrap();
    let create = dataset.pending().unwrap();
    let import = dataset
        .import_data(
            vec!["gs://bucket/items.jsonl".to_string()],
            altus_sdk::schema::ioformat::IMAGE_CLASSIFICATION_SINGLE_LABEL,
            None,
            CallOptions::deferred(),
        )
        .await
        .unwrap();

    create.cancel();

    let err = dataset.wait().await.unwrap_err();
    assert!(matches!(err, AltusError::Cancelled(_)), "got {err:?}");

    let err = import.outcome().await.unwrap_err();
    assert!(matches!(err, AltusError::DependencyFailed { .. }), "got {err:?}");
    assert!(matches!(err.ultimate_cause(), AltusError::Cancelled(_)));
    assert_eq!(platform.call_count("import_data"), 0);
}

#[tokio::test]
async fn test_work_queued_through_clones_runs_in_submission_order() {
    let platform = Arc::new(MockPlatform::new());
    let ctx = test_context(&platform);

    let dataset = ImageDataset::create_empty(&ctx, "flowers", CallOptions::deferred())
        .await
        .unwrap();
    let clone = dataset.clone();

    // Imports queued through different clones of the same handle still
    // serialize behind the creation.
    dataset
        .import_data(
            vec!["gs://bucket/batch-1.jsonl".to_string()],
            altus_sdk::schema::ioformat::IMAGE_CLASSIFICATION_SINGLE_LABEL,
            None,
            CallOptions::deferred(),
        )
        .await
        .unwrap();
    clone
        .import_data(
            vec!["gs://bucket/batch-2.jsonl".to_string()],
            altus_sdk::schema::ioformat::IMAGE_CLASSIFICATION_SINGLE_LABEL,
            None,
            CallOptions::deferred(),
        )
        .await
        .unwrap();

    clone.wait().await.unwrap();
    assert_eq!(platform.calls(), vec!["create_dataset", "import_data", "import_data"]);
}

#[tokio::test]
async fn test_call_deadline_fails_a_stuck_creation() {
    let platform = Arc::new(MockPlatform::new());
    platform.set_operation_polls(100_000);
    let ctx = test_context(&platform);

    let options = CallOptions::inline().with_timeout(Duration::from_millis(50));
    let err = ImageDataset::create_empty(&ctx, "stuck", options).await.unwrap_err();
    assert!(matches!(err, AltusError::DeadlineExceeded(_)), "got {err:?}");
}

#[tokio::test]
async fn test_deferred_failure_surfaces_on_wait_not_at_dispatch() {
    let platform = Arc::new(MockPlatform::new());
    platform.fail_next("create_dataset", tonic::Status::resource_exhausted("quota"));
    let ctx = test_context(&platform);

    // The deferred call itself succeeds; the failure belongs to the queued
    // work and surfaces when the handle is drained.
    let dataset = ImageDataset::create_empty(&ctx, "over-quota", CallOptions::deferred())
        .await
        .unwrap();
    let err = dataset.wait().await.unwrap_err();
    assert!(matches!(err, AltusError::Server(_)), "got {err:?}");
}
