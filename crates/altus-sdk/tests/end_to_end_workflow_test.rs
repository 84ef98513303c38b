//! End-to-end workflow test: create a dataset, train against it, look up
//! the registered model and stream telemetry, all through deferred calls.

use std::sync::Arc;

use altus_sdk::testing::MockPlatform;
use altus_sdk::{
    CallOptions, GlobalConfig, Model, PlatformServices, PollConfig, SdkContext, TabularDataset,
    Tensorboard, TrainingPipeline, TrainingSpec,
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

#[tokio::test]
async fn test_dataset_to_model_workflow_with_telemetry() {
    let platform = Arc::new(MockPlatform::new());
    platform.set_pipeline_polls(2);
    let ctx = test_context(&platform);

    // Everything up to the model is queued without waiting.
    let dataset = TabularDataset::create_from_table(
        &ctx,
        "sales",
        "bq://itest-project.sales.2026",
        CallOptions::deferred(),
    )
    .await
    .unwrap();
    let pipeline = TrainingPipeline::run(
        &ctx,
        TrainingSpec {
            display_name: "sales-forecast".to_string(),
            training_task_definition: altus_sdk::schema::training::AUTOML_TABULAR.to_string(),
            model_display_name: Some("sales-forecast-model".to_string()),
            ..Default::default()
        },
        Some(&dataset),
        CallOptions::deferred(),
    )
    .await
    .unwrap();

    // Telemetry setup runs while the pipeline is queued.
    let tensorboard = Tensorboard::create(&ctx, "sales runs", CallOptions::inline())
        .await
        .unwrap();
    let experiment = tensorboard.create_experiment("forecast", "forecast trials").await.unwrap();
    let run = experiment.create_run("trial-1", "baseline").await.unwrap();
    let series = run.create_time_series("loss").await.unwrap();
    let series_id = series.resource_name().unwrap().id().to_string();
    run.write_scalars(&series_id, &[(1, 0.9), (2, 0.4)], CallOptions::deferred())
        .await
        .unwrap();

    pipeline.wait().await.unwrap();
    run.wait().await.unwrap();

    // The run consumed the deferred dataset.
    let input = pipeline.snapshot().unwrap().input_data_config.unwrap();
    assert_eq!(input.dataset_id, dataset.resource_name().unwrap().id());

    // The registered model resolves through the models surface too.
    let model = pipeline.model().unwrap();
    let name = model.resource_name().unwrap();
    let fetched = Model::get(&ctx, &name.to_string()).await.unwrap();
    assert_eq!(fetched.display_name().as_deref(), Some("sales-forecast-model"));

    // Telemetry made it to the platform in write order.
    let points = series.read_points(0).await.unwrap();
    let steps: Vec<i64> = points.iter().map(|point| point.step).collect();
    assert_eq!(steps, vec![1, 2]);

    // Cross-resource ordering held: the dataset existed before the run.
    let calls = platform.calls();
    let create_dataset = calls.iter().position(|m| *m == "create_dataset").unwrap();
    let create_pipeline = calls.iter().position(|m| *m == "create_training_pipeline").unwrap();
    assert!(create_dataset < create_pipeline);
}
