//! Lambda function rejecting uploaded pictures whose face is already enrolled.
use std::sync::Arc;

use common_rekognition::RekognitionImpl;
use envconfig::Envconfig;
use face_dedup::config::Config;
use face_dedup::event::ImageEvent;
use face_dedup::handler::FaceDedupHandler;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn setup_tracing() {
    // CloudWatch stamps every line already
    let log_layer = tracing_subscriber::fmt::layer()
        .json()
        .without_time()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));
    tracing_subscriber::registry().with(log_layer).init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_tracing();

    let config = Config::init_from_env().expect("Invalid configuration:");
    info!(collection_id = %config.collection_id, "Starting up...");

    let client = RekognitionImpl::from_config(&config.rekognition).await;
    let handler = FaceDedupHandler::new(config, Arc::new(client));
    let handler = &handler;

    run(service_fn(move |event: LambdaEvent<ImageEvent>| async move {
        handler.invoke(event).await
    }))
    .await
}
