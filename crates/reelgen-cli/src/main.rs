//! Video generation pipeline binary.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reelgen_gateway::GenerationClient;
use reelgen_models::{Product, TopicRequest};
use reelgen_pipeline::{PipelineConfig, VideoPipeline};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("reelgen=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let mut args = std::env::args().skip(1);
    let topic = args
        .next()
        .or_else(|| std::env::var("REELGEN_TOPIC").ok())
        .unwrap_or_default();
    let language = args
        .next()
        .or_else(|| std::env::var("REELGEN_LANGUAGE").ok())
        .unwrap_or_else(|| "English".to_string());

    if topic.trim().is_empty() {
        error!("Usage: reelgen <topic> [language]");
        std::process::exit(2);
    }

    let product = match std::env::var("REELGEN_PRODUCT") {
        Ok(value) => match Product::from_str(&value) {
            Ok(product) => product,
            Err(e) => {
                error!("Bad REELGEN_PRODUCT: {}", e);
                std::process::exit(2);
            }
        },
        Err(_) => Product::AnimatedStory,
    };

    let gateway = match GenerationClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to configure gateway client: {}", e);
            std::process::exit(1);
        }
    };
    info!(base_url = gateway.base_url(), product = %product, "Starting reelgen");

    let config = PipelineConfig::from_env();
    let pipeline = Arc::new(VideoPipeline::new(gateway, product, config));

    // Render state snapshots as they change; the pipeline is the only
    // writer, this task only reads.
    let mut updates = pipeline.subscribe();
    let renderer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if !state.status_message.is_empty() {
                info!(progress = state.progress, phase = %state.phase, "{}", state.status_message);
            }
        }
    });

    let request = TopicRequest::new(topic, language);
    match pipeline.run(&request).await {
        Ok(video_url) => {
            info!(video_url = %video_url, "Video ready");
            println!("{video_url}");
        }
        Err(e) => {
            error!("Pipeline run failed: {}", e);
            renderer.abort();
            std::process::exit(1);
        }
    }

    renderer.abort();
}
