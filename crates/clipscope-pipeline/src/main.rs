//! Command-line analysis runner.
//!
//! Usage: `clipscope-analyze <video-url-or-keyword> [count]`
//!
//! Prints the analysis envelope as JSON on stdout.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipscope_ml_client::GeminiClient;
use clipscope_models::VideoReference;
use clipscope_pipeline::{AnalysisLogger, Orchestrator, PipelineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("clipscope=info,warn"));

    // Logs go to stderr so stdout carries only the JSON result
    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }

    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .context("usage: clipscope-analyze <video-url-or-keyword> [count]")?;
    let count = args
        .next()
        .map(|c| c.parse::<u32>())
        .transpose()
        .context("count must be a positive integer")?;

    let config = PipelineConfig::from_env();
    let model = GeminiClient::from_env().context("model client")?;
    let orchestrator = Orchestrator::from_config(&config, Arc::new(model))?;

    let reference = VideoReference::classify(&input, count)?;
    info!(
        mode = reference.mode.as_str(),
        metadata = ?orchestrator.metadata_strategies(),
        frames = ?orchestrator.frame_strategies(),
        "Starting analysis"
    );

    let logger = AnalysisLogger::generate(&format!("analyze_{}", reference.mode.as_str()));
    let envelope = orchestrator.analyze(&reference, &logger).await?;

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
