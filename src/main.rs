//! tutor-survey - sequential tutor dialog evaluation survey server
//!
//! Loads the instance dataset once, opens the responses database, and serves
//! the survey UI until stopped. Session progress lives in memory only.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use tutor_survey::config::Config;
use tutor_survey::dataset::Dataset;
use tutor_survey::sink::SqliteSink;
use tutor_survey::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Tutor Dialog Evaluation (tutor-survey) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = Config::parse();

    let dataset = Dataset::load(&config.dataset, config.limit)
        .with_context(|| format!("Failed to load dataset from {}", config.dataset.display()))?;
    info!(
        "✓ Loaded {} instances from {}",
        dataset.len(),
        config.dataset.display()
    );

    let sink = SqliteSink::connect(&config.database)
        .await
        .with_context(|| format!("Failed to open responses database {}", config.database.display()))?;
    info!("✓ Connected to responses database");

    let state = AppState::new(
        Arc::new(dataset),
        Arc::new(sink),
        config.variant,
        config.completion_info(),
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("tutor-survey listening on http://{}", config.bind);
    info!("Health check: http://{}/health", config.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
