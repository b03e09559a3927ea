mod activity;
mod assets;
mod bot;
mod config;
mod handlers;
mod logging;
mod platform;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::bot::AppState;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Initialize logging
    let log_file = logging::init(&config)?;

    info!("Configuration loaded from: {}", config_path.display());
    info!("  Tracking: {}", config.enable_tracking());
    info!("  Test mode: {}", config.test_mode());
    if let Some(path) = log_file {
        info!("  Log file: {}", path.display());
    }

    let state = Arc::new(AppState::new(config));

    info!("Bot is starting...");
    platform::telegram::run(state).await?;

    Ok(())
}
