mod config;
mod discord;
mod github;
mod server;
mod translate;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, ConfigLoad};
use crate::discord::DiscordClient;
use crate::server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gh_discord_bridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = match Config::load_or_init(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    {
        ConfigLoad::Loaded(config) => config,
        ConfigLoad::Created => {
            info!(
                "Created {} - please update it with your Discord webhook URL and restart",
                config_path.display()
            );
            return Ok(());
        }
    };

    info!("Configuration loaded successfully");
    info!("  Listen address: {}", config.listen_addr());
    info!("  Discord timeout: {}s", config.discord.timeout_secs);

    let addr = config.listen_addr();
    let notifier = DiscordClient::new(config.discord).context("Failed to build HTTP client")?;
    let state = AppState::new(Arc::new(notifier));

    server::run(&addr, state).await
}
