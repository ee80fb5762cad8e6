use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Written to disk when no config file exists yet.
pub const DEFAULT_CONFIG: &str = r#"[server]
host = "0.0.0.0"
port = 8080

[discord]
webhook_url = "https://discord.com/api/webhooks/YOUR_WEBHOOK_URL"
# timeout_secs = 10
# username = "GitHub"
# avatar_url = "https://github.githubassets.com/favicons/favicon.png"
"#;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_server_config")]
    pub server: ServerConfig,
    pub discord: DiscordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscordConfig {
    #[serde(default)]
    pub webhook_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Overrides the webhook's display name in the channel.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl DiscordConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Outcome of [`Config::load_or_init`].
#[derive(Debug)]
pub enum ConfigLoad {
    Loaded(Config),
    /// No file existed; the default template was written and must be edited first.
    Created,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_server_config() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
    }
}

impl Config {
    /// `host:port` string the listener binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Load the config, or write [`DEFAULT_CONFIG`] if the file does not exist.
    pub fn load_or_init(path: &Path) -> Result<ConfigLoad> {
        if !path.exists() {
            std::fs::write(path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to create config file: {}", path.display()))?;
            return Ok(ConfigLoad::Created);
        }
        Self::load(path).map(ConfigLoad::Loaded)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        if config.discord.webhook_url.trim().is_empty() {
            anyhow::bail!("Discord webhook URL not configured");
        }

        Ok(config)
    }
}
