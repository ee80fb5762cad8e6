use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::DiscordConfig;

/// Body of a Discord webhook execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutboundMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub url: String,
    /// 24-bit RGB; Discord's default is used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    pub author: EmbedAuthor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmbedAuthor {
    pub name: String,
    pub url: String,
    pub icon_url: String,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("discord returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for translated messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError>;
}

/// Posts messages to a single Discord webhook URL. One attempt, no retry.
pub struct DiscordClient {
    client: reqwest::Client,
    config: DiscordConfig,
}

impl DiscordClient {
    pub fn new(config: DiscordConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    fn apply_identity(&self, message: &OutboundMessage) -> OutboundMessage {
        let mut message = message.clone();
        if message.username.is_none() {
            message.username = self.config.username.clone();
        }
        if message.avatar_url.is_none() {
            message.avatar_url = self.config.avatar_url.clone();
        }
        message
    }
}

#[async_trait]
impl Notifier for DiscordClient {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        let message = self.apply_identity(message);

        debug!("Sending to Discord: {}", serde_json::to_string(&message)?);

        let response = self
            .client
            .post(&self.config.webhook_url)
            .header("Content-Type", "application/json")
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Discord response: {}", status);
        Ok(())
    }
}
