//! Delivery of notifications to Discord.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};

use crate::classify::Change;
use crate::error::RelayError;
use crate::github::PushEvent;
use crate::message::{WebhookMessage, build_message};

pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Discord returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Sends a built message to a destination. One attempt, no retry.
#[async_trait]
pub trait Deliver: Send + Sync {
    async fn deliver(&self, url: &str, message: &WebhookMessage) -> Result<(), DeliveryError>;
}

/// Posts messages to Discord incoming webhooks.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
}

impl DiscordClient {
    pub fn new() -> Result<Self, DeliveryError> {
        Self::with_timeout(DELIVERY_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DeliveryError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("discord_push_relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Deliver for DiscordClient {
    async fn deliver(&self, url: &str, message: &WebhookMessage) -> Result<(), DeliveryError> {
        // Without `with_components` Discord drops the components of
        // non-application webhooks and rejects the empty message.
        let resp = self
            .http
            .post(url)
            .query(&[("with_components", "true")])
            .json(message)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }

        Ok(())
    }
}

/// Builds the notification for `change` and delivers it to `destination`.
pub async fn dispatch(
    deliverer: &dyn Deliver,
    destination: &str,
    change: &Change,
    event: &PushEvent,
) -> Result<(), RelayError> {
    let message = build_message(change, event);

    match deliverer.deliver(destination, &message).await {
        Ok(()) => {
            info!(
                "Relayed notification for '{}' in {}",
                change.name(),
                event.repository.name
            );
            Ok(())
        }
        Err(e) => {
            error!(
                "Failed to deliver notification for '{}' in {}: {}",
                change.name(),
                event.repository.name,
                e
            );
            Err(RelayError::DeliveryFailed(e))
        }
    }
}
