use crate::mail::ComposedMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ApiError, ensure_success};

pub const DEFAULT_GMAIL_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

/// The id the mail provider assigned to an accepted message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeliveryResult {
    pub id: String,
}

#[derive(Debug, Serialize)]
struct RawMessageRequest<'a> {
    raw: &'a str,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Submits a base64url-encoded RFC2822 message as the authenticated user.
    async fn send_raw(&self, sender: &str, message: &ComposedMessage) -> Result<DeliveryResult, ApiError>;
}

pub struct GmailClient {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl GmailClient {
    pub fn new(access_token: String) -> Self {
        Self {
            base_url: DEFAULT_GMAIL_BASE_URL.to_string(),
            access_token,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl MailTransport for GmailClient {
    async fn send_raw(&self, sender: &str, message: &ComposedMessage) -> Result<DeliveryResult, ApiError> {
        // The token is minted for the delegated user, so "me" is the sender.
        let url = format!("{}/users/me/messages/send", self.base_url);

        tracing::info!("Sending message {} as {}", message.message_id, sender);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&RawMessageRequest { raw: &message.raw })
            .send()
            .await?;

        let response = ensure_success(response, "Send message", sender).await?;
        let delivered: DeliveryResult = response.json().await?;

        tracing::info!("Message accepted by provider with ID: {}", delivered.id);
        Ok(delivered)
    }
}
