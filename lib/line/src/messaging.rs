//! Messaging API client.
//!
//! Push sends an unsolicited message to a user ID; reply answers a
//! specific webhook event through its one-time reply token. Handlers
//! depend on the `MessagingApi` trait so tests can record calls instead
//! of hitting the network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LineApiError;
use crate::event::WebhookEvent;
use crate::{event, signature};

/// Messaging API push endpoint.
const PUSH_ENDPOINT: &str = "https://api.line.me/v2/bot/message/push";

/// Messaging API reply endpoint.
const REPLY_ENDPOINT: &str = "https://api.line.me/v2/bot/message/reply";

/// An outbound message payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutgoingMessage {
    /// A plain text message.
    Text { text: String },
}

impl OutgoingMessage {
    /// Creates a text message.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Send operations of the Messaging API.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    /// Pushes a message to a user outside any reply window.
    async fn push_message(&self, to: &str, message: OutgoingMessage) -> Result<(), LineApiError>;

    /// Replies to a webhook event through its one-time reply token.
    async fn reply_message(
        &self,
        reply_token: &str,
        message: OutgoingMessage,
    ) -> Result<(), LineApiError>;
}

/// Client for a Messaging API channel.
///
/// Immutable after construction; build one at startup and share it.
pub struct MessagingClient {
    channel_secret: String,
    channel_token: String,
    http: reqwest::Client,
}

impl MessagingClient {
    /// Creates a new messaging client for a channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(channel_secret: String, channel_token: String) -> Result<Self, LineApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| LineApiError::Configuration {
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            channel_secret,
            channel_token,
            http,
        })
    }

    /// Validates a webhook delivery's `X-Line-Signature` header.
    #[must_use]
    pub fn validate_signature(&self, body: &[u8], signature: &str) -> bool {
        signature::validate(&self.channel_secret, body, signature)
    }

    /// Parses a raw webhook body into its event batch.
    pub fn parse_events(&self, body: &[u8]) -> Result<Vec<WebhookEvent>, LineApiError> {
        event::parse_events(body)
    }

    async fn send(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<(), LineApiError> {
        let response = self
            .http
            .post(endpoint)
            .bearer_auth(&self.channel_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| LineApiError::Messaging {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(LineApiError::Messaging {
                reason: format!("{endpoint} returned {}", response.status()),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl MessagingApi for MessagingClient {
    async fn push_message(&self, to: &str, message: OutgoingMessage) -> Result<(), LineApiError> {
        let body = serde_json::json!({
            "to": to,
            "messages": [message],
        });
        self.send(PUSH_ENDPOINT, body).await
    }

    async fn reply_message(
        &self,
        reply_token: &str,
        message: OutgoingMessage,
    ) -> Result<(), LineApiError> {
        let body = serde_json::json!({
            "replyToken": reply_token,
            "messages": [message],
        });
        self.send(REPLY_ENDPOINT, body).await
    }
}
