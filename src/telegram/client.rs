//! Telegram Bot API client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::{
    ApiResponse, DeleteMessageParams, SendMessageParams, SentMessage, SetWebhookParams,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur during Bot API calls.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Telegram API error {code}: {description}")]
    Api { code: i32, description: String },

    #[error("Flood wait required: {0} seconds")]
    FloodWait(u32),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL embeds the bot token.
        Self::Connection(err.without_url().to_string())
    }
}

/// Outbound messaging capability.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a text message to a chat.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<SentMessage, TelegramError>;

    /// Deletes a previously sent message.
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TelegramError>;
}

/// HTTP client for the Telegram Bot API.
pub struct BotApiClient {
    http: reqwest::Client,

    /// `{api_url}/bot{token}`, without a trailing slash.
    endpoint: String,

    /// Token prefix kept for log output.
    masked_token: String,
}

impl BotApiClient {
    /// Creates a client for the given API base URL and bot token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_url: &str, token: &str) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/bot{token}", api_url.trim_end_matches('/')),
            masked_token: mask_token(token),
        })
    }

    /// Registers the webhook URL with Telegram.
    pub async fn set_webhook(&self, url: &str) -> Result<(), TelegramError> {
        info!("Registering webhook for bot {}", self.masked_token);
        let accepted: bool = self.call("setWebhook", &SetWebhookParams { url }).await?;
        if accepted {
            info!("Webhook registered");
            Ok(())
        } else {
            Err(TelegramError::InvalidResponse(
                "setWebhook returned false".to_owned(),
            ))
        }
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, TelegramError>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        debug!("Calling Bot API method {}", method);

        let response = self
            .http
            .post(format!("{}/{method}", self.endpoint))
            .json(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let envelope: ApiResponse<R> = serde_json::from_str(&body).map_err(|e| {
            TelegramError::InvalidResponse(format!("{method} (HTTP {status}): {e}"))
        })?;

        if envelope.ok {
            return envelope.result.ok_or_else(|| {
                TelegramError::InvalidResponse(format!("{method}: missing result"))
            });
        }

        if let Some(seconds) = envelope.parameters.and_then(|p| p.retry_after) {
            warn!("Flood wait from Telegram on {}: {} seconds", method, seconds);
            return Err(TelegramError::FloodWait(seconds));
        }

        Err(TelegramError::Api {
            code: envelope.error_code.unwrap_or_else(|| i32::from(status.as_u16())),
            description: envelope
                .description
                .unwrap_or_else(|| "no description".to_owned()),
        })
    }
}

#[async_trait]
impl Messenger for BotApiClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<SentMessage, TelegramError> {
        debug!(
            "Sending message to chat {}: \"{}\"",
            chat_id,
            truncate_for_log(text, 30)
        );
        self.call("sendMessage", &SendMessageParams { chat_id, text })
            .await
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "deleteMessage",
                &DeleteMessageParams {
                    chat_id,
                    message_id,
                },
            )
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for BotApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotApiClient")
            .field("token", &self.masked_token)
            .finish_non_exhaustive()
    }
}

/// Masks a bot token for logging (keeps the numeric bot id).
fn mask_token(token: &str) -> String {
    match token.split_once(':') {
        Some((bot_id, _)) if !bot_id.is_empty() => format!("{bot_id}:***"),
        _ => "***".to_owned(),
    }
}

/// Truncates a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}
