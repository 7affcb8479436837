//! Telegram Bot API integration.
//!
//! Provides the wire types for webhook updates, an HTTP client for the
//! Bot API, and the notifier that delivers messages to the group.

mod client;
mod notifier;
mod types;

pub use client::{BotApiClient, Messenger, TelegramError};
pub use notifier::{DEFAULT_DISAPPEAR_AFTER, Notifier};
pub use types::{Chat, ChatKind, Message, SentMessage, Update, User};
