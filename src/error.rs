//! Errors shared by command handling, notifications and the scheduler.

use thiserror::Error;

use crate::store::StoreError;
use crate::telegram::TelegramError;

/// Failure while applying a command or delivering a notification.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("State store: {0}")]
    Store(#[from] StoreError),

    #[error("Telegram: {0}")]
    Telegram(#[from] TelegramError),
}
