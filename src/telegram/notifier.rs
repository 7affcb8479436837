//! Outbound notifications to the configured group.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{Messenger, TelegramError};
use crate::cache::Cache;
use crate::error::BotError;
use crate::store::StoreError;

/// Default lifetime of a disappearing message.
pub const DEFAULT_DISAPPEAR_AFTER: Duration = Duration::from_secs(5);

/// Sends messages to chats, resolving the group chat through the cache.
pub struct Notifier {
    messenger: Arc<dyn Messenger>,
    cache: Arc<Cache>,

    /// Parent token of every pending deletion.
    pending: CancellationToken,
}

impl Notifier {
    #[must_use]
    pub fn new(messenger: Arc<dyn Messenger>, cache: Arc<Cache>) -> Self {
        Self {
            messenger,
            cache,
            pending: CancellationToken::new(),
        }
    }

    /// Sends a message to an explicit chat.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64, TelegramError> {
        let sent = self.messenger.send_message(chat_id, text).await?;
        Ok(sent.message_id)
    }

    /// Resolves the group chat, refreshing the cache once if it is unknown.
    ///
    /// A missing document means no group has been set yet.
    async fn group_chat(&self) -> Result<Option<i64>, BotError> {
        if let Some(chat_id) = self.cache.chat_id() {
            return Ok(Some(chat_id));
        }
        match self.cache.refresh().await {
            Ok(()) | Err(StoreError::NotFound { .. }) => Ok(self.cache.chat_id()),
            Err(e) => Err(e.into()),
        }
    }

    /// Sends a message to the configured group.
    ///
    /// Returns `None` without sending when no group has been set yet.
    pub async fn send_to_group(&self, text: &str) -> Result<Option<i64>, BotError> {
        let Some(chat_id) = self.group_chat().await? else {
            info!("No group configured, message not sent");
            return Ok(None);
        };
        Ok(Some(self.send_message(chat_id, text).await?))
    }

    /// Sends a message and deletes it after `ttl`.
    ///
    /// The notice appended to the text rounds `ttl` up to whole seconds.
    ///
    /// Deletion is best effort: failures are logged and dropped, and pending
    /// deletions are abandoned on [`Notifier::shutdown`].
    pub async fn send_disappearing(
        &self,
        chat_id: i64,
        text: &str,
        ttl: Duration,
    ) -> Result<i64, TelegramError> {
        let text = format!("{text}\n{}", deletion_notice(ttl));
        let message_id = self.send_message(chat_id, &text).await?;

        let messenger = Arc::clone(&self.messenger);
        let cancel = self.pending.child_token();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("Dropped pending deletion of message {} in chat {}", message_id, chat_id);
                }
                () = tokio::time::sleep(ttl) => {
                    if let Err(e) = messenger.delete_message(chat_id, message_id).await {
                        debug!("Could not delete message {} in chat {}: {}", message_id, chat_id, e);
                    }
                }
            }
        });

        Ok(message_id)
    }

    /// Disappearing message to the configured group, if any.
    pub async fn send_disappearing_to_group(
        &self,
        text: &str,
        ttl: Duration,
    ) -> Result<Option<i64>, BotError> {
        let Some(chat_id) = self.group_chat().await? else {
            debug!("No group configured, confirmation not sent");
            return Ok(None);
        };
        Ok(Some(self.send_disappearing(chat_id, text, ttl).await?))
    }

    /// Cancels every pending deletion.
    pub fn shutdown(&self) {
        self.pending.cancel();
    }
}

/// Footer announcing the deletion, with `ttl` rounded up to whole seconds.
fn deletion_notice(ttl: Duration) -> String {
    let seconds = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    let unit = if seconds == 1 { "second" } else { "seconds" };
    format!("This message will be deleted in {seconds} {unit}.")
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
