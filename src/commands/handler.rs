//! Command router implementation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::types::{Action, CommandResult, InboundEvent};
use crate::cache::{AuthGate, Cache};
use crate::error::BotError;
use crate::store::StoreError;
use crate::telegram::{DEFAULT_DISAPPEAR_AFTER, Notifier};

/// Optional router behaviour.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Send a disappearing confirmation to the group after each action.
    pub confirmations: bool,

    /// How long confirmations stay visible.
    pub confirmation_ttl: Duration,

    /// Send the error text to the first admin's private chat when an admin's
    /// command fails.
    pub report_errors: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            confirmations: true,
            confirmation_ttl: DEFAULT_DISAPPEAR_AFTER,
            report_errors: true,
        }
    }
}

/// Parses inbound messages and applies admin commands.
pub struct CommandRouter {
    cache: Arc<Cache>,
    auth: AuthGate,
    notifier: Arc<Notifier>,
    options: RouterOptions,
}

impl CommandRouter {
    /// Creates a new command router.
    #[must_use]
    pub fn new(cache: Arc<Cache>, notifier: Arc<Notifier>, options: RouterOptions) -> Self {
        Self {
            auth: AuthGate::new(Arc::clone(&cache)),
            cache,
            notifier,
            options,
        }
    }

    /// Handles a message without ever failing.
    ///
    /// Errors are logged and, if enabled, reported back to the chat. This is
    /// the entry point for the webhook, which must acknowledge every update.
    pub async fn process(&self, event: &InboundEvent) {
        match self.handle(event).await {
            Ok(result) if result.executed => {
                info!(
                    "Applied {} command(s) from {}",
                    result.actions.len(),
                    event.sender_id
                );
            }
            Ok(_) => {}
            Err(e) => {
                error!("Command from {} failed: {}", event.sender_id, e);
                self.report_error(event, &e).await;
            }
        }
    }

    /// Parses a message and applies its actions if the sender is an admin.
    ///
    /// Unauthorized commands are parsed and logged but never applied; the
    /// result is still `Ok`. Only store and transport failures are errors.
    pub async fn handle(&self, event: &InboundEvent) -> Result<CommandResult, BotError> {
        let actions = Action::parse(event);
        if actions.is_empty() {
            return Ok(CommandResult::noop());
        }

        debug!(
            "Parsed {:?} from sender {} in chat {}",
            actions, event.sender_id, event.chat_id
        );

        // A missing document means no admins exist yet.
        match self.cache.ensure_loaded().await {
            Ok(()) | Err(StoreError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        if !self.auth.authorize(event.sender_id) {
            info!(
                "Ignoring {} command(s) from unauthorized sender {}",
                actions.len(),
                event.sender_id
            );
            return Ok(CommandResult::unauthorized(actions));
        }

        for action in &actions {
            self.apply(action).await?;
            info!("Command {} applied", action);
            self.confirm(action).await;
        }

        Ok(CommandResult::executed(actions))
    }

    async fn apply(&self, action: &Action) -> Result<(), StoreError> {
        match *action {
            Action::SetDayCount(count) => self.cache.set_day_count(count).await.map(drop),
            Action::SetGroup(chat_id) => self.cache.set_group(chat_id).await.map(drop),
            Action::AddAdmin(user_id) => self.cache.add_admin(user_id).await.map(drop),
            Action::RemoveAdmin(user_id) => self.cache.remove_admin(user_id).await.map(drop),
        }
    }

    async fn confirm(&self, action: &Action) {
        if !self.options.confirmations {
            return;
        }
        if let Err(e) = self
            .notifier
            .send_disappearing_to_group(&action.confirmation(), self.options.confirmation_ttl)
            .await
        {
            warn!("Failed to confirm {}: {}", action.name(), e);
        }
    }

    /// Sends the failure privately to the first admin, never to the group.
    async fn report_error(&self, event: &InboundEvent, err: &BotError) {
        if !self.options.report_errors || !self.auth.authorize(event.sender_id) {
            return;
        }
        let Some(admin) = self.cache.first_admin() else {
            return;
        };
        if let Err(e) = self
            .notifier
            .send_message(admin, &format!("[BOT]: {err}"))
            .await
        {
            warn!("Failed to report error to admin {}: {}", admin, e);
        }
    }
}

impl std::fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRouter")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
