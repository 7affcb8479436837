//! Daily day-count scheduler.
//!
//! Once per cron occurrence (evaluated in the configured timezone):
//! 1. Increment the day count in the store (this also refreshes the cache)
//! 2. Announce the new count to the configured group, if any
//!
//! A failed tick is logged and the scheduler waits for the next occurrence.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::cache::Cache;
use crate::error::BotError;
use crate::telegram::Notifier;

/// Placeholder replaced by the day count in the daily message.
pub const COUNT_PLACEHOLDER: &str = "{count}";

/// Messages that can be sent to the scheduler.
#[derive(Debug, Clone)]
pub enum SchedulerMessage {
    /// Run a tick immediately.
    TickNow,
    /// Stop the scheduler.
    Shutdown,
}

/// Increments and announces the day count on a schedule.
pub struct DailyScheduler {
    cache: Arc<Cache>,
    notifier: Arc<Notifier>,
    schedule: Schedule,
    timezone: Tz,

    /// Daily message, with [`COUNT_PLACEHOLDER`] standing for the count.
    message_template: String,
}

impl DailyScheduler {
    /// Creates a new daily scheduler.
    #[must_use]
    pub fn new(
        cache: Arc<Cache>,
        notifier: Arc<Notifier>,
        schedule: Schedule,
        timezone: Tz,
        message_template: String,
    ) -> Self {
        Self {
            cache,
            notifier,
            schedule,
            timezone,
            message_template,
        }
    }

    /// Next occurrence strictly after `now`, in the scheduler's timezone.
    #[must_use]
    pub fn next_fire(&self, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
        self.schedule
            .after(&now.with_timezone(&self.timezone))
            .next()
    }

    /// Runs the scheduler loop until shutdown.
    pub async fn run(&self, mut rx: mpsc::Receiver<SchedulerMessage>) {
        info!("Daily scheduler started ({})", self.timezone);

        loop {
            let now = Utc::now();
            let delay = if let Some(next) = self.next_fire(now) {
                info!("Next daily tick at {}", next);
                (next.with_timezone(&Utc) - now)
                    .to_std()
                    .unwrap_or(Duration::ZERO)
            } else {
                warn!("Schedule has no upcoming occurrence, waiting for messages only");
                Duration::MAX
            };

            tokio::select! {
                () = tokio::time::sleep(delay) => {
                    self.run_tick().await;
                }
                msg = rx.recv() => {
                    match msg {
                        Some(SchedulerMessage::TickNow) => {
                            debug!("Received tick-now message");
                            self.run_tick().await;
                        }
                        Some(SchedulerMessage::Shutdown) | None => {
                            info!("Scheduler shutting down");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn run_tick(&self) {
        match self.tick().await {
            Ok(Some(message_id)) => info!("Daily count announced (message {})", message_id),
            Ok(None) => info!("Daily count updated, no group to announce to"),
            Err(e) => error!("Daily tick failed: {}", e),
        }
    }

    /// Increments the day count and announces it to the group.
    ///
    /// Returns the id of the announcement, or `None` if no group is set.
    pub async fn tick(&self) -> Result<Option<i64>, BotError> {
        let state = self.cache.increment_day_count().await?;
        let text = render_day_message(&self.message_template, state.day_count);
        self.notifier.send_to_group(&text).await
    }
}

/// Fills the day count into a message template.
#[must_use]
pub fn render_day_message(template: &str, day_count: u64) -> String {
    template.replace(COUNT_PLACEHOLDER, &day_count.to_string())
}

impl std::fmt::Debug for DailyScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailyScheduler")
            .field("timezone", &self.timezone)
            .field("message_template", &self.message_template)
            .finish_non_exhaustive()
    }
}
