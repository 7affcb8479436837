//! Timed jobs: the daily day-count tick and the keep-alive ping.
//!
//! The two run as independent tasks with no ordering between them.

mod keepalive;
mod runner;

pub use keepalive::KeepAlive;
pub use runner::{COUNT_PLACEHOLDER, DailyScheduler, SchedulerMessage, render_day_message};
