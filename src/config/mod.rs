//! Configuration module for the day count bot.
//!
//! Handles loading and validation of the bot credentials, the state
//! document id, and runtime tunables from environment variables.

mod settings;

pub use settings::{BotConfig, BotSettings, ConfigError, validate_document_id};
