//! Day Count Bot Library
//!
//! A Telegram bot that keeps a running day count for one group.
//!
//! This crate provides the core functionality for:
//! - Persisting the group state document and caching it in memory
//! - Authorizing and applying admin chat commands
//! - Announcing the day count to the group on a daily schedule
//! - Serving the Telegram webhook

pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod server;
pub mod store;
pub mod telegram;

pub use error::BotError;
