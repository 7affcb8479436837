//! Command handling module.
//!
//! Turns chat messages into admin actions (`setCount <n>`, `setGroup`,
//! `setAdmin`, `removeAdmin`) and applies them for authorized senders.

mod handler;
mod types;

pub use handler::{CommandRouter, RouterOptions};
pub use types::{Action, CommandResult, InboundEvent, REMOVE_ADMIN, SET_ADMIN, SET_COUNT, SET_GROUP};
