//! Persistence for the single group state document.
//!
//! The bot keeps all of its state in one record identified by a fixed
//! document id. Backends implement [`StateStore`]; every operation is
//! atomic at the level of that single document.

mod file;
mod memory;
mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use types::GroupState;

/// Errors returned by state store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {id}")]
    NotFound { id: String },

    #[error("Store unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    #[error("Stored document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Access to the persisted [`GroupState`] document.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Fetches the current document.
    async fn load(&self, id: &str) -> Result<GroupState, StoreError>;

    /// Increments the day count by one and returns the updated document.
    ///
    /// Fails with [`StoreError::NotFound`] when the document does not exist;
    /// the count has to be initialized explicitly first.
    async fn increment_day_count(&self, id: &str) -> Result<GroupState, StoreError>;

    /// Overwrites the day count, creating the document if needed.
    async fn set_day_count(&self, id: &str, value: u64) -> Result<GroupState, StoreError>;

    /// Overwrites the target chat, creating the document if needed.
    async fn set_chat_id(&self, id: &str, chat_id: i64) -> Result<GroupState, StoreError>;

    /// Adds a user to the admin set, creating the document if needed.
    async fn add_admin(&self, id: &str, user_id: i64) -> Result<(), StoreError>;

    /// Removes a user from the admin set. Missing users and documents are ignored.
    async fn remove_admin(&self, id: &str, user_id: i64) -> Result<(), StoreError>;
}
