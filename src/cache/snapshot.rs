//! Cached group state.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::store::{GroupState, StateStore, StoreError};

/// Shared snapshot of the [`GroupState`] document.
///
/// Readers take a short synchronous read lock and never wait on the store.
/// Writers queue on `writer` so that store round-trips and snapshot
/// replacement happen one at a time, and an older result can never
/// overwrite a newer one.
pub struct Cache {
    store: Arc<dyn StateStore>,
    document_id: String,
    snapshot: RwLock<Option<GroupState>>,
    writer: Mutex<()>,
}

impl Cache {
    /// Creates an empty cache over the given store document.
    #[must_use]
    pub fn new(store: Arc<dyn StateStore>, document_id: impl Into<String>) -> Self {
        Self {
            store,
            document_id: document_id.into(),
            snapshot: RwLock::new(None),
            writer: Mutex::new(()),
        }
    }

    /// Id of the cached document.
    #[must_use]
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Returns the current snapshot, if any.
    #[must_use]
    pub fn get(&self) -> Option<GroupState> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Configured group chat, if known.
    #[must_use]
    pub fn chat_id(&self) -> Option<i64> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|state| state.chat_id)
    }

    /// Checks admin membership against the snapshot. Never performs I/O.
    #[must_use]
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|state| state.is_admin(user_id))
    }

    /// Lowest cached admin id, used as the private recipient of error reports.
    #[must_use]
    pub fn first_admin(&self) -> Option<i64> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|state| state.admins.first().copied())
    }

    fn replace(&self, state: GroupState) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(state);
    }

    /// Reloads the document and replaces the snapshot.
    ///
    /// On failure the previous snapshot is kept.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let _writer = self.writer.lock().await;
        let state = self.store.load(&self.document_id).await?;
        debug!(
            "Cache refreshed: day_count={}, chat_id={:?}, admins={}",
            state.day_count,
            state.chat_id,
            state.admins.len()
        );
        self.replace(state);
        Ok(())
    }

    /// Refreshes only when nothing has been cached yet.
    pub async fn ensure_loaded(&self) -> Result<(), StoreError> {
        if self.get().is_none() {
            self.refresh().await?;
        }
        Ok(())
    }

    /// Increments the day count and caches the updated document.
    pub async fn increment_day_count(&self) -> Result<GroupState, StoreError> {
        let _writer = self.writer.lock().await;
        let state = self.store.increment_day_count(&self.document_id).await?;
        info!("Day count increased to {}", state.day_count);
        self.replace(state.clone());
        Ok(state)
    }

    /// Overwrites the day count and caches the updated document.
    pub async fn set_day_count(&self, value: u64) -> Result<GroupState, StoreError> {
        let _writer = self.writer.lock().await;
        let state = self.store.set_day_count(&self.document_id, value).await?;
        info!("Day count set to {}", state.day_count);
        self.replace(state.clone());
        Ok(state)
    }

    /// Sets the group that receives notifications and caches the result.
    pub async fn set_group(&self, chat_id: i64) -> Result<GroupState, StoreError> {
        let _writer = self.writer.lock().await;
        let state = self.store.set_chat_id(&self.document_id, chat_id).await?;
        info!("Group chat set to {}", chat_id);
        self.replace(state.clone());
        Ok(state)
    }

    /// Adds an admin, then re-fetches the whole document.
    pub async fn add_admin(&self, user_id: i64) -> Result<GroupState, StoreError> {
        let _writer = self.writer.lock().await;
        self.store.add_admin(&self.document_id, user_id).await?;
        let state = self.store.load(&self.document_id).await?;
        info!("Added admin {} ({} total)", user_id, state.admins.len());
        self.replace(state.clone());
        Ok(state)
    }

    /// Removes an admin, then re-fetches the whole document.
    pub async fn remove_admin(&self, user_id: i64) -> Result<GroupState, StoreError> {
        let _writer = self.writer.lock().await;
        self.store.remove_admin(&self.document_id, user_id).await?;
        let state = self.store.load(&self.document_id).await?;
        info!("Removed admin {} ({} total)", user_id, state.admins.len());
        self.replace(state.clone());
        Ok(state)
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("document_id", &self.document_id)
            .field("snapshot", &self.get())
            .finish_non_exhaustive()
    }
}
