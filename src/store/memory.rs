//! In-memory state store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{GroupState, StateStore, StoreError};

/// Store that keeps documents in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, GroupState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with one document.
    #[must_use]
    pub fn with_document(state: GroupState) -> Self {
        let mut documents = HashMap::new();
        documents.insert(state.id.clone(), state);
        Self {
            documents: Mutex::new(documents),
        }
    }
}

fn not_found(id: &str) -> StoreError {
    StoreError::NotFound { id: id.to_owned() }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self, id: &str) -> Result<GroupState, StoreError> {
        let documents = self.documents.lock().await;
        documents.get(id).cloned().ok_or_else(|| not_found(id))
    }

    async fn increment_day_count(&self, id: &str) -> Result<GroupState, StoreError> {
        let mut documents = self.documents.lock().await;
        let state = documents.get_mut(id).ok_or_else(|| not_found(id))?;
        state.day_count = state.day_count.saturating_add(1);
        Ok(state.clone())
    }

    async fn set_day_count(&self, id: &str, value: u64) -> Result<GroupState, StoreError> {
        let mut documents = self.documents.lock().await;
        let state = documents
            .entry(id.to_owned())
            .or_insert_with(|| GroupState::new(id));
        state.day_count = value;
        Ok(state.clone())
    }

    async fn set_chat_id(&self, id: &str, chat_id: i64) -> Result<GroupState, StoreError> {
        let mut documents = self.documents.lock().await;
        let state = documents
            .entry(id.to_owned())
            .or_insert_with(|| GroupState::new(id));
        state.chat_id = Some(chat_id);
        Ok(state.clone())
    }

    async fn add_admin(&self, id: &str, user_id: i64) -> Result<(), StoreError> {
        let mut documents = self.documents.lock().await;
        documents
            .entry(id.to_owned())
            .or_insert_with(|| GroupState::new(id))
            .admins
            .insert(user_id);
        Ok(())
    }

    async fn remove_admin(&self, id: &str, user_id: i64) -> Result<(), StoreError> {
        let mut documents = self.documents.lock().await;
        if let Some(state) = documents.get_mut(id) {
            state.admins.remove(&user_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_increment_requires_document() {
        let store = MemoryStore::new();
        let result = store.increment_day_count("doc").await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_set_day_count_upserts() {
        let store = MemoryStore::new();
        let state = store.set_day_count("doc", 9).await.unwrap();
        assert_eq!(state.day_count, 9);
        assert!(state.admins.is_empty());
        assert_eq!(state.chat_id, None);

        let state = store.increment_day_count("doc").await.unwrap();
        assert_eq!(state.day_count, 10);
    }

    #[tokio::test]
    async fn test_add_admin_is_idempotent() {
        let store = MemoryStore::new();
        store.add_admin("doc", 5).await.unwrap();
        store.add_admin("doc", 5).await.unwrap();
        let state = store.load("doc").await.unwrap();
        assert_eq!(state.admins.iter().copied().collect::<Vec<_>>(), vec![5]);
    }

    #[tokio::test]
    async fn test_remove_admin_on_missing_document_is_noop() {
        let store = MemoryStore::new();
        store.remove_admin("doc", 5).await.unwrap();
        assert!(matches!(
            store.load("doc").await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
