//! JSON file backed state store.
//!
//! Each document lives in `<dir>/<id>.json`. Writes go to a temporary file
//! first and are moved into place with a rename, so a crash never leaves a
//! half-written document behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::{GroupState, StateStore, StoreError};

const DOCUMENT_SUFFIX: &str = "json";
const TEMP_SUFFIX: &str = "json.tmp";

/// State store writing one JSON file per document.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,

    /// Held for the duration of every operation.
    lock: Mutex<()>,
}

/// Exclusive access to the store directory for one operation.
///
/// Dropping the handle releases the store on every exit path.
struct Connection<'a> {
    dir: &'a Path,
    _guard: MutexGuard<'a, ()>,
}

impl Connection<'_> {
    fn document_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{DOCUMENT_SUFFIX}"))
    }

    async fn read(&self, id: &str) -> Result<Option<GroupState>, StoreError> {
        match tokio::fs::read_to_string(self.document_path(id)).await {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_or_default(&self, id: &str) -> Result<GroupState, StoreError> {
        Ok(self.read(id).await?.unwrap_or_else(|| GroupState::new(id)))
    }

    async fn write(&self, state: &GroupState) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(state)?;
        let temp = self.dir.join(format!("{}.{TEMP_SUFFIX}", state.id));
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, self.document_path(&state.id)).await?;
        debug!("Wrote document {} (day_count={})", state.id, state.day_count);
        Ok(())
    }
}

impl JsonFileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    /// Directory holding the documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn connect(&self) -> Connection<'_> {
        Connection {
            dir: &self.dir,
            _guard: self.lock.lock().await,
        }
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self, id: &str) -> Result<GroupState, StoreError> {
        let conn = self.connect().await;
        conn.read(id).await?.ok_or_else(|| StoreError::NotFound {
            id: id.to_owned(),
        })
    }

    async fn increment_day_count(&self, id: &str) -> Result<GroupState, StoreError> {
        let conn = self.connect().await;
        let mut state = conn.read(id).await?.ok_or_else(|| StoreError::NotFound {
            id: id.to_owned(),
        })?;
        state.day_count = state.day_count.saturating_add(1);
        conn.write(&state).await?;
        Ok(state)
    }

    async fn set_day_count(&self, id: &str, value: u64) -> Result<GroupState, StoreError> {
        let conn = self.connect().await;
        let mut state = conn.read_or_default(id).await?;
        state.day_count = value;
        conn.write(&state).await?;
        Ok(state)
    }

    async fn set_chat_id(&self, id: &str, chat_id: i64) -> Result<GroupState, StoreError> {
        let conn = self.connect().await;
        let mut state = conn.read_or_default(id).await?;
        state.chat_id = Some(chat_id);
        conn.write(&state).await?;
        Ok(state)
    }

    async fn add_admin(&self, id: &str, user_id: i64) -> Result<(), StoreError> {
        let conn = self.connect().await;
        let mut state = conn.read_or_default(id).await?;
        if state.admins.insert(user_id) {
            conn.write(&state).await?;
        }
        Ok(())
    }

    async fn remove_admin(&self, id: &str, user_id: i64) -> Result<(), StoreError> {
        let conn = self.connect().await;
        let Some(mut state) = conn.read(id).await? else {
            return Ok(());
        };
        if state.admins.remove(&user_id) {
            conn.write(&state).await?;
        }
        Ok(())
    }
}
