//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use day_count_bot::cache::Cache;
use day_count_bot::commands::{CommandRouter, InboundEvent, RouterOptions};
use day_count_bot::store::{GroupState, MemoryStore, StateStore, StoreError};
use day_count_bot::telegram::{ChatKind, Messenger, Notifier, SentMessage, TelegramError};

pub const DOC: &str = "doc";
pub const GROUP: i64 = -100;
pub const ADMIN: i64 = 1;

/// A message recorded by [`RecordingMessenger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: String,
}

/// Messenger that records traffic instead of calling Telegram.
#[derive(Debug)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    deleted: Mutex<Vec<(i64, i64)>>,
    next_id: AtomicI64,
    fail_deletes: AtomicBool,
}

impl Default for RecordingMessenger {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1000),
            fail_deletes: AtomicBool::new(false),
        }
    }
}

impl RecordingMessenger {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<(i64, i64)> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<SentMessage, TelegramError> {
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(Sent {
            chat_id,
            message_id,
            text: text.to_owned(),
        });
        Ok(SentMessage { message_id })
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TelegramError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(TelegramError::Api {
                code: 400,
                description: "Bad Request: message to delete not found".to_owned(),
            });
        }
        self.deleted.lock().unwrap().push((chat_id, message_id));
        Ok(())
    }
}

/// Store that reads fine but refuses every write.
pub struct ReadOnlyStore(pub MemoryStore);

fn refused() -> StoreError {
    StoreError::Unavailable(std::io::Error::other("connection reset"))
}

#[async_trait]
impl StateStore for ReadOnlyStore {
    async fn load(&self, id: &str) -> Result<GroupState, StoreError> {
        self.0.load(id).await
    }

    async fn increment_day_count(&self, _id: &str) -> Result<GroupState, StoreError> {
        Err(refused())
    }

    async fn set_day_count(&self, _id: &str, _value: u64) -> Result<GroupState, StoreError> {
        Err(refused())
    }

    async fn set_chat_id(&self, _id: &str, _chat_id: i64) -> Result<GroupState, StoreError> {
        Err(refused())
    }

    async fn add_admin(&self, _id: &str, _user_id: i64) -> Result<(), StoreError> {
        Err(refused())
    }

    async fn remove_admin(&self, _id: &str, _user_id: i64) -> Result<(), StoreError> {
        Err(refused())
    }
}

/// Store that fails every operation.
pub struct UnreadableStore;

#[async_trait]
impl StateStore for UnreadableStore {
    async fn load(&self, _id: &str) -> Result<GroupState, StoreError> {
        Err(refused())
    }

    async fn increment_day_count(&self, _id: &str) -> Result<GroupState, StoreError> {
        Err(refused())
    }

    async fn set_day_count(&self, _id: &str, _value: u64) -> Result<GroupState, StoreError> {
        Err(refused())
    }

    async fn set_chat_id(&self, _id: &str, _chat_id: i64) -> Result<GroupState, StoreError> {
        Err(refused())
    }

    async fn add_admin(&self, _id: &str, _user_id: i64) -> Result<(), StoreError> {
        Err(refused())
    }

    async fn remove_admin(&self, _id: &str, _user_id: i64) -> Result<(), StoreError> {
        Err(refused())
    }
}

/// Document with the given count, admins and group.
pub fn document(day_count: u64, admins: &[i64], chat_id: Option<i64>) -> GroupState {
    let mut state = GroupState::new(DOC);
    state.day_count = day_count;
    state.admins.extend(admins);
    state.chat_id = chat_id;
    state
}

/// Fully wired bot components over an in-process store.
pub struct Harness {
    pub store: Arc<dyn StateStore>,
    pub cache: Arc<Cache>,
    pub messenger: Arc<RecordingMessenger>,
    pub notifier: Arc<Notifier>,
    pub router: CommandRouter,
}

impl Harness {
    pub fn new(store: Arc<dyn StateStore>, options: RouterOptions) -> Self {
        let cache = Arc::new(Cache::new(Arc::clone(&store), DOC));
        let messenger = Arc::new(RecordingMessenger::default());
        let notifier = Arc::new(Notifier::new(
            Arc::clone(&messenger) as Arc<dyn Messenger>,
            Arc::clone(&cache),
        ));
        let router = CommandRouter::new(Arc::clone(&cache), Arc::clone(&notifier), options);
        Self {
            store,
            cache,
            messenger,
            notifier,
            router,
        }
    }

    /// Harness over a seeded memory store, with confirmations disabled.
    pub fn seeded(state: GroupState) -> Self {
        Self::new(
            Arc::new(MemoryStore::with_document(state)),
            RouterOptions {
                confirmations: false,
                confirmation_ttl: Duration::from_secs(5),
                report_errors: false,
            },
        )
    }

    pub async fn stored(&self) -> GroupState {
        self.store.load(DOC).await.unwrap()
    }
}

/// Message typed in the test group.
pub fn group_message(sender_id: i64, text: &str) -> InboundEvent {
    InboundEvent {
        sender_id,
        chat_id: GROUP,
        chat_kind: ChatKind::Group,
        text: text.to_owned(),
        reply_to_sender_id: None,
    }
}

/// Group message replying to `target`.
pub fn group_reply(sender_id: i64, text: &str, target: i64) -> InboundEvent {
    InboundEvent {
        reply_to_sender_id: Some(target),
        ..group_message(sender_id, text)
    }
}
