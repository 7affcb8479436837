//! Command authorization.

use std::sync::Arc;

use super::Cache;

/// Decides whether a sender may issue administrative commands.
#[derive(Debug, Clone)]
pub struct AuthGate {
    cache: Arc<Cache>,
}

impl AuthGate {
    #[must_use]
    pub fn new(cache: Arc<Cache>) -> Self {
        Self { cache }
    }

    /// `true` only if the cached admin set contains `sender_id`.
    ///
    /// An empty cache authorizes nobody. This never touches the store.
    #[must_use]
    pub fn authorize(&self, sender_id: i64) -> bool {
        self.cache.is_admin(sender_id)
    }
}
