use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

/// Per-user count of not-yet-viewed incoming friend applies.
///
/// Advisory only (UI badge); eventually consistent with the relational
/// store and rebuildable from it. Each operation is atomic under one
/// write lock — callers never observe a partial update.
#[derive(Clone, Default)]
pub struct UnreadApplyCounter {
    inner: Arc<RwLock<HashMap<Uuid, u64>>>,
}

impl UnreadApplyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: Uuid) -> u64 {
        self.inner.read().await.get(&user_id).copied().unwrap_or(0)
    }

    pub async fn set(&self, user_id: Uuid, value: u64) {
        self.inner.write().await.insert(user_id, value);
    }

    /// Returns the new value.
    pub async fn increment(&self, user_id: Uuid) -> u64 {
        let mut map = self.inner.write().await;
        let count = map.entry(user_id).or_insert(0);
        *count += 1;
        *count
    }

    /// Read-implies-acknowledge: listing applies resets the badge.
    pub async fn reset(&self, user_id: Uuid) {
        self.inner.write().await.remove(&user_id);
    }
}
