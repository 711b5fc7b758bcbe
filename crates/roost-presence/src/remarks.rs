use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

/// Write-through cache of `friendships.remark`, keyed by
/// (owner, friend). The relational store stays authoritative; a miss
/// here just means the caller falls back to it.
#[derive(Clone, Default)]
pub struct FriendRemarkCache {
    inner: Arc<RwLock<HashMap<(Uuid, Uuid), String>>>,
}

impl FriendRemarkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, owner_id: Uuid, friend_id: Uuid) -> Option<String> {
        self.inner.read().await.get(&(owner_id, friend_id)).cloned()
    }

    pub async fn set(&self, owner_id: Uuid, friend_id: Uuid, remark: String) {
        self.inner.write().await.insert((owner_id, friend_id), remark);
    }

    pub async fn remove(&self, owner_id: Uuid, friend_id: Uuid) {
        self.inner.write().await.remove(&(owner_id, friend_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keyed_per_direction() {
        let cache = FriendRemarkCache::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        cache.set(a, b, "bestie".into()).await;
        assert_eq!(cache.get(a, b).await.as_deref(), Some("bestie"));
        assert_eq!(cache.get(b, a).await, None);

        cache.remove(a, b).await;
        assert_eq!(cache.get(a, b).await, None);
    }
}
