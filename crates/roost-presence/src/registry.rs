use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

/// Tracks which users currently hold at least one live connection.
///
/// Answers are point-in-time snapshots: a user may disconnect between an
/// `is_online` check and the notification attempt, which is fine — delivery
/// is best-effort by contract.
#[derive(Clone, Default)]
pub struct PresenceRegistry {
    inner: Arc<RwLock<HashMap<Uuid, HashSet<Uuid>>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new live connection for a user. Returns the connection id
    /// the transport must present when unregistering.
    pub async fn register(&self, user_id: Uuid) -> Uuid {
        let conn_id = Uuid::new_v4();
        self.inner
            .write()
            .await
            .entry(user_id)
            .or_default()
            .insert(conn_id);
        conn_id
    }

    /// Drop one connection. Only the presented conn_id is removed, so a
    /// reconnect racing a stale disconnect never knocks the user offline.
    pub async fn unregister(&self, user_id: Uuid, conn_id: Uuid) {
        let mut map = self.inner.write().await;
        if let Some(conns) = map.get_mut(&user_id) {
            conns.remove(&conn_id);
            if conns.is_empty() {
                map.remove(&user_id);
            }
        }
    }

    /// True iff the user has at least one live connection right now.
    pub async fn is_online(&self, user_id: Uuid) -> bool {
        self.inner
            .read()
            .await
            .get(&user_id)
            .is_some_and(|conns| !conns.is_empty())
    }

    /// One round trip for a whole friend list — a single lock acquisition,
    /// never a per-row lookup.
    pub async fn batch_online(&self, user_ids: &[Uuid]) -> HashMap<Uuid, bool> {
        let map = self.inner.read().await;
        user_ids
            .iter()
            .map(|id| (*id, map.get(id).is_some_and(|conns| !conns.is_empty())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn online_while_any_connection_lives() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();

        assert!(!registry.is_online(user).await);

        let c1 = registry.register(user).await;
        let c2 = registry.register(user).await;
        assert!(registry.is_online(user).await);

        registry.unregister(user, c1).await;
        assert!(registry.is_online(user).await);

        registry.unregister(user, c2).await;
        assert!(!registry.is_online(user).await);
    }

    #[tokio::test]
    async fn stale_conn_id_does_not_knock_user_offline() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();

        let _live = registry.register(user).await;
        registry.unregister(user, Uuid::new_v4()).await;
        assert!(registry.is_online(user).await);
    }

    #[tokio::test]
    async fn batch_answers_every_requested_id() {
        let registry = PresenceRegistry::new();
        let online = Uuid::new_v4();
        let offline = Uuid::new_v4();
        registry.register(online).await;

        let statuses = registry.batch_online(&[online, offline]).await;
        assert_eq!(statuses.get(&online), Some(&true));
        assert_eq!(statuses.get(&offline), Some(&false));
    }
}
