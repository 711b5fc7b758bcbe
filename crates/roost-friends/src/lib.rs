//! Service layer of the friend subsystem: the apply-record state machine
//! and the bidirectional relationship store.
//!
//! Both services are built from explicitly injected collaborators — the
//! relational [`roost_db::Database`] as record of truth, and the advisory
//! presence/counter/cache side from `roost-presence`. Presence never
//! participates in a relational transaction; it only feeds the decision of
//! whether to hand an event to the [`roost_presence::Notifier`] boundary.

pub mod apply;
pub mod config;
pub mod hooks;
pub mod relations;

pub use apply::FriendApplyWorkflow;
pub use config::FriendsConfig;
pub use hooks::{ConversationCleanup, NullCleanup};
pub use relations::FriendRelationshipStore;

use std::sync::Arc;

use roost_db::Database;
use roost_types::RelationError;
use tracing::{error, warn};
use uuid::Uuid;

/// Run a query against the record-of-truth store off the async runtime.
/// Store failures here are fatal to the calling operation (`Unavailable`);
/// advisory cache/presence work never goes through this path.
pub(crate) async fn run_db<T, F>(db: &Arc<Database>, f: F) -> Result<T, RelationError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let db = db.clone();
    tokio::task::spawn_blocking(move || f(&db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            RelationError::Unavailable(e.into())
        })?
        .map_err(RelationError::from)
}

pub(crate) fn parse_uuid(raw: &str, context: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", context, raw, e);
        Uuid::default()
    })
}
