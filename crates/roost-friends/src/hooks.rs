use anyhow::Result;
use uuid::Uuid;

/// Cascade point for the chat-list subsystem: when a friendship ends, the
/// conversation entries for both directions should go too. The call is
/// best-effort — a failure is logged by the caller, never surfaced, and
/// never rolls back the relationship delete.
pub trait ConversationCleanup: Send + Sync {
    fn remove_pair(&self, owner_id: Uuid, friend_id: Uuid) -> Result<()>;
}

/// No-op cleanup for deployments without a conversation list.
pub struct NullCleanup;

impl ConversationCleanup for NullCleanup {
    fn remove_pair(&self, _owner_id: Uuid, _friend_id: Uuid) -> Result<()> {
        Ok(())
    }
}
