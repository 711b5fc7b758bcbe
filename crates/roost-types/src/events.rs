use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events handed to the notification boundary for real-time delivery.
/// Delivery is best-effort: the subsystem decides *whether* to notify
/// (presence check) but never waits on the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum FriendEvent {
    /// A new friend apply landed for the receiving user.
    ApplyReceived {
        apply_id: Uuid,
        applicant_id: Uuid,
        remark: Option<String>,
        created_at: DateTime<Utc>,
    },

    /// The receiving user's outgoing apply was accepted.
    ApplyAccepted {
        apply_id: Uuid,
        friend_id: Uuid,
        resolved_at: DateTime<Utc>,
    },
}
