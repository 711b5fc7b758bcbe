use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a friend-apply record. `Pending` is the only state that
/// can transition; `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplyStatus {
    /// Convert to the database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyStatus::Pending => "pending",
            ApplyStatus::Accepted => "accepted",
            ApplyStatus::Rejected => "rejected",
        }
    }

    /// Parse from the database string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApplyStatus::Pending),
            "accepted" => Some(ApplyStatus::Accepted),
            "rejected" => Some(ApplyStatus::Rejected),
            _ => None,
        }
    }
}

/// The decision the target of an apply record makes exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyDecision {
    Accept,
    Reject,
}

/// A friend request awaiting or having received a decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendApply {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub target_id: Uuid,
    /// Free-text note supplied by the applicant.
    pub remark: Option<String>,
    pub status: ApplyStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// One entry of a user's friend list. `remark` is the owner's private
/// display-name override; `online` is a point-in-time presence snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendEntry {
    pub friend_id: Uuid,
    pub remark: Option<String>,
    pub online: bool,
}

/// The requester's relationship toward a searched user, so clients can
/// render the right call-to-action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationStatus {
    /// No relationship and no pending apply in either direction.
    NoRelation,
    /// An unresolved apply exists between the two users.
    ApplyPending,
    Friend,
}

/// Result of a user search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub mobile: Option<String>,
    pub relation: RelationStatus,
}

/// Exactly one lookup key — an exact id or an exact phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    ById(Uuid),
    ByMobile(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_status_roundtrip() {
        for status in [ApplyStatus::Pending, ApplyStatus::Accepted, ApplyStatus::Rejected] {
            assert_eq!(ApplyStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ApplyStatus::parse("cancelled"), None);
    }

    #[test]
    fn friend_apply_serializes_status_lowercase() {
        let apply = FriendApply {
            id: Uuid::new_v4(),
            applicant_id: Uuid::new_v4(),
            target_id: Uuid::new_v4(),
            remark: Some("classmate".into()),
            status: ApplyStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        };

        let json = serde_json::to_value(&apply).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["remark"], "classmate");
    }
}
