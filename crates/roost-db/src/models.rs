//! Database row types — these map directly to SQLite rows.
//! Distinct from roost-types API models to keep the DB layer independent.

use chrono::{DateTime, Utc};

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub mobile: Option<String>,
    pub created_at: String,
}

pub struct ApplyRow {
    pub id: String,
    pub applicant_id: String,
    pub target_id: String,
    pub remark: Option<String>,
    pub status: String,
    pub created_at: String,
    pub resolved_at: Option<String>,
}

pub struct FriendRow {
    pub user_id: String,
    pub friend_id: String,
    pub remark: Option<String>,
    pub created_at: String,
}

/// Outcome of the transactional apply resolution. The service layer maps
/// these onto the error taxonomy; keeping the variants here lets the whole
/// decision run inside one transaction.
pub enum ResolveOutcome {
    Missing,
    NotTarget,
    AlreadyResolved,
    Applied {
        applicant_id: String,
        accepted: bool,
        resolved_at: String,
    },
}

/// Outcome of an apply-record deletion.
pub enum DeleteOutcome {
    Missing,
    NotParticipant,
    Deleted,
}

/// Parse a SQLite timestamp. SQLite's `datetime('now')` produces
/// "YYYY-MM-DD HH:MM:SS" without a timezone, so fall back to naive UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_datetime() {
        let ts = parse_timestamp("2026-08-26 10:15:00").unwrap();
        assert_eq!(ts.timezone(), Utc);
        assert!(parse_timestamp("not a date").is_none());
    }
}
