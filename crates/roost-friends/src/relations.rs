//! The authoritative bidirectional friendship store. The central
//! invariant of the whole subsystem lives here: the rows (A,B) and (B,A)
//! exist or not-exist together, always.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use roost_db::Database;
use roost_presence::{FriendRemarkCache, PresenceRegistry};
use roost_types::RelationError;
use roost_types::models::{FriendEntry, RelationStatus, SearchCriteria, UserSummary};

use crate::hooks::ConversationCleanup;
use crate::{parse_uuid, run_db};

pub struct FriendRelationshipStore {
    db: Arc<Database>,
    presence: PresenceRegistry,
    remarks: FriendRemarkCache,
    cleanup: Arc<dyn ConversationCleanup>,
}

impl FriendRelationshipStore {
    pub fn new(
        db: Arc<Database>,
        presence: PresenceRegistry,
        remarks: FriendRemarkCache,
        cleanup: Arc<dyn ConversationCleanup>,
    ) -> Self {
        Self {
            db,
            presence,
            remarks,
            cleanup,
        }
    }

    /// All friendship rows owned by `user_id`, with the `online` flag
    /// filled in from ONE batch presence query — never a per-row lookup.
    pub async fn list_friends(&self, user_id: Uuid) -> Result<Vec<FriendEntry>, RelationError> {
        let uid = user_id.to_string();
        let rows = run_db(&self.db, move |db| db.list_friends(&uid)).await?;

        let mut parsed: Vec<(Uuid, Option<String>)> = Vec::with_capacity(rows.len());
        for row in rows {
            match row.friend_id.parse::<Uuid>() {
                Ok(friend_id) => parsed.push((friend_id, row.remark)),
                Err(e) => warn!("Corrupt friend_id '{}' for '{}': {}", row.friend_id, row.user_id, e),
            }
        }

        let ids: Vec<Uuid> = parsed.iter().map(|(id, _)| *id).collect();
        let online = self.presence.batch_online(&ids).await;

        Ok(parsed
            .into_iter()
            .map(|(friend_id, remark)| FriendEntry {
                friend_id,
                remark,
                online: online.get(&friend_id).copied().unwrap_or(false),
            })
            .collect())
    }

    /// Delete both directional rows atomically, then fire the best-effort
    /// conversation-list cascade. Zero rows deleted means `NotFound` —
    /// the convention applied consistently, including when losing a race
    /// against a concurrent identical delete.
    pub async fn remove_friend(&self, user_id: Uuid, friend_id: Uuid) -> Result<bool, RelationError> {
        if user_id == friend_id {
            return Err(RelationError::invalid("cannot remove yourself"));
        }

        let removed = {
            let uid = user_id.to_string();
            let fid = friend_id.to_string();
            run_db(&self.db, move |db| db.remove_friend_pair(&uid, &fid)).await?
        };

        if removed == 0 {
            return Err(RelationError::NotFound);
        }
        if removed != 2 {
            // The transaction deletes whatever exists of the pair, so a
            // dangling one-sided row gets repaired here rather than left.
            warn!(user = %user_id, friend = %friend_id, removed, "removed a non-paired friendship");
        }

        info!(user = %user_id, friend = %friend_id, "friendship removed");

        // Cascades are advisory: logged, never fatal, never rolled back into
        for (owner, other) in [(user_id, friend_id), (friend_id, user_id)] {
            if let Err(e) = self.cleanup.remove_pair(owner, other) {
                warn!(owner = %owner, friend = %other, "conversation cleanup failed: {}", e);
            }
        }
        self.remarks.remove(user_id, friend_id).await;
        self.remarks.remove(friend_id, user_id).await;

        Ok(true)
    }

    /// Update the owner's directional remark only; the paired row is
    /// untouched. Writes through to the remark cache on success.
    pub async fn edit_remark(
        &self,
        owner_id: Uuid,
        friend_id: Uuid,
        remark: &str,
    ) -> Result<bool, RelationError> {
        if remark.trim().is_empty() {
            return Err(RelationError::invalid("remark must not be empty"));
        }

        let updated = {
            let oid = owner_id.to_string();
            let fid = friend_id.to_string();
            let remark = remark.to_string();
            run_db(&self.db, move |db| db.update_remark(&oid, &fid, &remark)).await?
        };
        if !updated {
            return Err(RelationError::NotFound);
        }

        self.remarks.set(owner_id, friend_id, remark.to_string()).await;
        info!(owner = %owner_id, friend = %friend_id, "friend remark updated");
        Ok(true)
    }

    /// Read-through remark lookup: cache first, then the store of record,
    /// populating the cache on a hit.
    pub async fn friend_remark(
        &self,
        owner_id: Uuid,
        friend_id: Uuid,
    ) -> Result<Option<String>, RelationError> {
        if let Some(cached) = self.remarks.get(owner_id, friend_id).await {
            return Ok(Some(cached));
        }

        let remark = {
            let oid = owner_id.to_string();
            let fid = friend_id.to_string();
            run_db(&self.db, move |db| db.get_remark(&oid, &fid)).await?
        };
        if let Some(ref remark) = remark {
            self.remarks.set(owner_id, friend_id, remark.clone()).await;
        }
        Ok(remark)
    }

    /// Look up a user by exact id or exact mobile number, annotated with
    /// the requester's relation toward the match so clients can render
    /// the right state.
    pub async fn search_user(
        &self,
        criteria: SearchCriteria,
        requester_id: Uuid,
    ) -> Result<Option<UserSummary>, RelationError> {
        let row = match criteria {
            SearchCriteria::ById(id) => {
                let id = id.to_string();
                run_db(&self.db, move |db| db.get_user_by_id(&id)).await?
            }
            SearchCriteria::ByMobile(mobile) => {
                if mobile.trim().is_empty() {
                    return Err(RelationError::invalid("mobile must not be empty"));
                }
                run_db(&self.db, move |db| db.get_user_by_mobile(&mobile)).await?
            }
        };

        let Some(row) = row else {
            return Ok(None);
        };
        let match_id = parse_uuid(&row.id, "user id");

        let relation = if match_id == requester_id {
            RelationStatus::NoRelation
        } else {
            self.relation_between(requester_id, match_id).await?
        };

        Ok(Some(UserSummary {
            id: match_id,
            username: row.username,
            mobile: row.mobile,
            relation,
        }))
    }

    async fn relation_between(&self, a: Uuid, b: Uuid) -> Result<RelationStatus, RelationError> {
        let (aid, bid) = (a.to_string(), b.to_string());
        let friends = {
            let (aid, bid) = (aid.clone(), bid.clone());
            run_db(&self.db, move |db| db.has_friendship(&aid, &bid)).await?
        };
        if friends {
            return Ok(RelationStatus::Friend);
        }

        let pending = run_db(&self.db, move |db| db.has_pending_apply_between(&aid, &bid)).await?;
        Ok(if pending {
            RelationStatus::ApplyPending
        } else {
            RelationStatus::NoRelation
        })
    }
}
