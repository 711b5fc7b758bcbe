//! The apply-record state machine: `pending -> {accepted, rejected}`,
//! terminal, resolved exactly once. Deletion is an orthogonal action
//! available to either participant in any state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use roost_db::Database;
use roost_db::models::{ApplyRow, DeleteOutcome, ResolveOutcome, parse_timestamp};
use roost_presence::{Notifier, PresenceRegistry, UnreadApplyCounter};
use roost_types::RelationError;
use roost_types::events::FriendEvent;
use roost_types::models::{ApplyDecision, ApplyStatus, FriendApply};

use crate::config::FriendsConfig;
use crate::{parse_uuid, run_db};

pub struct FriendApplyWorkflow {
    db: Arc<Database>,
    presence: PresenceRegistry,
    unread: UnreadApplyCounter,
    notifier: Arc<dyn Notifier>,
    config: FriendsConfig,
}

impl FriendApplyWorkflow {
    pub fn new(
        db: Arc<Database>,
        presence: PresenceRegistry,
        unread: UnreadApplyCounter,
        notifier: Arc<dyn Notifier>,
        config: FriendsConfig,
    ) -> Self {
        Self {
            db,
            presence,
            unread,
            notifier,
            config,
        }
    }

    /// Create a `pending` apply record, bump the target's unread badge,
    /// and — only if the target is online right now — hand the event to
    /// the notifier. Everything after the insert is advisory.
    pub async fn send_apply(
        &self,
        applicant_id: Uuid,
        target_id: Uuid,
        remark: Option<String>,
    ) -> Result<FriendApply, RelationError> {
        if applicant_id == target_id {
            return Err(RelationError::invalid("cannot send a friend apply to yourself"));
        }
        let remark = remark.filter(|r| !r.trim().is_empty());

        // Fail fast before any mutation
        let tid = target_id.to_string();
        let target = run_db(&self.db, move |db| db.get_user_by_id(&tid)).await?;
        if target.is_none() {
            return Err(RelationError::NotFound);
        }

        // Duplicate applies against an existing pending record or an
        // existing friendship are allowed here; exclusivity is not this
        // layer's call.
        let apply_id = Uuid::new_v4();
        let row = {
            let id = apply_id.to_string();
            let aid = applicant_id.to_string();
            let tid = target_id.to_string();
            let remark = remark.clone();
            run_db(&self.db, move |db| {
                db.insert_apply(&id, &aid, &tid, remark.as_deref())
            })
            .await?
        };
        let apply = map_apply_row(row);

        info!(apply_id = %apply.id, applicant = %applicant_id, target = %target_id, "friend apply created");

        self.unread.increment(target_id).await;
        if self.presence.is_online(target_id).await {
            self.notifier.notify(
                target_id,
                FriendEvent::ApplyReceived {
                    apply_id: apply.id,
                    applicant_id,
                    remark: apply.remark.clone(),
                    created_at: apply.created_at,
                },
            );
        }

        Ok(apply)
    }

    /// Apply records visible to `user_id`, newest first. `page` is
    /// 1-based. Side effect: the user's unread badge resets — listing is
    /// acknowledgement.
    pub async fn list_applies(
        &self,
        user_id: Uuid,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<FriendApply>, RelationError> {
        let page = page.max(1);
        let page_size = self.config.clamp_page_size(page_size);
        // Widened so an arbitrarily large page index yields an empty page
        // instead of overflowing
        let offset = u64::from(page - 1) * u64::from(page_size);

        let uid = user_id.to_string();
        let rows = run_db(&self.db, move |db| db.list_applies(&uid, page_size, offset)).await?;

        self.unread.reset(user_id).await;

        Ok(rows.into_iter().map(map_apply_row).collect())
    }

    /// Resolve a pending apply exactly once. Returns `true` for an
    /// acceptance, `false` for a rejection. The loser of a concurrent
    /// resolution race gets `AlreadyResolved`.
    pub async fn resolve_apply(
        &self,
        resolver_id: Uuid,
        apply_id: Uuid,
        decision: ApplyDecision,
        remark: Option<String>,
    ) -> Result<bool, RelationError> {
        let remark = remark.filter(|r| !r.trim().is_empty());
        let accept = matches!(decision, ApplyDecision::Accept);

        let outcome = {
            let aid = apply_id.to_string();
            let rid = resolver_id.to_string();
            run_db(&self.db, move |db| {
                db.resolve_apply(&aid, &rid, accept, remark.as_deref())
            })
            .await?
        };

        match outcome {
            ResolveOutcome::Missing => Err(RelationError::NotFound),
            // Resolution is an authorization boundary: non-targets get
            // NotFound rather than Forbidden so record existence does not
            // leak across users.
            ResolveOutcome::NotTarget => Err(RelationError::NotFound),
            ResolveOutcome::AlreadyResolved => Err(RelationError::AlreadyResolved),
            ResolveOutcome::Applied {
                applicant_id,
                accepted,
                resolved_at,
            } => {
                info!(
                    apply_id = %apply_id,
                    resolver = %resolver_id,
                    accepted,
                    "friend apply resolved"
                );

                if accepted {
                    let applicant = parse_uuid(&applicant_id, "applicant_id");
                    if self.presence.is_online(applicant).await {
                        self.notifier.notify(
                            applicant,
                            FriendEvent::ApplyAccepted {
                                apply_id,
                                friend_id: resolver_id,
                                resolved_at: parse_ts(&resolved_at, &applicant_id),
                            },
                        );
                    }
                }
                // Rejection never notifies
                Ok(accepted)
            }
        }
    }

    /// Hard-delete an apply record. Either participant may do this in any
    /// state; the record is shared, so the other side's view goes too.
    pub async fn delete_apply(&self, user_id: Uuid, apply_id: Uuid) -> Result<bool, RelationError> {
        let outcome = {
            let aid = apply_id.to_string();
            let uid = user_id.to_string();
            run_db(&self.db, move |db| db.delete_apply(&aid, &uid)).await?
        };

        match outcome {
            DeleteOutcome::Missing => Err(RelationError::NotFound),
            DeleteOutcome::NotParticipant => Err(RelationError::Forbidden),
            DeleteOutcome::Deleted => {
                info!(apply_id = %apply_id, user = %user_id, "friend apply deleted");
                Ok(true)
            }
        }
    }

    /// Current unread-apply badge for a user.
    pub async fn unread_count(&self, user_id: Uuid) -> u64 {
        self.unread.get(user_id).await
    }
}

pub(crate) fn map_apply_row(row: ApplyRow) -> FriendApply {
    let status = ApplyStatus::parse(&row.status).unwrap_or_else(|| {
        warn!("Corrupt apply status '{}' on '{}'", row.status, row.id);
        ApplyStatus::Pending
    });

    FriendApply {
        id: parse_uuid(&row.id, "apply id"),
        applicant_id: parse_uuid(&row.applicant_id, "applicant_id"),
        target_id: parse_uuid(&row.target_id, "target_id"),
        remark: row.remark,
        status,
        created_at: parse_ts(&row.created_at, &row.id),
        resolved_at: row.resolved_at.as_deref().map(|raw| parse_ts(raw, &row.id)),
    }
}

fn parse_ts(raw: &str, record: &str) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap_or_else(|| {
        warn!("Corrupt timestamp '{}' on '{}'", raw, record);
        DateTime::default()
    })
}
