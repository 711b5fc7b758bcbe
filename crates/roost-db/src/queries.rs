use crate::Database;
use crate::models::{ApplyRow, DeleteOutcome, FriendRow, ResolveOutcome, UserRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, username: &str, mobile: Option<&str>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, mobile) VALUES (?1, ?2, ?3)",
                params![id, username, mobile],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn get_user_by_mobile(&self, mobile: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "mobile", mobile))
    }

    // -- Apply records --

    pub fn insert_apply(
        &self,
        id: &str,
        applicant_id: &str,
        target_id: &str,
        remark: Option<&str>,
    ) -> Result<ApplyRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO friend_applies (id, applicant_id, target_id, remark)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, applicant_id, target_id, remark],
            )?;
            query_apply(conn, id)?.ok_or_else(|| anyhow::anyhow!("apply vanished after insert"))
        })
    }

    pub fn get_apply(&self, id: &str) -> Result<Option<ApplyRow>> {
        self.with_conn(|conn| query_apply(conn, id))
    }

    /// Apply records visible to `user_id` — both incoming and outgoing,
    /// newest first. `rowid` breaks ties within the same second.
    pub fn list_applies(&self, user_id: &str, limit: u32, offset: u64) -> Result<Vec<ApplyRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, applicant_id, target_id, remark, status, created_at, resolved_at
                 FROM friend_applies
                 WHERE target_id = ?1 OR applicant_id = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2 OFFSET ?3",
            )?;

            let rows = stmt
                .query_map(params![user_id, limit, offset], apply_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Resolve an apply record exactly once. The status flip is a
    /// compare-and-set (`WHERE status = 'pending'`): of two concurrent
    /// resolutions exactly one sees a changed row, the other gets
    /// `AlreadyResolved`. On acceptance both friendship rows are inserted
    /// in the same transaction, so the pairing invariant holds even if the
    /// second insert fails.
    pub fn resolve_apply(
        &self,
        apply_id: &str,
        resolver_id: &str,
        accept: bool,
        remark: Option<&str>,
    ) -> Result<ResolveOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let row = tx
                .query_row(
                    "SELECT applicant_id, target_id FROM friend_applies WHERE id = ?1",
                    [apply_id],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                )
                .optional()?;

            let Some((applicant_id, target_id)) = row else {
                return Ok(ResolveOutcome::Missing);
            };
            if target_id != resolver_id {
                return Ok(ResolveOutcome::NotTarget);
            }

            let new_status = if accept { "accepted" } else { "rejected" };
            let changed = tx.execute(
                "UPDATE friend_applies
                 SET status = ?1, resolved_at = datetime('now')
                 WHERE id = ?2 AND status = 'pending'",
                params![new_status, apply_id],
            )?;
            if changed == 0 {
                return Ok(ResolveOutcome::AlreadyResolved);
            }

            if accept {
                // The resolver's outgoing row carries their remark; the
                // applicant's row starts empty. ON CONFLICT covers the
                // re-accept of a duplicate apply between existing friends.
                tx.execute(
                    "INSERT INTO friendships (user_id, friend_id, remark)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(user_id, friend_id) DO UPDATE SET remark = excluded.remark",
                    params![resolver_id, applicant_id, remark],
                )?;
                tx.execute(
                    "INSERT INTO friendships (user_id, friend_id)
                     VALUES (?1, ?2)
                     ON CONFLICT(user_id, friend_id) DO NOTHING",
                    params![applicant_id, resolver_id],
                )?;
            }

            let resolved_at: String = tx.query_row(
                "SELECT resolved_at FROM friend_applies WHERE id = ?1",
                [apply_id],
                |row| row.get(0),
            )?;

            tx.commit()?;
            Ok(ResolveOutcome::Applied {
                applicant_id,
                accepted: accept,
                resolved_at,
            })
        })
    }

    /// Hard delete by either participant. The record is shared, so the
    /// other side loses their view of it too.
    pub fn delete_apply(&self, apply_id: &str, user_id: &str) -> Result<DeleteOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let row = tx
                .query_row(
                    "SELECT applicant_id, target_id FROM friend_applies WHERE id = ?1",
                    [apply_id],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                )
                .optional()?;

            let Some((applicant_id, target_id)) = row else {
                return Ok(DeleteOutcome::Missing);
            };
            if applicant_id != user_id && target_id != user_id {
                return Ok(DeleteOutcome::NotParticipant);
            }

            tx.execute("DELETE FROM friend_applies WHERE id = ?1", [apply_id])?;
            tx.commit()?;
            Ok(DeleteOutcome::Deleted)
        })
    }

    // -- Friendships --

    pub fn list_friends(&self, user_id: &str) -> Result<Vec<FriendRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, friend_id, remark, created_at
                 FROM friendships
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(FriendRow {
                        user_id: row.get(0)?,
                        friend_id: row.get(1)?,
                        remark: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Delete both directional rows in one transaction. Returns the number
    /// of rows removed — 0 means no relationship existed (or a concurrent
    /// identical delete already won).
    pub fn remove_friend_pair(&self, user_id: &str, friend_id: &str) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute(
                "DELETE FROM friendships
                 WHERE (user_id = ?1 AND friend_id = ?2)
                    OR (user_id = ?2 AND friend_id = ?1)",
                params![user_id, friend_id],
            )?;
            tx.commit()?;
            Ok(removed)
        })
    }

    /// Update only the owner's directional row. The paired row is untouched.
    pub fn update_remark(&self, owner_id: &str, friend_id: &str, remark: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE friendships SET remark = ?3 WHERE user_id = ?1 AND friend_id = ?2",
                params![owner_id, friend_id, remark],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn get_remark(&self, owner_id: &str, friend_id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let remark: Option<Option<String>> = conn
                .query_row(
                    "SELECT remark FROM friendships WHERE user_id = ?1 AND friend_id = ?2",
                    params![owner_id, friend_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(remark.flatten())
        })
    }

    /// The pairing invariant makes checking one direction sufficient.
    pub fn has_friendship(&self, user_id: &str, friend_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM friendships WHERE user_id = ?1 AND friend_id = ?2",
                    params![user_id, friend_id],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn has_pending_apply_between(&self, a: &str, b: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM friend_applies
                     WHERE status = 'pending'
                       AND ((applicant_id = ?1 AND target_id = ?2)
                         OR (applicant_id = ?2 AND target_id = ?1))",
                    params![a, b],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // `column` is one of two compile-time literals, never user input.
    let sql = format!(
        "SELECT id, username, mobile, created_at FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                mobile: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_apply(conn: &Connection, id: &str) -> Result<Option<ApplyRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, applicant_id, target_id, remark, status, created_at, resolved_at
         FROM friend_applies WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], apply_from_row).optional()?;
    Ok(row)
}

fn apply_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<ApplyRow, rusqlite::Error> {
    Ok(ApplyRow {
        id: row.get(0)?,
        applicant_id: row.get(1)?,
        target_id: row.get(2)?,
        remark: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
        resolved_at: row.get(6)?,
    })
}
