use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            mobile      TEXT UNIQUE,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS friend_applies (
            id              TEXT PRIMARY KEY,
            applicant_id    TEXT NOT NULL REFERENCES users(id),
            target_id       TEXT NOT NULL REFERENCES users(id),
            remark          TEXT,
            status          TEXT NOT NULL DEFAULT 'pending',
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            resolved_at     TEXT,
            CHECK (applicant_id <> target_id)
        );

        CREATE INDEX IF NOT EXISTS idx_applies_target
            ON friend_applies(target_id, created_at);

        CREATE INDEX IF NOT EXISTS idx_applies_applicant
            ON friend_applies(applicant_id, created_at);

        -- One row per direction; (A,B) and (B,A) are always created and
        -- deleted together inside a single transaction.
        CREATE TABLE IF NOT EXISTS friendships (
            user_id     TEXT NOT NULL REFERENCES users(id),
            friend_id   TEXT NOT NULL REFERENCES users(id),
            remark      TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (user_id, friend_id),
            CHECK (user_id <> friend_id)
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
