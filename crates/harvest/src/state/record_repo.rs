//! Per-record change tracking: the `record_state` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::model::IncrementalMode;

use super::{Database, IncrementalDecision, StateError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStateRow {
    pub job_id: String,
    pub dedupe_key: String,
    pub content_hash: String,
    pub first_seen_utc: String,
    pub last_seen_utc: String,
    pub last_changed_utc: String,
    pub seen_count: u64,
}

impl RecordStateRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            job_id: row.get("job_id")?,
            dedupe_key: row.get("dedupe_key")?,
            content_hash: row.get("content_hash")?,
            first_seen_utc: row.get("first_seen_utc")?,
            last_seen_utc: row.get("last_seen_utc")?,
            last_changed_utc: row.get("last_changed_utc")?,
            seen_count: row.get("seen_count")?,
        })
    }
}

fn select(
    conn: &Connection,
    job_id: &str,
    dedupe_key: &str,
) -> Result<Option<RecordStateRow>, StateError> {
    let row = conn
        .query_row(
            "SELECT job_id, dedupe_key, content_hash, first_seen_utc, last_seen_utc,
                    last_changed_utc, seen_count
             FROM record_state WHERE job_id = ?1 AND dedupe_key = ?2",
            params![job_id, dedupe_key],
            RecordStateRow::from_row,
        )
        .optional()?;
    Ok(row)
}

pub fn get(
    db: &Database,
    job_id: &str,
    dedupe_key: &str,
) -> Result<Option<RecordStateRow>, StateError> {
    db.with_conn(|conn| select(conn, job_id, dedupe_key))
}

/// Records a sighting of `dedupe_key` and decides whether to emit it.
///
/// The stored hash, `last_seen_utc` and `seen_count` are updated on every
/// call; `last_changed_utc` only when the hash differs.
pub fn decide_and_touch(
    db: &Database,
    job_id: &str,
    dedupe_key: &str,
    content_hash: &str,
    mode: IncrementalMode,
    now: &str,
) -> Result<IncrementalDecision, StateError> {
    db.with_transaction(|conn| {
        let Some(previous) = select(conn, job_id, dedupe_key)? else {
            conn.execute(
                "INSERT INTO record_state (job_id, dedupe_key, content_hash, first_seen_utc,
                    last_seen_utc, last_changed_utc, seen_count)
                 VALUES (?1, ?2, ?3, ?4, ?4, ?4, 1)",
                params![job_id, dedupe_key, content_hash, now],
            )?;
            return Ok(IncrementalDecision {
                emit: true,
                is_new: true,
                changed: true,
            });
        };

        let changed = previous.content_hash != content_hash;
        let emit = match mode {
            IncrementalMode::All => true,
            IncrementalMode::NewOnly => false,
            IncrementalMode::ChangedOnly => changed,
        };
        let last_changed = if changed {
            now
        } else {
            previous.last_changed_utc.as_str()
        };

        conn.execute(
            "UPDATE record_state
             SET content_hash = ?3, last_seen_utc = ?4, last_changed_utc = ?5,
                 seen_count = seen_count + 1
             WHERE job_id = ?1 AND dedupe_key = ?2",
            params![job_id, dedupe_key, content_hash, now, last_changed],
        )?;

        Ok(IncrementalDecision {
            emit,
            is_new: false,
            changed,
        })
    })
}
