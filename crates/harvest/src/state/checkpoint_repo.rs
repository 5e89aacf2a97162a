//! Resume checkpoints: one `run_checkpoint` row per job.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, StateError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointRow {
    pub job_id: String,
    pub request_json: Option<String>,
    pub page_index: u64,
    pub status: String,
    pub updated_at_utc: String,
}

impl CheckpointRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            job_id: row.get("job_id")?,
            request_json: row.get("request_json")?,
            page_index: row.get("page_index")?,
            status: row.get("status")?,
            updated_at_utc: row.get("updated_at_utc")?,
        })
    }
}

/// Inserts or overwrites the job's checkpoint.
pub fn upsert(db: &Database, row: &CheckpointRow) -> Result<(), StateError> {
    db.with_transaction(|conn| {
        conn.execute(
            "INSERT INTO run_checkpoint (job_id, request_json, page_index, status, updated_at_utc)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(job_id) DO UPDATE SET
                request_json = excluded.request_json,
                page_index = excluded.page_index,
                status = excluded.status,
                updated_at_utc = excluded.updated_at_utc",
            params![
                row.job_id,
                row.request_json,
                row.page_index,
                row.status,
                row.updated_at_utc,
            ],
        )?;
        Ok(())
    })
}

pub fn get(db: &Database, job_id: &str) -> Result<Option<CheckpointRow>, StateError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT job_id, request_json, page_index, status, updated_at_utc
                 FROM run_checkpoint WHERE job_id = ?1",
                params![job_id],
                CheckpointRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

pub fn delete(db: &Database, job_id: &str) -> Result<(), StateError> {
    db.with_transaction(|conn| {
        conn.execute("DELETE FROM run_checkpoint WHERE job_id = ?1", params![job_id])?;
        Ok(())
    })
}
