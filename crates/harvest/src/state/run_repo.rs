//! Run counters: the `job_runs` table.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, StateError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRunRow {
    pub job_id: String,
    pub run_count: u64,
    pub last_started_utc: Option<String>,
    pub last_completed_utc: Option<String>,
}

impl JobRunRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            job_id: row.get("job_id")?,
            run_count: row.get("run_count")?,
            last_started_utc: row.get("last_started_utc")?,
            last_completed_utc: row.get("last_completed_utc")?,
        })
    }
}

/// Bumps the run counter, creating the row on first use. Returns the new count.
pub fn mark_started(db: &Database, job_id: &str, now: &str) -> Result<u64, StateError> {
    db.with_transaction(|conn| {
        conn.execute(
            "INSERT OR IGNORE INTO job_runs (job_id, run_count) VALUES (?1, 0)",
            params![job_id],
        )?;
        conn.execute(
            "UPDATE job_runs SET run_count = run_count + 1, last_started_utc = ?2
             WHERE job_id = ?1",
            params![job_id, now],
        )?;
        let count = conn.query_row(
            "SELECT run_count FROM job_runs WHERE job_id = ?1",
            params![job_id],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}

pub fn mark_completed(db: &Database, job_id: &str, now: &str) -> Result<(), StateError> {
    db.with_transaction(|conn| {
        conn.execute(
            "INSERT OR IGNORE INTO job_runs (job_id, run_count) VALUES (?1, 0)",
            params![job_id],
        )?;
        conn.execute(
            "UPDATE job_runs SET last_completed_utc = ?2 WHERE job_id = ?1",
            params![job_id, now],
        )?;
        Ok(())
    })
}

pub fn get(db: &Database, job_id: &str) -> Result<Option<JobRunRow>, StateError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT job_id, run_count, last_started_utc, last_completed_utc
                 FROM job_runs WHERE job_id = ?1",
                params![job_id],
                JobRunRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}
