use std::path::Path;

use chrono::Utc;

use crate::model::{format_utc, IncrementalMode, Request};

use super::checkpoint_repo::{self, CheckpointRow};
use super::record_repo::{self, RecordStateRow};
use super::{
    run_repo, Database, IncrementalDecision, IncrementalStateStore, RunCheckpoint, StateError,
};

/// SQLite-backed [`IncrementalStateStore`].
#[derive(Clone)]
pub struct SqliteStateStore {
    db: Database,
}

fn now_utc() -> String {
    format_utc(&Utc::now())
}

fn require_non_empty(name: &str, value: &str) -> Result<(), StateError> {
    if value.trim().is_empty() {
        return Err(StateError::InvalidArgument(format!("{} must be non-empty", name)));
    }
    Ok(())
}

impl SqliteStateStore {
    pub fn open(path: &Path) -> Result<Self, StateError> {
        Ok(Self {
            db: Database::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, StateError> {
        Ok(Self {
            db: Database::open_in_memory()?,
        })
    }

    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    /// The stored tracking row for one record key, if any.
    pub fn record_state(
        &self,
        job_id: &str,
        dedupe_key: &str,
    ) -> Result<Option<RecordStateRow>, StateError> {
        record_repo::get(&self.db, job_id, dedupe_key)
    }

    pub fn run_count(&self, job_id: &str) -> Result<u64, StateError> {
        Ok(run_repo::get(&self.db, job_id)?.map_or(0, |row| row.run_count))
    }
}

impl IncrementalStateStore for SqliteStateStore {
    fn mark_run_started(&self, job_id: &str) -> Result<u64, StateError> {
        require_non_empty("job_id", job_id)?;
        run_repo::mark_started(&self.db, job_id, &now_utc())
    }

    fn mark_run_completed(&self, job_id: &str) -> Result<(), StateError> {
        require_non_empty("job_id", job_id)?;
        run_repo::mark_completed(&self.db, job_id, &now_utc())
    }

    fn save_checkpoint(
        &self,
        job_id: &str,
        request: Option<&Request>,
        page_index: usize,
        status: &str,
    ) -> Result<(), StateError> {
        require_non_empty("job_id", job_id)?;
        let request_json = request.map(serde_json::to_string).transpose()?;
        checkpoint_repo::upsert(
            &self.db,
            &CheckpointRow {
                job_id: job_id.to_string(),
                request_json,
                page_index: page_index as u64,
                status: status.to_string(),
                updated_at_utc: now_utc(),
            },
        )
    }

    fn load_checkpoint(&self, job_id: &str) -> Result<Option<RunCheckpoint>, StateError> {
        let Some(row) = checkpoint_repo::get(&self.db, job_id)? else {
            return Ok(None);
        };
        let request = row
            .request_json
            .as_deref()
            .map(serde_json::from_str::<Request>)
            .transpose()?;
        Ok(Some(RunCheckpoint {
            request,
            page_index: row.page_index as usize,
            status: row.status,
            updated_at_utc: row.updated_at_utc,
        }))
    }

    fn clear_checkpoint(&self, job_id: &str) -> Result<(), StateError> {
        checkpoint_repo::delete(&self.db, job_id)
    }

    fn decide_and_touch(
        &self,
        job_id: &str,
        dedupe_key: &str,
        content_hash: &str,
        mode: IncrementalMode,
    ) -> Result<IncrementalDecision, StateError> {
        require_non_empty("job_id", job_id)?;
        require_non_empty("dedupe_key", dedupe_key)?;
        let dedupe_key = dedupe_key.trim();
        record_repo::decide_and_touch(&self.db, job_id, dedupe_key, content_hash, mode, &now_utc())
    }
}
