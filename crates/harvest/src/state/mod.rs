//! Incremental state: run counters, resume checkpoints and per-record
//! content hashes, persisted per job id.

use crate::error::ConfigError;
use crate::model::{IncrementalConfig, IncrementalMode, Request};

pub mod checkpoint_repo;
mod database;
pub mod error;
pub mod migrations;
pub mod record_repo;
pub mod run_repo;
mod sqlite_store;

pub use database::Database;
pub use error::StateError;
pub use sqlite_store::SqliteStateStore;

/// Checkpoint status written while a run is still paging.
pub const STATUS_IN_PROGRESS: &str = "in_progress";

/// Outcome of [`IncrementalStateStore::decide_and_touch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncrementalDecision {
    pub emit: bool,
    pub is_new: bool,
    pub changed: bool,
}

/// Where an interrupted run left off. `request` is `None` when paging had ended.
#[derive(Debug, Clone, PartialEq)]
pub struct RunCheckpoint {
    pub request: Option<Request>,
    pub page_index: usize,
    pub status: String,
    pub updated_at_utc: String,
}

impl RunCheckpoint {
    pub fn is_in_progress(&self) -> bool {
        self.status == STATUS_IN_PROGRESS
    }
}

/// Per-job bookkeeping for resume and change detection.
///
/// Every mutating call is atomic on its own.
pub trait IncrementalStateStore {
    /// Increments and returns the job's run counter, starting at 1.
    fn mark_run_started(&self, job_id: &str) -> Result<u64, StateError>;

    fn mark_run_completed(&self, job_id: &str) -> Result<(), StateError>;

    fn save_checkpoint(
        &self,
        job_id: &str,
        request: Option<&Request>,
        page_index: usize,
        status: &str,
    ) -> Result<(), StateError>;

    fn load_checkpoint(&self, job_id: &str) -> Result<Option<RunCheckpoint>, StateError>;

    fn clear_checkpoint(&self, job_id: &str) -> Result<(), StateError>;

    /// Observes `dedupe_key` with `content_hash` and decides whether to emit it under `mode`.
    ///
    /// Fails with [`StateError::InvalidArgument`] when the key is empty.
    fn decide_and_touch(
        &self,
        job_id: &str,
        dedupe_key: &str,
        content_hash: &str,
        mode: IncrementalMode,
    ) -> Result<IncrementalDecision, StateError>;
}

/// Opens the store selected by `config.backend`.
pub fn open_state_store(
    config: &IncrementalConfig,
) -> crate::error::Result<Box<dyn IncrementalStateStore>> {
    match config.backend.trim().to_ascii_lowercase().as_str() {
        "sqlite" => Ok(Box::new(SqliteStateStore::open(&config.state_path)?)),
        other => Err(ConfigError::UnknownBackend(other.to_string()).into()),
    }
}
