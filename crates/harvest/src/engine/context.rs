use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::ConfigError;
use crate::model::{ExecutionMode, Job, Record, Report, Request};

/// How records travel from extraction to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// Everything is buffered and flushed once at the end.
    Memory,
    /// Records are flushed every `batch_size` accepted records.
    Stream { batch_size: usize },
}

pub fn resolve_execution(job: &Job) -> Result<Execution, ConfigError> {
    match job.execution_mode {
        ExecutionMode::Memory => Ok(Execution::Memory),
        ExecutionMode::Stream if job.batch_size == 0 => Err(ConfigError::validation(
            "batch_size must be positive in stream mode",
        )),
        ExecutionMode::Stream => Ok(Execution::Stream {
            batch_size: job.batch_size,
        }),
    }
}

/// Mutable state of one run.
pub(crate) struct RunContext {
    pub report: Report,
    pub run_started_utc: DateTime<Utc>,
    /// Next request to fetch; `None` once paging is over.
    pub current: Option<Request>,
    /// Pages consumed, including those done by a resumed earlier run.
    pub pages: usize,
    pub incremental: bool,
    pub resume: bool,
    pub full_refresh: bool,
    pub records: Vec<Record>,
    pub buffer: Vec<Record>,
    /// Dedupe keys already flushed by earlier chunks of this run.
    pub seen_keys: HashSet<String>,
}

impl RunContext {
    pub fn new(job: &Job) -> Self {
        Self {
            report: Report::default(),
            run_started_utc: Utc::now(),
            current: Some(job.start.clone()),
            pages: 0,
            incremental: false,
            resume: false,
            full_refresh: false,
            records: Vec::new(),
            buffer: Vec::new(),
            seen_keys: HashSet::new(),
        }
    }
}
