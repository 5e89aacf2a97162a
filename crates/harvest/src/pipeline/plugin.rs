use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{Record, StageKind};

/// Plugin-specific settings from the stage definition.
pub type StageConfig = Map<String, Value>;

/// What a stage knows about the run it is part of.
#[derive(Debug, Clone)]
pub struct ProcessContext {
    pub job_id: String,
    pub job_name: String,
    /// `"<1-based index>:<plugin>"`, also the key for metrics and artifacts.
    pub stage_name: String,
    pub stage_index: usize,
    pub run_started_utc: DateTime<Utc>,
}

/// A plugin's report that it could not process a record or batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StageFailure {
    pub message: String,
}

impl StageFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutput {
    pub records: Vec<Record>,
    pub artifacts: Map<String, Value>,
}

impl BatchOutput {
    pub fn records(records: Vec<Record>) -> Self {
        Self {
            records,
            artifacts: Map::new(),
        }
    }

    pub fn with_artifact(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.artifacts.insert(key.into(), value.into());
        self
    }
}

/// A named processing step.
///
/// Record-kind plugins implement `process_record`; batch and analytics
/// plugins implement `process_batch`. Inputs are borrowed so a failing
/// unit can be kept or quarantined unchanged.
pub trait ProcessorPlugin {
    fn name(&self) -> &str;

    fn stage_kind(&self) -> StageKind;

    fn input_schema_version(&self) -> &str {
        "1.0"
    }

    fn output_schema_version(&self) -> &str {
        "1.0"
    }

    /// Plugins that are not idempotent are refused by the runner.
    fn idempotent(&self) -> bool;

    /// `Ok(None)` drops the record.
    fn process_record(
        &self,
        record: &Record,
        _config: &StageConfig,
        _ctx: &ProcessContext,
    ) -> Result<Option<Record>, StageFailure> {
        Ok(Some(record.clone()))
    }

    fn process_batch(
        &self,
        records: &[Record],
        _config: &StageConfig,
        _ctx: &ProcessContext,
    ) -> Result<BatchOutput, StageFailure> {
        Ok(BatchOutput::records(records.to_vec()))
    }
}
