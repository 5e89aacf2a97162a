//! Builders for jobs and listing cards.

#![allow(dead_code)]

use std::path::Path;

use serde_json::{json, Value};

use harvest::model::{DedupeMode, ExecutionMode, IncrementalMode, ProcessingStage, SinkConfig};
use harvest::{Job, Request};

use super::harness::START_URL;

pub fn card_url(n: usize) -> String {
    format!("{}/{}", START_URL, n)
}

/// A listing card for item `n`.
pub fn card(n: usize, name: &str) -> Value {
    json!({ "url": card_url(n), "name": name })
}

/// A listing card with extra entries.
pub fn card_with(n: usize, name: &str, extra: &[(&str, Value)]) -> Value {
    let mut value = card(n, name);
    if let Value::Object(map) = &mut value {
        for (key, v) in extra {
            map.insert(key.to_string(), v.clone());
        }
    }
    value
}

/// Builder for `Job` instances with test-friendly defaults: no delay,
/// ten pages and fields `name`, `phone`, `rating`.
pub struct JobBuilder {
    job: Job,
}

impl JobBuilder {
    pub fn new(id: &str) -> Self {
        let mut job = Job::new(id, "Test cafes", Request::get(START_URL));
        job.delay_ms = 0;
        job.max_pages = 10;
        job.field_schema = vec!["name".to_string(), "phone".to_string(), "rating".to_string()];
        Self { job }
    }

    pub fn stream(mut self, batch_size: usize) -> Self {
        self.job.execution_mode = ExecutionMode::Stream;
        self.job.batch_size = batch_size;
        self
    }

    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.job.max_pages = max_pages;
        self
    }

    pub fn dedupe_mode(mut self, mode: DedupeMode) -> Self {
        self.job.dedupe_mode = mode;
        self
    }

    pub fn required_fields(mut self, fields: &[&str]) -> Self {
        self.job.required_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn field_schema(mut self, fields: &[&str]) -> Self {
        self.job.field_schema = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Turns on incremental tracking backed by SQLite at `state_path`.
    pub fn incremental(mut self, state_path: &Path) -> Self {
        self.job.incremental.enabled = true;
        self.job.incremental.state_path = state_path.to_path_buf();
        self
    }

    pub fn incremental_mode(mut self, mode: IncrementalMode) -> Self {
        self.job.incremental.mode = mode;
        self
    }

    pub fn resume(mut self, resume: bool) -> Self {
        self.job.incremental.resume = resume;
        self
    }

    pub fn checkpoint_every(mut self, pages: usize) -> Self {
        self.job.incremental.checkpoint_every_pages = pages;
        self
    }

    pub fn full_refresh_every(mut self, runs: u64) -> Self {
        self.job.incremental.full_refresh_every_runs = Some(runs);
        self
    }

    /// Appends a processing stage and enables processing.
    pub fn stage(mut self, stage: ProcessingStage) -> Self {
        self.job.processing.enabled = true;
        self.job.processing.stages.push(stage);
        self
    }

    pub fn enrich(mut self, fields: &[&str]) -> Self {
        self.job.enrich.enabled = true;
        self.job.enrich.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn sink(mut self, sink: SinkConfig) -> Self {
        self.job.sink = sink;
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}
