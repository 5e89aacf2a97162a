use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Runtime counters for one processing stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageMetrics {
    pub records_in: usize,
    pub records_out: usize,
    pub dropped: usize,
    pub errors: usize,
    pub latency_ms: f64,
}

impl StageMetrics {
    /// Adds another run of the same stage, e.g. a later stream chunk.
    pub fn merge(&mut self, other: &StageMetrics) {
        self.records_in += other.records_in;
        self.records_out += other.records_out;
        self.dropped += other.dropped;
        self.errors += other.errors;
        self.latency_ms = round_ms(self.latency_ms + other.latency_ms);
    }
}

pub(crate) fn round_ms(ms: f64) -> f64 {
    (ms * 1000.0).round() / 1000.0
}

/// Run-scoped counters. Created per run, returned to the caller, never persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub pages_fetched: usize,
    pub cards_found: usize,
    pub records_emitted: usize,
    pub records_skipped: usize,
    pub records_skipped_incremental: usize,
    pub records_quarantined: usize,
    pub failures: BTreeMap<String, usize>,
    pub processing_stage_metrics: BTreeMap<String, StageMetrics>,
    pub processing_artifacts: BTreeMap<String, Value>,
    pub run_count: Option<u64>,
    pub full_refresh: bool,
    pub resumed_from_page: Option<usize>,
    pub chunks_flushed: usize,
}

impl Report {
    pub fn bump_failure(&mut self, reason: impl Into<String>) {
        *self.failures.entry(reason.into()).or_insert(0) += 1;
    }

    pub fn merge_stage_metrics(&mut self, metrics: BTreeMap<String, StageMetrics>) {
        for (stage, incoming) in metrics {
            match self.processing_stage_metrics.get_mut(&stage) {
                Some(existing) => existing.merge(&incoming),
                None => {
                    self.processing_stage_metrics.insert(stage, incoming);
                }
            }
        }
    }

    /// A stage that reports artifacts more than once collects them into a list.
    pub fn merge_artifacts(&mut self, artifacts: BTreeMap<String, Value>) {
        for (stage, artifact) in artifacts {
            match self.processing_artifacts.get_mut(&stage) {
                None => {
                    self.processing_artifacts.insert(stage, artifact);
                }
                Some(Value::Array(items)) => items.push(artifact),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, artifact]);
                }
            }
        }
    }
}
