use std::collections::BTreeSet;

use serde_json::{json, Map, Value};

use crate::model::{is_blank, Record, StageKind};
use crate::pipeline::plugin::{BatchOutput, ProcessContext, ProcessorPlugin, StageConfig, StageFailure};

/// Measures how often each field is populated. Never changes the records.
///
/// Config: `fields` (list of names, optional). Without it every field name
/// seen in the batch is measured, in sorted order.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldCoverageAnalytics;

fn configured_fields(config: &StageConfig) -> Vec<String> {
    config
        .get("fields")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

impl ProcessorPlugin for FieldCoverageAnalytics {
    fn name(&self) -> &str {
        "field_coverage_analytics"
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::Analytics
    }

    fn idempotent(&self) -> bool {
        true
    }

    fn process_batch(
        &self,
        records: &[Record],
        config: &StageConfig,
        _ctx: &ProcessContext,
    ) -> Result<BatchOutput, StageFailure> {
        let mut fields = configured_fields(config);
        if fields.is_empty() {
            let discovered: BTreeSet<&String> = records.iter().flat_map(|r| r.fields.keys()).collect();
            fields = discovered.into_iter().cloned().collect();
        }

        let total = records.len();
        let mut coverage = Map::new();
        for field in fields {
            let present = records
                .iter()
                .filter(|r| r.fields.get(&field).is_some_and(|v| !is_blank(v)))
                .count();
            let ratio = if total > 0 {
                present as f64 / total as f64
            } else {
                0.0
            };
            coverage.insert(
                field,
                json!({
                    "present": present,
                    "missing": total.saturating_sub(present),
                    "coverage_ratio": ratio,
                }),
            );
        }

        Ok(BatchOutput::records(records.to_vec())
            .with_artifact("total_records", total)
            .with_artifact("field_coverage", Value::Object(coverage)))
    }
}
