use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info_span, warn};

use crate::model::{round_ms, ErrorPolicy, Job, ProcessingStage, Record, StageKind, StageMetrics};

use super::error::PipelineError;
use super::plugin::{ProcessContext, ProcessorPlugin};
use super::registry::PluginRegistry;
use super::schema::validate_records;

/// Schema version reported when processing is disabled.
const DEFAULT_SCHEMA_VERSION: &str = "1.0";

/// Result of one pass of the record set through every configured stage.
#[derive(Debug, Clone, Default)]
pub struct ProcessingOutcome {
    pub records: Vec<Record>,
    pub schema_version: String,
    pub quarantined: usize,
    pub stage_metrics: BTreeMap<String, StageMetrics>,
    pub artifacts: BTreeMap<String, Value>,
}

impl ProcessingOutcome {
    fn unchanged(records: Vec<Record>) -> Self {
        Self {
            records,
            schema_version: DEFAULT_SCHEMA_VERSION.to_string(),
            ..Self::default()
        }
    }
}

/// Runs a job's processing stages in declared order.
pub struct ProcessingRunner {
    registry: PluginRegistry,
}

impl Default for ProcessingRunner {
    fn default() -> Self {
        Self::new(PluginRegistry::with_builtins())
    }
}

impl ProcessingRunner {
    pub fn new(registry: PluginRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Passes `records` through every stage of `job.processing`.
    ///
    /// Per-unit stage failures follow the stage's error policy. Contract
    /// violations (unknown plugin, kind or schema mismatch, non-idempotent
    /// plugin, malformed records) always fail the run.
    pub fn run(
        &self,
        job: &Job,
        records: Vec<Record>,
        run_started_utc: DateTime<Utc>,
    ) -> Result<ProcessingOutcome, PipelineError> {
        let config = &job.processing;
        if !config.enabled || config.stages.is_empty() {
            return Ok(ProcessingOutcome::unchanged(records));
        }

        let mut outcome = ProcessingOutcome {
            schema_version: config.schema_version.clone(),
            records,
            ..ProcessingOutcome::default()
        };

        for (offset, stage) in config.stages.iter().enumerate() {
            let stage_index = offset + 1;
            let stage_name = format!("{}:{}", stage_index, stage.plugin);
            let _span = info_span!("processing_stage", stage = %stage_name, kind = %stage.kind)
                .entered();

            validate_records(&outcome.records, &outcome.schema_version)?;

            let plugin = self.registry.create(&stage.plugin)?;
            check_contract(&stage_name, stage, plugin.as_ref(), &outcome.schema_version)?;

            let ctx = ProcessContext {
                job_id: job.id.clone(),
                job_name: job.name.clone(),
                stage_name: stage_name.clone(),
                stage_index,
                run_started_utc,
            };

            let started = Instant::now();
            let input = std::mem::take(&mut outcome.records);
            let mut metrics = StageMetrics {
                records_in: input.len(),
                ..StageMetrics::default()
            };

            let output = match stage.kind {
                StageKind::Record => {
                    run_record_stage(plugin.as_ref(), stage, &ctx, input, &mut metrics, &mut outcome)?
                }
                StageKind::Batch | StageKind::Analytics => {
                    run_batch_stage(plugin.as_ref(), stage, &ctx, input, &mut metrics, &mut outcome)?
                }
            };
            outcome.records = output;

            let output_version = plugin.output_schema_version().to_string();
            validate_records(&outcome.records, &output_version)?;
            outcome.schema_version = output_version;

            metrics.records_out = outcome.records.len();
            metrics.latency_ms = round_ms(started.elapsed().as_secs_f64() * 1000.0);
            debug!(
                records_in = metrics.records_in,
                records_out = metrics.records_out,
                dropped = metrics.dropped,
                errors = metrics.errors,
                "Stage finished"
            );
            outcome.stage_metrics.insert(stage_name, metrics);
        }

        Ok(outcome)
    }
}

fn check_contract(
    stage_name: &str,
    stage: &ProcessingStage,
    plugin: &dyn ProcessorPlugin,
    current_schema: &str,
) -> Result<(), PipelineError> {
    if plugin.stage_kind() != stage.kind {
        return Err(PipelineError::KindMismatch {
            stage: stage_name.to_string(),
            configured: stage.kind,
            plugin: plugin.stage_kind(),
        });
    }
    if plugin.input_schema_version() != current_schema {
        return Err(PipelineError::SchemaMismatch {
            stage: stage_name.to_string(),
            expected: plugin.input_schema_version().to_string(),
            current: current_schema.to_string(),
        });
    }
    if !plugin.idempotent() {
        return Err(PipelineError::NotIdempotent {
            stage: stage_name.to_string(),
        });
    }
    Ok(())
}

/// Applies the plugin record by record; the error policy acts on single records.
fn run_record_stage(
    plugin: &dyn ProcessorPlugin,
    stage: &ProcessingStage,
    ctx: &ProcessContext,
    input: Vec<Record>,
    metrics: &mut StageMetrics,
    outcome: &mut ProcessingOutcome,
) -> Result<Vec<Record>, PipelineError> {
    let mut output = Vec::with_capacity(input.len());
    for record in input {
        match plugin.process_record(&record, &stage.config, ctx) {
            Ok(Some(processed)) => output.push(processed),
            Ok(None) => metrics.dropped += 1,
            Err(failure) => {
                metrics.errors += 1;
                match stage.on_error {
                    ErrorPolicy::Fail => {
                        return Err(PipelineError::StageFailed {
                            stage: ctx.stage_name.clone(),
                            source: failure,
                        })
                    }
                    ErrorPolicy::Skip => {
                        warn!(record_id = %record.id, error = %failure, "Keeping record unchanged");
                        output.push(record);
                    }
                    ErrorPolicy::Quarantine => {
                        warn!(record_id = %record.id, error = %failure, "Quarantining record");
                        outcome.quarantined += 1;
                    }
                }
            }
        }
    }
    Ok(output)
}

/// Applies the plugin once to the whole set; the error policy acts on the stage.
fn run_batch_stage(
    plugin: &dyn ProcessorPlugin,
    stage: &ProcessingStage,
    ctx: &ProcessContext,
    input: Vec<Record>,
    metrics: &mut StageMetrics,
    outcome: &mut ProcessingOutcome,
) -> Result<Vec<Record>, PipelineError> {
    match plugin.process_batch(&input, &stage.config, ctx) {
        Ok(result) => {
            if !result.artifacts.is_empty() {
                outcome
                    .artifacts
                    .insert(ctx.stage_name.clone(), Value::Object(result.artifacts));
            }
            // Analytics stages observe; their record output is ignored.
            let output = if stage.kind == StageKind::Analytics {
                input
            } else {
                result.records
            };
            metrics.dropped = metrics.records_in.saturating_sub(output.len());
            Ok(output)
        }
        Err(failure) => {
            metrics.errors += 1;
            match stage.on_error {
                ErrorPolicy::Fail => Err(PipelineError::StageFailed {
                    stage: ctx.stage_name.clone(),
                    source: failure,
                }),
                ErrorPolicy::Skip => {
                    warn!(error = %failure, "Stage failed, keeping its input unchanged");
                    Ok(input)
                }
                ErrorPolicy::Quarantine => {
                    warn!(error = %failure, records = input.len(), "Stage failed, quarantining its input");
                    outcome.quarantined += input.len();
                    Ok(Vec::new())
                }
            }
        }
    }
}
