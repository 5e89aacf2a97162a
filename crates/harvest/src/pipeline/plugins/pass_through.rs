use crate::model::{Record, StageKind};
use crate::pipeline::plugin::{BatchOutput, ProcessContext, ProcessorPlugin, StageConfig, StageFailure};

/// Batch stage that hands the records on untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl ProcessorPlugin for PassThrough {
    fn name(&self) -> &str {
        "pass_through"
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::Batch
    }

    fn idempotent(&self) -> bool {
        true
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
