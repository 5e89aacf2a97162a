use crate::model::{Record, StageKind};
use crate::pipeline::plugin::{ProcessContext, ProcessorPlugin, StageConfig, StageFailure};

/// Drops records whose configured `field` is missing or blank.
///
/// Config: `field` (string, required).
#[derive(Debug, Default, Clone, Copy)]
pub struct DropIfFieldEmpty;

impl ProcessorPlugin for DropIfFieldEmpty {
    fn name(&self) -> &str {
        "drop_if_field_empty"
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::Record
    }

    fn idempotent(&self) -> bool {
        true
    }

    fn process_record(
        &self,
        record: &Record,
        config: &StageConfig,
        _ctx: &ProcessContext,
    ) -> Result<Option<Record>, StageFailure> {
        let field = config
            .get("field")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| StageFailure::new("drop_if_field_empty requires config.field"))?;

        if record.is_missing(field) {
            return Ok(None);
        }
        Ok(Some(record.clone()))
    }
}
