//! Built-in processing plugins.

mod drop_if_field_empty;
mod field_coverage;
mod pass_through;

pub use drop_if_field_empty::DropIfFieldEmpty;
pub use field_coverage::FieldCoverageAnalytics;
pub use pass_through::PassThrough;

#[cfg(test)]
pub(crate) fn test_context() -> super::ProcessContext {
    super::ProcessContext {
        job_id: "job".to_string(),
        job_name: "Job".to_string(),
        stage_name: "1:test".to_string(),
        stage_index: 1,
        run_started_utc: chrono::Utc::now(),
    }
}
