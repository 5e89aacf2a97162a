//! Core value types shared by the engine, the state store and the
//! processing stages.

mod job;
mod record;
mod report;
mod request;

pub use job::{
    DedupeMode, EnrichConfig, ErrorPolicy, ExecutionMode, IncrementalConfig, IncrementalMode, Job,
    ProcessingConfig, ProcessingStage, SinkConfig, StageKind, WriteMode, SUPPORTED_SCHEMA_VERSIONS,
};
pub use record::{is_blank, value_text, Record};
pub(crate) use report::round_ms;
pub use report::{Report, StageMetrics};
pub use request::{Page, PageBody, Request};

use chrono::{DateTime, SecondsFormat, Utc};

/// Formats a UTC instant the way every persisted and exported timestamp is written.
pub fn format_utc(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
