use thiserror::Error;

use crate::model::StageKind;

use super::plugin::StageFailure;

/// Errors that abort a processing run.
///
/// Everything except [`PipelineError::StageFailed`] is a contract or
/// configuration problem and is fatal whatever the stage's error policy.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Unknown processing plugin '{name}' (registered: {known})")]
    UnknownPlugin { name: String, known: String },

    #[error("Plugin name must be non-empty")]
    EmptyPluginName,

    #[error("Stage '{stage}' is configured as {configured} but the plugin is {plugin}")]
    KindMismatch {
        stage: String,
        configured: StageKind,
        plugin: StageKind,
    },

    #[error("Stage '{stage}' expects schema {expected} but records are at {current}")]
    SchemaMismatch {
        stage: String,
        expected: String,
        current: String,
    },

    #[error("Stage '{stage}' uses a plugin that is not idempotent")]
    NotIdempotent { stage: String },

    #[error("Unsupported record schema version: {version}")]
    UnsupportedSchema { version: String },

    #[error("Records do not match schema {version}: {reason}")]
    InvalidRecords { version: String, reason: String },

    #[error("Stage '{stage}' failed: {source}")]
    StageFailed {
        stage: String,
        #[source]
        source: StageFailure,
    },
}
