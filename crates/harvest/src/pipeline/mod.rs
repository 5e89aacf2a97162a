//! Post-extraction processing: ordered, typed, schema-versioned stages.

pub mod error;
pub mod plugin;
pub mod plugins;
pub mod registry;
pub mod runner;
pub mod schema;

pub use error::PipelineError;
pub use plugin::{BatchOutput, ProcessContext, ProcessorPlugin, StageConfig, StageFailure};
pub use registry::PluginRegistry;
pub use runner::{ProcessingOutcome, ProcessingRunner};
