use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("State error: {0}")]
    State(#[from] crate::state::StateError),

    #[error("Processing error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read job file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse job file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Job validation failed: {message}")]
    Validation { message: String },

    #[error("Unsupported incremental backend: {0}")]
    UnknownBackend(String),
}

impl ConfigError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to '{url}' failed: {message}")]
    Transport { url: String, message: String },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed page '{url}': {message}")]
    Malformed { url: String, message: String },
}

/// Per-card extraction failure. Never fatal to a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("card has no source url")]
    MissingSourceUrl,

    #[error("failed to extract field '{field}': {message}")]
    Field { field: String, message: String },
}

impl ExtractError {
    /// Key under which this failure is counted in the run report.
    pub fn reason(&self) -> String {
        match self {
            Self::MissingSourceUrl => "extract_failed".to_string(),
            Self::Field { field, .. } => format!("field_error:{}", field),
        }
    }
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HarvestError>;
