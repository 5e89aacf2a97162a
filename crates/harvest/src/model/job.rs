use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::state::StateError;

use super::Request;

/// Record schema versions the processing stages understand.
pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["1.0"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Memory,
    Stream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DedupeMode {
    #[default]
    BySourceUrl,
    ByHash,
}

/// Which records an incremental run hands to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncrementalMode {
    All,
    NewOnly,
    #[default]
    ChangedOnly,
}

impl IncrementalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::NewOnly => "new_only",
            Self::ChangedOnly => "changed_only",
        }
    }
}

impl fmt::Display for IncrementalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncrementalMode {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "new_only" => Ok(Self::NewOnly),
            "changed_only" => Ok(Self::ChangedOnly),
            other => Err(StateError::InvalidArgument(format!(
                "unsupported incremental mode: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    #[default]
    Record,
    Batch,
    Analytics,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Batch => "batch",
            Self::Analytics => "analytics",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    #[default]
    Fail,
    Skip,
    Quarantine,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub fields: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStage {
    pub plugin: String,
    #[serde(rename = "type", default)]
    pub kind: StageKind,
    #[serde(default)]
    pub on_error: ErrorPolicy,
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl ProcessingStage {
    pub fn new(plugin: impl Into<String>, kind: StageKind) -> Self {
        Self {
            plugin: plugin.into(),
            kind,
            on_error: ErrorPolicy::Fail,
            config: Map::new(),
        }
    }

    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default)]
    pub stages: Vec<ProcessingStage>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            schema_version: default_schema_version(),
            stages: Vec::new(),
        }
    }
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncrementalConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
    #[serde(default)]
    pub mode: IncrementalMode,
    #[serde(default = "default_true")]
    pub resume: bool,
    #[serde(default = "default_checkpoint_every_pages")]
    pub checkpoint_every_pages: usize,
    #[serde(default)]
    pub full_refresh_every_runs: Option<u64>,
}

impl Default for IncrementalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backend: default_backend(),
            state_path: default_state_path(),
            mode: IncrementalMode::default(),
            resume: true,
            checkpoint_every_pages: default_checkpoint_every_pages(),
            full_refresh_every_runs: None,
        }
    }
}

impl IncrementalConfig {
    /// Whether run number `run_count` ignores stored hashes and emits everything.
    pub fn is_full_refresh(&self, run_count: u64) -> bool {
        match self.full_refresh_every_runs {
            Some(every) if every > 0 => run_count > 0 && run_count % every == 0,
            _ => false,
        }
    }
}

fn default_backend() -> String {
    "sqlite".to_string()
}

fn default_state_path() -> PathBuf {
    PathBuf::from("output/state.db")
}

fn default_true() -> bool {
    true
}

fn default_checkpoint_every_pages() -> usize {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    #[default]
    Overwrite,
    Append,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkConfig {
    Csv {
        path: PathBuf,
        #[serde(default)]
        write_mode: WriteMode,
    },
    Jsonl {
        path: PathBuf,
        #[serde(default)]
        write_mode: WriteMode,
    },
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self::Csv {
            path: PathBuf::from("output/records.csv"),
            write_mode: WriteMode::Overwrite,
        }
    }
}

/// Everything one run needs to know. Built once, read-only while running.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: String,
    pub name: String,
    pub start: Request,
    pub execution_mode: ExecutionMode,
    pub batch_size: usize,
    pub max_pages: usize,
    pub delay_ms: u64,
    pub required_fields: BTreeSet<String>,
    pub dedupe_mode: DedupeMode,
    /// Declared fields, in output column order.
    pub field_schema: Vec<String>,
    pub enrich: EnrichConfig,
    pub processing: ProcessingConfig,
    pub incremental: IncrementalConfig,
    pub sink: SinkConfig,
}

impl Job {
    pub fn new(id: impl Into<String>, name: impl Into<String>, start: Request) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start,
            execution_mode: ExecutionMode::Memory,
            batch_size: 500,
            max_pages: 5,
            delay_ms: 800,
            required_fields: ["name", "source_url"].iter().map(|s| s.to_string()).collect(),
            dedupe_mode: DedupeMode::BySourceUrl,
            field_schema: Vec::new(),
            enrich: EnrichConfig::default(),
            processing: ProcessingConfig::default(),
            incremental: IncrementalConfig::default(),
            sink: SinkConfig::default(),
        }
    }
}
