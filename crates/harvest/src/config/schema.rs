use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{
    DedupeMode, EnrichConfig, ExecutionMode, IncrementalConfig, Job, ProcessingConfig, Request,
    SinkConfig,
};

/// On-disk job definition (YAML or JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFile {
    pub job: JobSection,
    #[serde(default)]
    pub enrich: EnrichConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub incremental: IncrementalConfig,
    #[serde(default)]
    pub sink: SinkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSection {
    pub id: String,
    pub name: String,
    /// Key of the site adapter the caller wires in.
    pub adapter: String,
    pub start_url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub execution_mode: ExecutionMode,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default)]
    pub dedupe_mode: DedupeMode,
    #[serde(default = "default_required_fields")]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub field_schema: Vec<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_batch_size() -> usize {
    500
}

fn default_max_pages() -> usize {
    5
}

fn default_delay_ms() -> u64 {
    800
}

fn default_required_fields() -> Vec<String> {
    vec!["name".to_string(), "source_url".to_string()]
}

/// A validated job plus the adapter key it asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedJob {
    pub job: Job,
    pub adapter: String,
}

impl JobFile {
    pub fn into_loaded(self) -> LoadedJob {
        let section = self.job;
        let required_fields: BTreeSet<String> = section
            .required_fields
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(String::from)
            .collect();

        let job = Job {
            id: section.id,
            name: section.name,
            start: Request {
                url: section.start_url,
                method: section.method.to_ascii_uppercase(),
                headers: section.headers,
                params: section.params,
                body: section.body,
            },
            execution_mode: section.execution_mode,
            batch_size: section.batch_size,
            max_pages: section.max_pages,
            delay_ms: section.delay_ms,
            required_fields,
            dedupe_mode: section.dedupe_mode,
            field_schema: section.field_schema,
            enrich: self.enrich,
            processing: self.processing,
            incremental: self.incremental,
            sink: self.sink,
        };

        LoadedJob {
            job,
            adapter: section.adapter,
        }
    }
}
