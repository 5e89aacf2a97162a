use std::path::Path;

use crate::config::schema::{JobFile, LoadedJob};
use crate::error::ConfigError;
use crate::pipeline::schema::is_supported;

const MAX_BATCH_SIZE: usize = 100_000;
const MAX_PAGES: usize = 1_000;
const MAX_DELAY_MS: u64 = 60_000;

pub fn load_job<P: AsRef<Path>>(path: P) -> Result<LoadedJob, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_job_from_str(&content)
}

/// Parses YAML (JSON is accepted too) and validates the result.
pub fn load_job_from_str(content: &str) -> Result<LoadedJob, ConfigError> {
    let file: JobFile = serde_yaml::from_str(content)?;

    validate_job_file(&file)?;

    Ok(file.into_loaded())
}

pub fn validate_job_file(file: &JobFile) -> Result<(), ConfigError> {
    let job = &file.job;

    for (label, value) in [("id", &job.id), ("name", &job.name), ("adapter", &job.adapter)] {
        if value.trim().is_empty() {
            return Err(ConfigError::validation(format!("job.{} must be non-empty", label)));
        }
    }

    let url = job.start_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::validation(format!(
            "job.start_url must start with http:// or https://, got '{}'",
            job.start_url
        )));
    }

    if !(1..=MAX_BATCH_SIZE).contains(&job.batch_size) {
        return Err(ConfigError::validation(format!(
            "job.batch_size must be between 1 and {}",
            MAX_BATCH_SIZE
        )));
    }
    if !(1..=MAX_PAGES).contains(&job.max_pages) {
        return Err(ConfigError::validation(format!(
            "job.max_pages must be between 1 and {}",
            MAX_PAGES
        )));
    }
    if job.delay_ms > MAX_DELAY_MS {
        return Err(ConfigError::validation(format!(
            "job.delay_ms must be at most {}",
            MAX_DELAY_MS
        )));
    }

    if job.required_fields.iter().all(|f| f.trim().is_empty()) {
        return Err(ConfigError::validation(
            "job.required_fields must name at least one field",
        ));
    }

    if file.enrich.enabled {
        if file.enrich.fields.is_empty() {
            return Err(ConfigError::validation(
                "enrich.fields must be non-empty when enrichment is enabled",
            ));
        }
        let unknown: Vec<&str> = file
            .enrich
            .fields
            .iter()
            .filter(|f| !job.field_schema.contains(*f))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(ConfigError::validation(format!(
                "enrich.fields not in job.field_schema: {}",
                unknown.join(", ")
            )));
        }
    }

    let processing = &file.processing;
    if !is_supported(&processing.schema_version) {
        return Err(ConfigError::validation(format!(
            "processing.schema_version '{}' is not supported",
            processing.schema_version
        )));
    }
    if processing.enabled && processing.stages.is_empty() {
        return Err(ConfigError::validation(
            "processing.stages must be non-empty when processing is enabled",
        ));
    }
    if let Some(pos) = processing.stages.iter().position(|s| s.plugin.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "processing.stages[{}].plugin must be non-empty",
            pos
        )));
    }

    let incremental = &file.incremental;
    if incremental.backend.trim().to_ascii_lowercase() != "sqlite" {
        return Err(ConfigError::UnknownBackend(incremental.backend.clone()));
    }
    if incremental.checkpoint_every_pages == 0 {
        return Err(ConfigError::validation(
            "incremental.checkpoint_every_pages must be at least 1",
        ));
    }
    if incremental.full_refresh_every_runs == Some(0) {
        return Err(ConfigError::validation(
            "incremental.full_refresh_every_runs must be at least 1 when set",
        ));
    }

    Ok(())
}
