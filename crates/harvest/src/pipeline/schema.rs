//! Structural checks for the record set flowing between stages.

use crate::model::{Record, SUPPORTED_SCHEMA_VERSIONS};

use super::error::PipelineError;

pub fn is_supported(version: &str) -> bool {
    SUPPORTED_SCHEMA_VERSIONS.contains(&version)
}

/// Verifies every record carries the attributes schema `version` requires.
pub fn validate_records(records: &[Record], version: &str) -> Result<(), PipelineError> {
    if !is_supported(version) {
        return Err(PipelineError::UnsupportedSchema {
            version: version.to_string(),
        });
    }

    for (idx, record) in records.iter().enumerate() {
        let missing = if record.id.trim().is_empty() {
            Some("id")
        } else if record.source_url.trim().is_empty() {
            Some("source_url")
        } else {
            None
        };
        if let Some(attr) = missing {
            return Err(PipelineError::InvalidRecords {
                version: version.to_string(),
                reason: format!("record {} has an empty {}", idx, attr),
            });
        }
    }

    Ok(())
}
