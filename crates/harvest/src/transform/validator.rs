use std::collections::BTreeSet;

use crate::model::Record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub ok: bool,
    pub reason: String,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            ok: true,
            reason: String::new(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: reason.into(),
        }
    }
}

pub trait Validator {
    fn validate(&self, record: &Record, required_fields: &BTreeSet<String>) -> ValidationResult;
}

/// Rejects records missing any required field, reporting `missing_<field>`
/// for the first gap in sorted field order.
///
/// `source_url`, `id` and `scraped_at_utc` are checked against the record's
/// own attributes rather than its field map.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequiredFieldsValidator;

impl Validator for RequiredFieldsValidator {
    fn validate(&self, record: &Record, required_fields: &BTreeSet<String>) -> ValidationResult {
        match required_fields.iter().find(|f| record.is_missing(f)) {
            Some(field) => ValidationResult::rejected(format!("missing_{}", field)),
            None => ValidationResult::ok(),
        }
    }
}
