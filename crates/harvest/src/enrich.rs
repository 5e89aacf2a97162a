//! Enrichment contract: filling gaps in a record, typically from its detail page.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::adapter::SiteAdapter;
use crate::model::{is_blank, Record};

pub trait Enricher<A: SiteAdapter> {
    fn should_enrich(&self, record: &Record) -> bool;

    /// Must only fill fields that are currently empty.
    fn enrich(&mut self, record: Record, adapter: &A) -> Record;
}

/// Enrichable fields the record has no value for, in sorted order.
pub fn missing_fields<'a>(record: &Record, fields: &'a BTreeSet<String>) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|f| record.is_missing(f))
        .map(String::as_str)
        .collect()
}

/// Copies non-blank `values` into fields that are empty on `record`.
/// Populated fields are never overwritten.
pub fn fill_missing<I>(mut record: Record, values: I) -> Record
where
    I: IntoIterator<Item = (String, Value)>,
{
    for (field, value) in values {
        if is_blank(&value) {
            continue;
        }
        let slot = record.fields.entry(field).or_insert(Value::Null);
        if is_blank(slot) {
            *slot = value;
        }
    }
    record
}
