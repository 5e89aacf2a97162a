use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fingerprint;

use super::format_utc;

/// One extracted item. `id` is derived from the source url.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub source_url: String,
    pub scraped_at_utc: DateTime<Utc>,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record for `source_url`, stamped with the current time.
    pub fn new(source_url: impl Into<String>) -> Self {
        let source_url = source_url.into();
        Self {
            id: fingerprint::record_id(&source_url),
            source_url,
            scraped_at_utc: Utc::now(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Text of a named attribute. `source_url`, `id` and `scraped_at_utc` resolve
    /// to the record's own attributes; every other name goes to the field map.
    pub fn lookup(&self, name: &str) -> Option<String> {
        match name {
            "source_url" => Some(self.source_url.clone()),
            "id" => Some(self.id.clone()),
            "scraped_at_utc" => Some(format_utc(&self.scraped_at_utc)),
            _ => self.fields.get(name).map(value_text),
        }
    }

    /// True when `name` is absent, null or whitespace only.
    pub fn is_missing(&self, name: &str) -> bool {
        self.lookup(name).map_or(true, |text| text.trim().is_empty())
    }
}

/// Plain text rendering of a field value: strings unquoted, null as empty.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn is_blank(value: &Value) -> bool {
    value_text(value).trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_record_derives_id_from_url() {
        let a = Record::new("https://example.com/item/1");
        let b = Record::new("  HTTPS://EXAMPLE.com/item/1 ");
        assert_eq!(a.id.len(), 16);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_lookup_promoted_attributes() {
        let record = Record::new("https://example.com/a").with_field("name", "Cafe");
        assert_eq!(record.lookup("source_url").as_deref(), Some("https://example.com/a"));
        assert_eq!(record.lookup("id"), Some(record.id.clone()));
        assert!(record.lookup("scraped_at_utc").unwrap().ends_with('Z'));
        assert_eq!(record.lookup("name").as_deref(), Some("Cafe"));
        assert_eq!(record.lookup("phone"), None);
    }

    #[test]
    fn test_is_missing() {
        let record = Record::new("https://example.com/a")
            .with_field("name", "  ")
            .with_field("phone", Value::Null)
            .with_field("rating", 4.5);
        assert!(record.is_missing("name"));
        assert!(record.is_missing("phone"));
        assert!(record.is_missing("website"));
        assert!(!record.is_missing("rating"));
        assert!(!record.is_missing("source_url"));
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!(null)), "");
        assert_eq!(value_text(&json!("x")), "x");
        assert_eq!(value_text(&json!(12)), "12");
        assert!(is_blank(&json!(" ")));
        assert!(!is_blank(&json!(false)));
    }
}
