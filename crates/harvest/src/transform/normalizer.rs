use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Number, Value};

use crate::model::{value_text, Record};

pub trait Normalizer {
    fn normalize(&self, record: Record) -> Record;
}

/// Cleans the common listing fields when present: `rating`, `reviews`, `website`.
///
/// Values that cannot be parsed become null.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultNormalizer;

const STAR: char = '★';

static RE_DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").unwrap());
static RE_INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").unwrap());

impl DefaultNormalizer {
    pub fn parse_number(raw: &Value) -> Option<f64> {
        if raw.is_null() {
            return None;
        }
        let text = value_text(raw).trim().replace(',', ".");
        RE_DECIMAL
            .captures(&text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    pub fn parse_int(raw: &Value) -> Option<i64> {
        if raw.is_null() {
            return None;
        }
        let text = value_text(raw).trim().replace(',', "");
        RE_INTEGER
            .captures(&text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    pub fn parse_rating(raw: &Value) -> Option<f64> {
        if raw.is_null() {
            return None;
        }
        let text = value_text(raw);
        let stars = text.chars().filter(|c| *c == STAR).count();
        if stars > 0 {
            return Some(stars as f64);
        }
        Self::parse_number(raw)
    }

    pub fn clean_url(raw: &Value) -> Option<String> {
        if raw.is_null() {
            return None;
        }
        Some(value_text(raw).trim().to_string())
    }
}

fn float_value(v: Option<f64>) -> Value {
    v.and_then(Number::from_f64).map_or(Value::Null, Value::Number)
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, mut record: Record) -> Record {
        if let Some(raw) = record.fields.get_mut("rating") {
            *raw = float_value(Self::parse_rating(raw));
        }
        if let Some(raw) = record.fields.get_mut("reviews") {
            *raw = Self::parse_int(raw).map_or(Value::Null, Value::from);
        }
        if let Some(raw) = record.fields.get_mut("website") {
            *raw = Self::clean_url(raw).map_or(Value::Null, Value::from);
        }
        record
    }
}
