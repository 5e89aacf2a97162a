use std::collections::HashSet;

use crate::fingerprint::{normalize_text, stable_hash};
use crate::model::{DedupeMode, Record};

/// Field used for hash keys when a record has no source url.
const HASH_FALLBACK_FIELD: &str = "name";

/// Stateless duplicate removal within one batch.
///
/// An empty key marks a record as unkeyable; such records are always kept.
pub trait DedupeStrategy {
    fn key(&self, record: &Record) -> String;

    /// Keeps the first occurrence of every key, preserving input order.
    fn dedupe(&self, records: Vec<Record>) -> Vec<Record> {
        let mut seen = HashSet::new();
        records
            .into_iter()
            .filter(|record| {
                let key = self.key(record);
                key.is_empty() || seen.insert(key)
            })
            .collect()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UrlDedupe;

impl DedupeStrategy for UrlDedupe {
    fn key(&self, record: &Record) -> String {
        record.source_url.trim().to_string()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HashDedupe;

impl DedupeStrategy for HashDedupe {
    fn key(&self, record: &Record) -> String {
        let basis = if record.source_url.trim().is_empty() {
            record
                .lookup(HASH_FALLBACK_FIELD)
                .unwrap_or_default()
        } else {
            record.source_url.clone()
        };
        let normalized = normalize_text(&basis);
        if normalized.is_empty() {
            return String::new();
        }
        stable_hash(&normalized)
    }
}

pub fn strategy_for(mode: DedupeMode) -> Box<dyn DedupeStrategy> {
    match mode {
        DedupeMode::BySourceUrl => Box::new(UrlDedupe),
        DedupeMode::ByHash => Box::new(HashDedupe),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(url: &str, name: &str) -> Record {
        Record::new(url).with_field("name", name)
    }

    fn names(records: &[Record]) -> Vec<String> {
        records.iter().map(|r| r.lookup("name").unwrap()).collect()
    }

    #[test]
    fn test_url_dedupe_first_occurrence_wins() {
        let input = vec![
            rec("https://a.test/1", "first"),
            rec("https://a.test/2", "second"),
            rec(" https://a.test/1 ", "dup"),
            rec("https://a.test/3", "third"),
        ];
        let out = UrlDedupe.dedupe(input);
        assert_eq!(names(&out), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let input = vec![
            rec("https://a.test/1", "a"),
            rec("https://a.test/1", "b"),
            rec("https://a.test/2", "c"),
            rec("https://a.test/2", "d"),
        ];
        for strategy in [strategy_for(DedupeMode::BySourceUrl), strategy_for(DedupeMode::ByHash)] {
            let once = strategy.dedupe(input.clone());
            let twice = strategy.dedupe(once.clone());
            assert_eq!(once, twice);
            assert_eq!(names(&once), vec!["a", "c"]);
        }
    }

    #[test]
    fn test_hash_key_normalizes_url() {
        let a = HashDedupe.key(&rec("https://A.test/1", "x"));
        let b = HashDedupe.key(&rec("  https://a.test/1", "y"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn test_hash_key_falls_back_to_name() {
        let mut a = rec("https://a.test/1", "Blue Cafe");
        a.source_url = String::new();
        let mut b = rec("https://a.test/2", "blue  cafe");
        b.source_url = " ".to_string();
        assert_eq!(HashDedupe.key(&a), HashDedupe.key(&b));
        assert!(!HashDedupe.key(&a).is_empty());
    }

    #[test]
    fn test_unkeyable_records_are_kept() {
        let mut a = rec("x", "");
        a.source_url = String::new();
        let b = a.clone();
        assert_eq!(HashDedupe.key(&a), "");
        assert_eq!(HashDedupe.dedupe(vec![a, b]).len(), 2);
    }
}
