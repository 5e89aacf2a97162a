//! Stable short hashes over normalized text.
//!
//! Used for record ids, hash-based dedupe keys and change detection.
//! Normalization makes cosmetic differences (case, whitespace runs, line
//! endings, compatibility code points) hash to the same key.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

use crate::model::Record;

/// Hex characters kept from the SHA-256 digest.
pub const HASH_LEN: usize = 16;

/// NFKC, unified line endings, trimmed, whitespace runs collapsed, lowercased.
pub fn normalize_text(text: &str) -> String {
    let nfkc: String = text.nfkc().collect();
    let unified = nfkc.replace("\r\n", "\n").replace('\r', "\n");
    unified
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// First [`HASH_LEN`] hex characters of the SHA-256 of `text`.
pub fn stable_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(HASH_LEN);
    digest
}

pub fn record_id(source_url: &str) -> String {
    stable_hash(&normalize_text(source_url))
}

#[derive(Serialize)]
struct HashBasis<'a> {
    fields: &'a BTreeMap<String, Value>,
    source_url: &'a str,
}

/// Change-detection hash over the record's url and fields.
///
/// Keys are serialized in sorted order, so field insertion order never
/// changes the result. `id` and the scrape timestamp are excluded.
pub fn content_hash(record: &Record) -> String {
    let basis = HashBasis {
        fields: &record.fields,
        source_url: &record.source_url,
    };
    // Maps of strings to JSON values always serialize.
    let json = serde_json::to_string(&basis).unwrap_or_default();
    stable_hash(&normalize_text(&json))
}
