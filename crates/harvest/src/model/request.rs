use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_method() -> String {
    "GET".to_string()
}

/// A single page request. Immutable once built; the next page is always a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
    #[serde(default)]
    pub body: Option<Value>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            headers: BTreeMap::new(),
            params: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Body of a fetched page, as handed over by the fetch collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum PageBody {
    Text(String),
    Json(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub url: String,
    pub status_code: u16,
    pub content_type: String,
    pub raw: PageBody,
}
