//! Test harness for isolated scrape runs.
//!
//! The `TestHarness` struct wires a `ScrapeEngine` to an in-process site:
//! - a scripted fetcher serving JSON listing pages linked by `next`
//! - a recording sink that keeps every write call
//! - a temp directory for state databases and output files

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::{json, Value};
use tempfile::TempDir;

use harvest::adapter::{AdapterMode, SiteAdapter};
use harvest::enrich::{fill_missing, missing_fields, Enricher};
use harvest::error::{ExtractError, FetchError, ParseError, SinkError};
use harvest::{
    EngineBuilder, Fetcher, Job, Page, PageBody, PageParser, Record, Report, Request,
    ScrapeEngine, Sink,
};

pub const START_URL: &str = "https://listings.test/cafes";

/// Url of listing page `number`, counting from 1.
pub fn page_url(number: usize) -> String {
    if number == 1 {
        START_URL.to_string()
    } else {
        format!("{}?page={}", START_URL, number)
    }
}

/// A scripted listing site: numbered pages of JSON cards linked by `next`.
#[derive(Debug, Clone, Default)]
pub struct Site {
    pages: BTreeMap<String, Value>,
    failing: BTreeSet<String>,
}

impl Site {
    pub fn paged(pages: Vec<Vec<Value>>) -> Self {
        let total = pages.len();
        let mut site = Self::default();
        for (offset, cards) in pages.into_iter().enumerate() {
            let number = offset + 1;
            let next = if number < total {
                Value::from(page_url(number + 1))
            } else {
                Value::Null
            };
            site.pages
                .insert(page_url(number), json!({ "cards": cards, "next": next }));
        }
        site
    }

    /// Fetching page `number` fails with a transport error.
    pub fn failing_at(mut self, number: usize) -> Self {
        self.failing.insert(page_url(number));
        self
    }
}

#[derive(Debug, Default)]
pub struct FetchLog {
    pub urls: Vec<String>,
    pub closed: bool,
}

struct ScriptedFetcher {
    site: Site,
    log: Rc<RefCell<FetchLog>>,
}

impl Fetcher for ScriptedFetcher {
    fn fetch(&mut self, request: &Request) -> Result<Page, FetchError> {
        self.log.borrow_mut().urls.push(request.url.clone());
        if self.site.failing.contains(&request.url) {
            return Err(FetchError::Transport {
                url: request.url.clone(),
                message: "connection reset".to_string(),
            });
        }
        let body = self
            .site
            .pages
            .get(&request.url)
            .cloned()
            .ok_or_else(|| FetchError::Transport {
                url: request.url.clone(),
                message: "404 not found".to_string(),
            })?;
        Ok(Page {
            url: request.url.clone(),
            status_code: 200,
            content_type: "application/json".to_string(),
            raw: PageBody::Json(body),
        })
    }

    fn close(&mut self) {
        self.log.borrow_mut().closed = true;
    }
}

/// Cards are JSON objects. `url` is the source url; a card whose `broken`
/// entry names a field fails to extract that field.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListingAdapter;

impl SiteAdapter for ListingAdapter {
    type Card = Value;

    fn key(&self) -> &str {
        "test_listing"
    }

    fn mode(&self) -> AdapterMode {
        AdapterMode::JsonApi
    }

    fn card_locator(&self) -> &str {
        "cards"
    }

    fn field_locator(&self, _field: &str) -> Option<&str> {
        None
    }

    fn extract_source_url(&self, card: &Value, _page: &Page) -> Option<String> {
        card.get("url").and_then(Value::as_str).map(String::from)
    }

    fn extract_field(&self, card: &Value, field: &str, _page: &Page) -> Result<Value, ExtractError> {
        if card.get("broken").and_then(Value::as_str) == Some(field) {
            return Err(ExtractError::Field {
                field: field.to_string(),
                message: "selector matched nothing".to_string(),
            });
        }
        Ok(card.get(field).cloned().unwrap_or(Value::Null))
    }

    fn next_request(&self, page: &Page, _current: &Request) -> Option<Request> {
        match &page.raw {
            PageBody::Json(body) => body
                .get("next")
                .and_then(Value::as_str)
                .map(Request::get),
            PageBody::Text(_) => None,
        }
    }
}

struct JsonCardParser;

impl PageParser<ListingAdapter> for JsonCardParser {
    fn parse_cards(&self, page: &Page, adapter: &ListingAdapter) -> Result<Vec<Value>, ParseError> {
        match &page.raw {
            PageBody::Json(body) => Ok(body
                .get(adapter.card_locator())
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default()),
            PageBody::Text(_) => Err(ParseError::Malformed {
                url: page.url.clone(),
                message: "expected a JSON body".to_string(),
            }),
        }
    }
}

struct RecordingSink {
    writes: Rc<RefCell<Vec<Vec<Record>>>>,
}

impl Sink for RecordingSink {
    fn write(&mut self, _job: &Job, records: &[Record]) -> Result<(), SinkError> {
        self.writes.borrow_mut().push(records.to_vec());
        Ok(())
    }
}

/// Fills gaps from a fixed lookup, the way a detail page would.
pub struct LookupEnricher {
    fields: BTreeSet<String>,
    values: Vec<(String, Value)>,
}

impl LookupEnricher {
    pub fn new(fields: &[&str], values: &[(&str, Value)]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }
}

impl Enricher<ListingAdapter> for LookupEnricher {
    fn should_enrich(&self, record: &Record) -> bool {
        !missing_fields(record, &self.fields).is_empty()
    }

    fn enrich(&mut self, record: Record, _adapter: &ListingAdapter) -> Record {
        fill_missing(record, self.values.clone())
    }
}

/// Isolated environment for integration tests.
pub struct TestHarness {
    temp_dir: TempDir,
    writes: Rc<RefCell<Vec<Vec<Record>>>>,
    fetch_log: Rc<RefCell<FetchLog>>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            writes: Rc::new(RefCell::new(Vec::new())),
            fetch_log: Rc::new(RefCell::new(FetchLog::default())),
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Location for the incremental state database. The parent does not exist yet.
    pub fn state_path(&self) -> PathBuf {
        self.temp_dir.path().join("state").join("harvest.db")
    }

    /// Engine builder wired to `site` and the recording sink.
    pub fn builder(&self, site: &Site) -> EngineBuilder<ListingAdapter> {
        let sink = RecordingSink {
            writes: Rc::clone(&self.writes),
        };
        self.builder_with_sink(site, Box::new(sink))
    }

    /// Engine builder wired to `site` and a caller-supplied sink.
    pub fn builder_with_sink(&self, site: &Site, sink: Box<dyn Sink>) -> EngineBuilder<ListingAdapter> {
        let fetcher = ScriptedFetcher {
            site: site.clone(),
            log: Rc::clone(&self.fetch_log),
        };
        ScrapeEngine::builder(Box::new(fetcher), Box::new(JsonCardParser), ListingAdapter, sink)
    }

    /// Builds an engine configured for `job` and runs it once.
    pub fn run(&self, site: &Site, job: &Job) -> harvest::Result<Report> {
        let mut engine = self.builder(site).configure_for(job)?.build();
        engine.run(job)
    }

    pub fn writes(&self) -> Vec<Vec<Record>> {
        self.writes.borrow().clone()
    }

    pub fn write_sizes(&self) -> Vec<usize> {
        self.writes.borrow().iter().map(Vec::len).collect()
    }

    pub fn written(&self) -> Vec<Record> {
        self.writes.borrow().iter().flatten().cloned().collect()
    }

    pub fn written_urls(&self) -> Vec<String> {
        self.written().into_iter().map(|r| r.source_url).collect()
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetch_log.borrow().urls.clone()
    }

    pub fn fetcher_closed(&self) -> bool {
        self.fetch_log.borrow().closed
    }

    /// Forgets recorded writes and fetches before the next run.
    pub fn reset(&self) {
        self.writes.borrow_mut().clear();
        *self.fetch_log.borrow_mut() = FetchLog::default();
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
