//! Site adapter contract: how one site's pages map to records.

use serde_json::Value;

use crate::error::ExtractError;
use crate::model::{Page, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterMode {
    StaticHtml,
    JsonApi,
    Dynamic,
}

pub trait SiteAdapter {
    /// One listing entry as produced by the page parser.
    type Card;

    fn key(&self) -> &str;

    fn mode(&self) -> AdapterMode;

    fn card_locator(&self) -> &str;

    fn field_locator(&self, field: &str) -> Option<&str>;

    fn extract_source_url(&self, card: &Self::Card, page: &Page) -> Option<String>;

    fn extract_field(&self, card: &Self::Card, field: &str, page: &Page) -> Result<Value, ExtractError>;

    fn next_request(&self, page: &Page, current: &Request) -> Option<Request>;
}
