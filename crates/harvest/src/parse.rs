//! Page parsing contract.

use crate::adapter::SiteAdapter;
use crate::error::ParseError;
use crate::model::{Page, Request};

pub trait PageParser<A: SiteAdapter> {
    fn parse_cards(&self, page: &Page, adapter: &A) -> Result<Vec<A::Card>, ParseError>;

    /// Defaults to the adapter's own pagination rule.
    fn next_request(&self, page: &Page, adapter: &A, current: &Request) -> Option<Request> {
        adapter.next_request(page, current)
    }
}
