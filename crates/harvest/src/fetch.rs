//! Page fetching contract.

use crate::error::FetchError;
use crate::model::{Page, Request};

/// Turns a request into a page. Retries and backoff, if any, live here;
/// the engine treats every error as fatal for the run.
pub trait Fetcher {
    fn fetch(&mut self, request: &Request) -> Result<Page, FetchError>;

    /// Releases held resources (browser sessions, pools). Called once per
    /// run whatever the outcome.
    fn close(&mut self) {}
}
