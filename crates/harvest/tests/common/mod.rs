//! Shared test utilities for harvest integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated runs against a scripted site in a temp directory
//! - `JobBuilder` and card helpers for describing jobs and listings in code

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{Site, TestHarness};
