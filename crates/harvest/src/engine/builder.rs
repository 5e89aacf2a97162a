use crate::adapter::SiteAdapter;
use crate::enrich::Enricher;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::model::Job;
use crate::parse::PageParser;
use crate::pipeline::ProcessingRunner;
use crate::sink::Sink;
use crate::state::{open_state_store, IncrementalStateStore};
use crate::transform::{
    strategy_for, DedupeStrategy, DefaultNormalizer, Normalizer, RequiredFieldsValidator,
    UrlDedupe, Validator,
};

use super::ScrapeEngine;

/// Assembles a [`ScrapeEngine`]. Only the fetcher, parser, adapter and sink
/// are mandatory; everything else has a default.
pub struct EngineBuilder<A: SiteAdapter> {
    fetcher: Box<dyn Fetcher>,
    parser: Box<dyn PageParser<A>>,
    adapter: A,
    sink: Box<dyn Sink>,
    normalizer: Box<dyn Normalizer>,
    validator: Box<dyn Validator>,
    deduper: Box<dyn DedupeStrategy>,
    enricher: Option<Box<dyn Enricher<A>>>,
    runner: ProcessingRunner,
    state: Option<Box<dyn IncrementalStateStore>>,
}

impl<A: SiteAdapter> EngineBuilder<A> {
    pub fn new(
        fetcher: Box<dyn Fetcher>,
        parser: Box<dyn PageParser<A>>,
        adapter: A,
        sink: Box<dyn Sink>,
    ) -> Self {
        Self {
            fetcher,
            parser,
            adapter,
            sink,
            normalizer: Box::new(DefaultNormalizer),
            validator: Box::new(RequiredFieldsValidator),
            deduper: Box::new(UrlDedupe),
            enricher: None,
            runner: ProcessingRunner::default(),
            state: None,
        }
    }

    pub fn normalizer(mut self, normalizer: Box<dyn Normalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn deduper(mut self, deduper: Box<dyn DedupeStrategy>) -> Self {
        self.deduper = deduper;
        self
    }

    pub fn enricher(mut self, enricher: Box<dyn Enricher<A>>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn processing_runner(mut self, runner: ProcessingRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn state_store(mut self, store: Box<dyn IncrementalStateStore>) -> Self {
        self.state = Some(store);
        self
    }

    /// Picks the dedupe strategy from `job.dedupe_mode` and, when incremental
    /// tracking is on and no store was supplied, opens the configured backend.
    pub fn configure_for(mut self, job: &Job) -> Result<Self> {
        self.deduper = strategy_for(job.dedupe_mode);
        if job.incremental.enabled && self.state.is_none() {
            self.state = Some(open_state_store(&job.incremental)?);
        }
        Ok(self)
    }

    pub fn build(self) -> ScrapeEngine<A> {
        ScrapeEngine {
            fetcher: self.fetcher,
            parser: self.parser,
            adapter: self.adapter,
            normalizer: self.normalizer,
            validator: self.validator,
            deduper: self.deduper,
            sink: self.sink,
            enricher: self.enricher,
            runner: self.runner,
            state: self.state,
        }
    }
}
