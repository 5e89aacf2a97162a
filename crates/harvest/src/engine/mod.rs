//! The scrape loop: fetch, extract, validate, then dedupe, process,
//! filter incrementally and write, for a whole run or per stream chunk.

mod builder;
mod context;
mod extract;
mod flush;
mod rate_limit;

pub use builder::EngineBuilder;
pub use context::{resolve_execution, Execution};
pub use rate_limit::RateLimiter;

use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::adapter::SiteAdapter;
use crate::enrich::Enricher;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::model::{Job, Report};
use crate::parse::PageParser;
use crate::pipeline::ProcessingRunner;
use crate::sink::Sink;
use crate::state::{IncrementalStateStore, STATUS_IN_PROGRESS};
use crate::transform::{DedupeStrategy, Normalizer, Validator};

use self::context::RunContext;

/// Runs scrape jobs against one site adapter and its collaborators.
pub struct ScrapeEngine<A: SiteAdapter> {
    fetcher: Box<dyn Fetcher>,
    parser: Box<dyn PageParser<A>>,
    adapter: A,
    normalizer: Box<dyn Normalizer>,
    validator: Box<dyn Validator>,
    deduper: Box<dyn DedupeStrategy>,
    sink: Box<dyn Sink>,
    enricher: Option<Box<dyn Enricher<A>>>,
    runner: ProcessingRunner,
    state: Option<Box<dyn IncrementalStateStore>>,
}

impl<A: SiteAdapter> ScrapeEngine<A> {
    pub fn builder(
        fetcher: Box<dyn Fetcher>,
        parser: Box<dyn PageParser<A>>,
        adapter: A,
        sink: Box<dyn Sink>,
    ) -> EngineBuilder<A> {
        EngineBuilder::new(fetcher, parser, adapter, sink)
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Executes one run of `job`.
    ///
    /// Cleanup always happens: the fetcher is closed and, with incremental
    /// tracking, the run is either marked completed or checkpointed for
    /// resume. Failures while syncing that state are logged, never returned.
    pub fn run(&mut self, job: &Job) -> Result<Report> {
        let run_id = Uuid::new_v4();
        let _span = info_span!("scrape_run", job_id = %job.id, run_id = %run_id).entered();
        info!(start_url = %job.start.url, mode = ?job.execution_mode, "Run started");

        let mut ctx = RunContext::new(job);
        let result = self.drive(job, &mut ctx);
        self.finish(job, &ctx, result.is_ok());

        match result {
            Ok(()) => {
                let report = ctx.report;
                info!(
                    pages = report.pages_fetched,
                    cards = report.cards_found,
                    emitted = report.records_emitted,
                    skipped = report.records_skipped,
                    skipped_incremental = report.records_skipped_incremental,
                    quarantined = report.records_quarantined,
                    "Run completed"
                );
                Ok(report)
            }
            Err(e) => {
                error!(error = %e, pages = ctx.pages, "Run failed");
                Err(e)
            }
        }
    }

    fn drive(&mut self, job: &Job, ctx: &mut RunContext) -> Result<()> {
        let execution = resolve_execution(job)?;

        ctx.incremental = job.incremental.enabled && self.state.is_some();
        ctx.resume = ctx.incremental && job.incremental.resume;
        if ctx.incremental {
            self.begin_incremental(job, ctx)?;
        }

        let limiter = RateLimiter::new(job.delay_ms);
        let checkpoint_every = job.incremental.checkpoint_every_pages.max(1);

        while let Some(request) = ctx.current.clone() {
            if ctx.pages >= job.max_pages {
                break;
            }

            let page = self.fetcher.fetch(&request)?;
            ctx.report.pages_fetched += 1;

            let cards = self.parser.parse_cards(&page, &self.adapter)?;
            ctx.report.cards_found += cards.len();
            debug!(url = %page.url, status = page.status_code, cards = cards.len(), "Fetched page");

            for card in &cards {
                match self.build_record(card, &page, job) {
                    Ok(record) => self.accept(job, execution, record, ctx)?,
                    Err(reason) => {
                        debug!(reason = %reason, "Skipping card");
                        ctx.report.records_skipped += 1;
                        ctx.report.bump_failure(reason);
                    }
                }
            }

            ctx.current = self.parser.next_request(&page, &self.adapter, &request);
            ctx.pages += 1;

            if ctx.resume && ctx.pages % checkpoint_every == 0 {
                if let Some(store) = self.state.as_deref() {
                    store.save_checkpoint(
                        &job.id,
                        ctx.current.as_ref(),
                        ctx.pages,
                        STATUS_IN_PROGRESS,
                    )?;
                }
            }

            limiter.wait();
        }

        self.finalize(job, execution, ctx)
    }

    /// Bumps the run counter, decides on a full refresh and picks up a checkpoint.
    fn begin_incremental(&mut self, job: &Job, ctx: &mut RunContext) -> Result<()> {
        let Some(store) = self.state.as_deref() else {
            return Ok(());
        };

        let run_count = store.mark_run_started(&job.id)?;
        ctx.full_refresh = job.incremental.is_full_refresh(run_count);
        ctx.report.run_count = Some(run_count);
        ctx.report.full_refresh = ctx.full_refresh;
        if ctx.full_refresh {
            info!(run_count, "Full refresh run, stored hashes are ignored");
        }

        if !ctx.resume {
            return Ok(());
        }
        let Some(checkpoint) = store.load_checkpoint(&job.id)? else {
            return Ok(());
        };
        if !checkpoint.is_in_progress() {
            return Ok(());
        }
        // Saved after the last page, so there is nothing left to resume.
        let Some(request) = checkpoint.request else {
            info!(page_index = checkpoint.page_index, "Checkpoint has no next page, starting fresh");
            return Ok(());
        };
        info!(page_index = checkpoint.page_index, url = %request.url, "Resuming from checkpoint");
        ctx.current = Some(request);
        ctx.pages = checkpoint.page_index;
        ctx.report.resumed_from_page = Some(checkpoint.page_index);
        Ok(())
    }

    fn finish(&mut self, job: &Job, ctx: &RunContext, succeeded: bool) {
        if ctx.incremental {
            if let Some(store) = self.state.as_deref() {
                let synced = if succeeded {
                    let cleared = if ctx.resume {
                        store.clear_checkpoint(&job.id)
                    } else {
                        Ok(())
                    };
                    cleared.and_then(|_| store.mark_run_completed(&job.id))
                } else if ctx.resume {
                    store.save_checkpoint(
                        &job.id,
                        ctx.current.as_ref(),
                        ctx.pages,
                        STATUS_IN_PROGRESS,
                    )
                } else {
                    Ok(())
                };
                if let Err(e) = synced {
                    warn!(error = %e, "Failed to sync incremental state at end of run");
                }
            }
        }

        self.fetcher.close();
    }
}
