use tracing::info;

use crate::adapter::SiteAdapter;
use crate::error::Result;
use crate::fingerprint::content_hash;
use crate::model::{IncrementalMode, Job, Record};

use super::context::{Execution, RunContext};
use super::ScrapeEngine;

impl<A: SiteAdapter> ScrapeEngine<A> {
    /// Routes an accepted record to the run buffer or the current stream chunk.
    pub(super) fn accept(
        &mut self,
        job: &Job,
        execution: Execution,
        record: Record,
        ctx: &mut RunContext,
    ) -> Result<()> {
        match execution {
            Execution::Memory => ctx.records.push(record),
            Execution::Stream { batch_size } => {
                ctx.buffer.push(record);
                if ctx.buffer.len() >= batch_size {
                    let chunk = std::mem::take(&mut ctx.buffer);
                    self.flush_chunk(job, chunk, ctx)?;
                }
            }
        }
        Ok(())
    }

    pub(super) fn finalize(
        &mut self,
        job: &Job,
        execution: Execution,
        ctx: &mut RunContext,
    ) -> Result<()> {
        match execution {
            Execution::Memory => {
                let records = std::mem::take(&mut ctx.records);
                let unique = self.deduper.dedupe(records);
                let emitted = self.process_and_filter(job, unique, ctx)?;
                self.sink.write(job, &emitted)?;
                ctx.report.records_emitted = emitted.len();
            }
            Execution::Stream { .. } => {
                if !ctx.buffer.is_empty() {
                    let chunk = std::mem::take(&mut ctx.buffer);
                    self.flush_chunk(job, chunk, ctx)?;
                }
                if ctx.report.records_emitted == 0 {
                    self.sink.write(job, &[])?;
                }
            }
        }
        Ok(())
    }

    fn flush_chunk(&mut self, job: &Job, chunk: Vec<Record>, ctx: &mut RunContext) -> Result<()> {
        ctx.report.chunks_flushed += 1;
        let input = chunk.len();

        let local = self.deduper.dedupe(chunk);
        let local_unique = local.len();

        let mut fresh = Vec::with_capacity(local_unique);
        for record in local {
            let key = self.deduper.key(&record);
            // Unkeyable records are kept, matching memory-mode dedupe.
            if key.is_empty() || ctx.seen_keys.insert(key) {
                fresh.push(record);
            }
        }
        let cross_chunk_duplicates = local_unique - fresh.len();

        let emitted = self.process_and_filter(job, fresh, ctx)?;
        if !emitted.is_empty() {
            self.sink.write(job, &emitted)?;
            ctx.report.records_emitted += emitted.len();
        }

        info!(
            chunk_index = ctx.report.chunks_flushed,
            input,
            local_unique,
            cross_chunk_duplicates,
            written = emitted.len(),
            "Flushed chunk"
        );
        Ok(())
    }

    fn process_and_filter(
        &self,
        job: &Job,
        records: Vec<Record>,
        ctx: &mut RunContext,
    ) -> Result<Vec<Record>> {
        let processed = self.apply_processing(job, records, ctx)?;
        self.apply_incremental(job, processed, ctx)
    }

    fn apply_processing(
        &self,
        job: &Job,
        records: Vec<Record>,
        ctx: &mut RunContext,
    ) -> Result<Vec<Record>> {
        if records.is_empty() || !job.processing.enabled {
            return Ok(records);
        }

        let outcome = self.runner.run(job, records, ctx.run_started_utc)?;
        ctx.report.records_quarantined += outcome.quarantined;
        ctx.report.merge_stage_metrics(outcome.stage_metrics);
        ctx.report.merge_artifacts(outcome.artifacts);
        Ok(outcome.records)
    }

    /// Keeps the records the state store says to emit this run.
    fn apply_incremental(
        &self,
        job: &Job,
        records: Vec<Record>,
        ctx: &mut RunContext,
    ) -> Result<Vec<Record>> {
        let Some(store) = self.state.as_deref() else {
            return Ok(records);
        };
        if !ctx.incremental || records.is_empty() {
            return Ok(records);
        }

        let mode = if ctx.full_refresh {
            IncrementalMode::All
        } else {
            job.incremental.mode
        };

        let mut kept = Vec::with_capacity(records.len());
        for record in records {
            let mut key = self.deduper.key(&record).trim().to_string();
            if key.is_empty() {
                key = record.source_url.trim().to_string();
            }
            if key.is_empty() {
                kept.push(record);
                continue;
            }

            let decision = store.decide_and_touch(&job.id, &key, &content_hash(&record), mode)?;
            if decision.emit {
                kept.push(record);
            } else {
                ctx.report.records_skipped_incremental += 1;
            }
        }
        Ok(kept)
    }
}
