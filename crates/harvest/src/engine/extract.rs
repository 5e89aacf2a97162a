use crate::adapter::SiteAdapter;
use crate::error::ExtractError;
use crate::model::{Job, Page, Record};

use super::ScrapeEngine;

const DEFAULT_REJECTION: &str = "validation_failed";

impl<A: SiteAdapter> ScrapeEngine<A> {
    /// Builds a record from one card: source url plus every declared field.
    pub fn extract(&self, card: &A::Card, page: &Page, job: &Job) -> Result<Record, ExtractError> {
        let source_url = self
            .adapter
            .extract_source_url(card, page)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or(ExtractError::MissingSourceUrl)?;

        let mut record = Record::new(source_url);
        for field in &job.field_schema {
            let value = self.adapter.extract_field(card, field, page)?;
            record.fields.insert(field.clone(), value);
        }
        Ok(record)
    }

    /// Extract, enrich, normalize and validate. `Err` carries the failure reason.
    pub(super) fn build_record(
        &mut self,
        card: &A::Card,
        page: &Page,
        job: &Job,
    ) -> Result<Record, String> {
        let record = self.extract(card, page, job).map_err(|e| e.reason())?;
        let record = self.enrich(job, record);
        let record = self.normalizer.normalize(record);

        let verdict = self.validator.validate(&record, &job.required_fields);
        if !verdict.ok {
            if verdict.reason.is_empty() {
                return Err(DEFAULT_REJECTION.to_string());
            }
            return Err(verdict.reason);
        }
        Ok(record)
    }

    fn enrich(&mut self, job: &Job, record: Record) -> Record {
        if !job.enrich.enabled {
            return record;
        }
        match self.enricher.as_mut() {
            Some(enricher) if enricher.should_enrich(&record) => {
                enricher.enrich(record, &self.adapter)
            }
            _ => record,
        }
    }
}
