use std::path::Path;

use crate::error::SinkError;
use crate::model::{format_utc, value_text, Job, Record, WriteMode};

use super::{output_columns, OutputFile, Sink};

/// Delimited output with columns `id, source_url, scraped_at_utc` and then
/// the job's declared fields. The header is written only into an empty file.
#[derive(Debug)]
pub struct CsvSink {
    file: OutputFile,
}

impl CsvSink {
    pub fn new(path: &Path, write_mode: WriteMode) -> Self {
        Self {
            file: OutputFile::new(path, write_mode),
        }
    }
}

fn row(record: &Record, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|column| match column.as_str() {
            "id" => record.id.clone(),
            "source_url" => record.source_url.clone(),
            "scraped_at_utc" => format_utc(&record.scraped_at_utc),
            field => record.fields.get(field).map(value_text).unwrap_or_default(),
        })
        .collect()
}

impl Sink for CsvSink {
    fn write(&mut self, job: &Job, records: &[Record]) -> Result<(), SinkError> {
        let file = self.file.open(job)?;
        let needs_header = self.file.is_empty(&file)?;
        let columns = output_columns(job);

        let mut writer = ::csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(&columns)?;
        }
        for record in records {
            writer.write_record(row(record, &columns))?;
        }
        writer.flush().map_err(|e| self.file.io_error(e))?;
        Ok(())
    }
}
