//! Output writers.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::SinkError;
use crate::model::{ExecutionMode, Job, Record, SinkConfig, WriteMode};

mod csv;
mod jsonl;

pub use self::csv::CsvSink;
pub use self::jsonl::JsonlSink;

/// Receives the surviving records once per flush.
///
/// Called with an empty slice when a run emitted nothing, so the sink can
/// still produce its header or empty artifact.
pub trait Sink {
    fn write(&mut self, job: &Job, records: &[Record]) -> Result<(), SinkError>;
}

pub fn build_sink(config: &SinkConfig) -> Box<dyn Sink> {
    match config {
        SinkConfig::Csv { path, write_mode } => Box::new(CsvSink::new(path, *write_mode)),
        SinkConfig::Jsonl { path, write_mode } => Box::new(JsonlSink::new(path, *write_mode)),
    }
}

/// Core columns followed by the job's declared fields.
pub fn output_columns(job: &Job) -> Vec<String> {
    let mut columns: Vec<String> = ["id", "source_url", "scraped_at_utc"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for field in &job.field_schema {
        if !columns.contains(field) {
            columns.push(field.clone());
        }
    }
    columns
}

/// Output file shared by the file sinks.
///
/// With `overwrite`, a memory run truncates on its single write; a stream
/// run truncates on its first chunk and appends the rest.
#[derive(Debug)]
struct OutputFile {
    path: PathBuf,
    write_mode: WriteMode,
    started: bool,
}

impl OutputFile {
    fn new(path: &Path, write_mode: WriteMode) -> Self {
        Self {
            path: path.to_path_buf(),
            write_mode,
            started: false,
        }
    }

    fn open(&mut self, job: &Job) -> Result<File, SinkError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let truncate = self.write_mode == WriteMode::Overwrite
            && (job.execution_mode == ExecutionMode::Memory || !self.started);
        self.started = true;

        let mut options = OpenOptions::new();
        options.create(true);
        if truncate {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }
        options.open(&self.path).map_err(|e| self.io_error(e))
    }

    fn is_empty(&self, file: &File) -> Result<bool, SinkError> {
        Ok(file.metadata().map_err(|e| self.io_error(e))?.len() == 0)
    }

    fn io_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
