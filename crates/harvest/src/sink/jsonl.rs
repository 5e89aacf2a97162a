use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::SinkError;
use crate::model::{Job, Record, WriteMode};

use super::{OutputFile, Sink};

/// One JSON object per line.
#[derive(Debug)]
pub struct JsonlSink {
    file: OutputFile,
}

impl JsonlSink {
    pub fn new(path: &Path, write_mode: WriteMode) -> Self {
        Self {
            file: OutputFile::new(path, write_mode),
        }
    }
}

impl Sink for JsonlSink {
    fn write(&mut self, job: &Job, records: &[Record]) -> Result<(), SinkError> {
        let file = self.file.open(job)?;
        let mut writer = BufWriter::new(file);
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n").map_err(|e| self.file.io_error(e))?;
        }
        writer.flush().map_err(|e| self.file.io_error(e))?;
        Ok(())
    }
}
