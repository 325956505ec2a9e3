//! CSV output.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{CANONICAL_HEADER, CanonicalRecord};

use super::{OutputMode, RecordSink};

/// Writes canonical records as comma-separated rows.
///
/// Every [`RecordSink::append`] call is flushed before it returns, so a crash loses at most the
/// batch in flight.
#[derive(Debug)]
pub struct CsvAppendWriter<W: Write> {
    wtr: csv::Writer<W>,
    rows_written: u64,
}

impl CsvAppendWriter<File> {
    /// Open `path` according to `mode`, creating it if needed.
    pub fn create(path: impl AsRef<Path>, mode: OutputMode) -> PipelineResult<Self> {
        let path = path.as_ref();
        let mut opts = OpenOptions::new();
        opts.create(true);
        match mode {
            OutputMode::Truncate => opts.write(true).truncate(true),
            OutputMode::Append => opts.append(true),
        };
        let file = opts.open(path).map_err(|e| PipelineError::open(path, e))?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> CsvAppendWriter<W> {
    pub fn from_writer(inner: W) -> Self {
        let wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        Self { wtr, rows_written: 0 }
    }

    /// Data rows written by this writer (headers excluded).
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> PipelineResult<W> {
        self.wtr
            .into_inner()
            .map_err(|e| PipelineError::Io(e.into_error()))
    }
}

impl<W: Write> RecordSink for CsvAppendWriter<W> {
    fn append(&mut self, batch: &[CanonicalRecord], write_header: bool) -> PipelineResult<()> {
        if write_header {
            self.wtr.write_record(CANONICAL_HEADER)?;
        }
        for record in batch {
            self.wtr.serialize(record)?;
        }
        self.wtr.flush()?;
        self.rows_written += batch.len() as u64;
        Ok(())
    }
}
