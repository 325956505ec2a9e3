//! Streaming reader for the tab-separated export.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use csv::StringRecord;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{ColumnIndex, RawRecord};

use super::BatchSource;

/// Rows per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Reads a headered, tab-separated file in batches of at most `batch_size` rows.
///
/// Rules:
///
/// - the first line is the header; columns are addressed by name
/// - rows with more cells than the header, or with invalid UTF-8, are skipped and counted
/// - rows with fewer cells are kept; the missing trailing cells read as absent
/// - I/O errors are returned to the caller
#[derive(Debug)]
pub struct TsvBatchReader<R> {
    rdr: csv::Reader<R>,
    columns: Arc<ColumnIndex>,
    batch_size: usize,
    record: StringRecord,
    malformed: u64,
    exhausted: bool,
}

impl TsvBatchReader<File> {
    /// Open `path` for batched reading.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size == 0`.
    pub fn from_path(path: impl AsRef<Path>, batch_size: usize) -> PipelineResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PipelineError::open(path, e))?;
        Self::from_reader(file, batch_size)
    }
}

impl<R: Read> TsvBatchReader<R> {
    /// Wrap any reader. The header line is read immediately.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size == 0`.
    pub fn from_reader(reader: R, batch_size: usize) -> PipelineResult<Self> {
        assert!(batch_size > 0, "batch_size must be > 0");
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);
        let columns = ColumnIndex::new(rdr.headers()?.iter());

        Ok(Self {
            rdr,
            columns: Arc::new(columns),
            batch_size,
            record: StringRecord::new(),
            malformed: 0,
            exhausted: false,
        })
    }

    /// Header columns of the source.
    pub fn columns(&self) -> &ColumnIndex {
        &self.columns
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl<R: Read> BatchSource for TsvBatchReader<R> {
    fn next_batch(&mut self) -> PipelineResult<Option<Vec<RawRecord>>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            match self.rdr.read_record(&mut self.record) {
                Ok(true) => {
                    if self.record.len() > self.columns.len() {
                        self.malformed += 1;
                        continue;
                    }
                    batch.push(RawRecord::new(Arc::clone(&self.columns), self.record.clone()));
                }
                Ok(false) => {
                    self.exhausted = true;
                    break;
                }
                Err(err) if err.is_io_error() => return Err(err.into()),
                // Encoding and shape problems only cost us the row.
                Err(_) => self.malformed += 1,
            }
        }

        if batch.is_empty() { Ok(None) } else { Ok(Some(batch)) }
    }

    fn malformed_rows(&self) -> u64 {
        self.malformed
    }
}
