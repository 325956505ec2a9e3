//! Record sinks.
//!
//! A [`RecordSink`] accepts cleaned batches in order. The driver tells it whether to emit the
//! header, so the header appears exactly once no matter how many batches survive filtering.

pub mod writer;

use crate::error::PipelineResult;
use crate::types::CanonicalRecord;

pub use writer::CsvAppendWriter;

/// How an output file is opened at the start of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Create or empty the file first. Re-running the pipeline replaces earlier output.
    #[default]
    Truncate,
    /// Append to whatever is already there. Re-running duplicates rows and the header.
    Append,
}

/// Append-only destination for cleaned batches.
pub trait RecordSink {
    /// Append `batch` in order, preceded by the canonical header iff `write_header`.
    fn append(&mut self, batch: &[CanonicalRecord], write_header: bool) -> PipelineResult<()>;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn append(&mut self, batch: &[CanonicalRecord], write_header: bool) -> PipelineResult<()> {
        (**self).append(batch, write_header)
    }
}

/// Collects appended batches in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    batches: Vec<Vec<CanonicalRecord>>,
    header_writes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appended batches, in order.
    pub fn batches(&self) -> &[Vec<CanonicalRecord>] {
        &self.batches
    }

    /// All appended records, flattened in order.
    pub fn records(&self) -> impl Iterator<Item = &CanonicalRecord> {
        self.batches.iter().flatten()
    }

    /// How many appends asked for the header.
    pub fn header_writes(&self) -> usize {
        self.header_writes
    }

    pub fn into_records(self) -> Vec<CanonicalRecord> {
        self.batches.into_iter().flatten().collect()
    }
}

impl RecordSink for MemorySink {
    fn append(&mut self, batch: &[CanonicalRecord], write_header: bool) -> PipelineResult<()> {
        if write_header {
            self.header_writes += 1;
        }
        self.batches.push(batch.to_vec());
        Ok(())
    }
}
