//! Batch sources.
//!
//! The pipeline pulls raw rows through the [`BatchSource`] trait, one bounded batch at a time.
//! Sources are lazy, finite and not restartable: once `next_batch` returns `Ok(None)` the source
//! is exhausted.
//!
//! Implementations:
//! - [`tsv::TsvBatchReader`]: streams a tab-separated export from disk (or any `Read`)
//! - [`MemorySource`]: pre-built batches, for tests and embedding

pub mod tsv;

use std::collections::VecDeque;

use crate::error::PipelineResult;
use crate::types::RawRecord;

pub use tsv::{DEFAULT_BATCH_SIZE, TsvBatchReader};

/// A lazy, finite sequence of raw-row batches.
pub trait BatchSource {
    /// Next non-empty batch, or `None` once the input is exhausted.
    ///
    /// Only I/O failures are errors; malformed rows are skipped by the source.
    fn next_batch(&mut self) -> PipelineResult<Option<Vec<RawRecord>>>;

    /// Rows skipped so far because they could not be read.
    fn malformed_rows(&self) -> u64 {
        0
    }
}

impl<S: BatchSource + ?Sized> BatchSource for &mut S {
    fn next_batch(&mut self) -> PipelineResult<Option<Vec<RawRecord>>> {
        (**self).next_batch()
    }

    fn malformed_rows(&self) -> u64 {
        (**self).malformed_rows()
    }
}

/// In-memory [`BatchSource`] over pre-built batches.
///
/// Empty batches are yielded as-is; the pipeline skips them.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    batches: VecDeque<Vec<RawRecord>>,
}

impl MemorySource {
    pub fn new(batches: Vec<Vec<RawRecord>>) -> Self {
        Self {
            batches: batches.into(),
        }
    }

    /// Split `records` into batches of at most `batch_size` rows.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size == 0`.
    pub fn from_records(records: Vec<RawRecord>, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch_size must be > 0");
        let mut batches = VecDeque::new();
        let mut iter = records.into_iter().peekable();
        while iter.peek().is_some() {
            batches.push_back(iter.by_ref().take(batch_size).collect());
        }
        Self { batches }
    }

    /// Batches not yet handed out.
    pub fn remaining(&self) -> usize {
        self.batches.len()
    }
}

impl BatchSource for MemorySource {
    fn next_batch(&mut self) -> PipelineResult<Option<Vec<RawRecord>>> {
        Ok(self.batches.pop_front())
    }
}
