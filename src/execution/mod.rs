//! Batch pipeline driver.
//!
//! [`Pipeline`] pulls batches from a [`BatchSource`], threads each one through the filter chain
//! and field mapper, and appends the survivors to a [`RecordSink`]:
//!
//! ```text
//! presence -> dedup -> completeness -> map -> blank-name -> all-zero -> sink
//! ```
//!
//! A batch that any stage empties is dropped on the spot and the next batch is requested. Batches
//! are handled strictly one after another in input order, so de-duplication is first-seen-wins
//! across the whole run. The canonical header goes out with the first batch that reaches the sink.

mod observer;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::error::PipelineResult;
use crate::ingestion::{BatchSource, DEFAULT_BATCH_SIZE, TsvBatchReader};
use crate::output::{CsvAppendWriter, OutputMode, RecordSink};
use crate::processing::filter::DEFAULT_MIN_COMPLETENESS;
use crate::processing::{ClampPolicy, FilterChain, FilterOptions, SeenKeys, map_batch};

pub use observer::{
    CompositeObserver, FileObserver, FilterStage, PipelineEvent, PipelineObserver, RunStats, StdErrObserver,
};

/// Configuration for a [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    /// Rows per batch when the pipeline opens its own reader.
    pub batch_size: usize,
    /// Drop rows whose `(name, brand)` was already accepted in this run.
    pub dedupe: bool,
    /// Drop rows below `min_completeness` when the source carries a completeness column.
    pub enforce_completeness: bool,
    pub min_completeness: f64,
    /// Drop rows whose nutrients all normalize to `0.0`.
    pub drop_all_zero_rows: bool,
    /// Out-of-range handling for numeric cells.
    pub clamp_policy: ClampPolicy,
    /// How [`Pipeline::run_files`] opens the output file.
    pub output_mode: OutputMode,
}

impl PipelineOptions {
    /// Every filter on, out-of-range numbers clipped, output truncated at start.
    pub fn strict() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            dedupe: true,
            enforce_completeness: true,
            min_completeness: DEFAULT_MIN_COMPLETENESS,
            drop_all_zero_rows: true,
            clamp_policy: ClampPolicy::Clip,
            output_mode: OutputMode::Truncate,
        }
    }

    /// Only the name check; out-of-range numbers become `0.0`.
    pub fn lenient() -> Self {
        Self {
            dedupe: false,
            enforce_completeness: false,
            drop_all_zero_rows: false,
            clamp_policy: ClampPolicy::Zero,
            ..Self::strict()
        }
    }

    fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            dedupe: self.dedupe,
            enforce_completeness: self.enforce_completeness,
            min_completeness: self.min_completeness,
            drop_all_zero_rows: self.drop_all_zero_rows,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::strict()
    }
}

/// Sequential, batch-at-a-time cleaning pipeline.
///
/// The pipeline owns the de-duplication key set for its whole lifetime. Running it twice keeps
/// rejecting keys accepted by the first run; build a new pipeline for an independent pass.
pub struct Pipeline {
    opts: PipelineOptions,
    chain: FilterChain,
    observer: Option<Arc<dyn PipelineObserver>>,
}

impl Pipeline {
    /// Create a pipeline with the given options.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size == 0`.
    pub fn new(opts: PipelineOptions) -> Self {
        assert!(opts.batch_size > 0, "batch_size must be > 0");
        Self {
            chain: FilterChain::new(opts.filter_options()),
            opts,
            observer: None,
        }
    }

    /// Attach an observer for progress and outcome events.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.opts
    }

    /// Keys accepted so far.
    pub fn seen_keys(&self) -> &SeenKeys {
        self.chain.seen_keys()
    }

    /// Clean `input` (tab-separated) into `output` (CSV).
    ///
    /// The input is opened first, so a missing input never touches the output file. Both open
    /// failures are fatal and reported as [`crate::PipelineError::Open`].
    pub fn run_files(&mut self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> PipelineResult<RunStats> {
        let opened = TsvBatchReader::from_path(input, self.opts.batch_size).and_then(|reader| {
            let writer = CsvAppendWriter::create(output, self.opts.output_mode)?;
            Ok((reader, writer))
        });
        match opened {
            Ok((reader, writer)) => self.run(reader, writer),
            Err(err) => {
                self.emit(PipelineEvent::RunFailed {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Drain `source` into `sink`.
    ///
    /// Returns the counters for this run. The first error from the source or the sink aborts the
    /// run; anything already appended stays appended.
    pub fn run<S, K>(&mut self, mut source: S, mut sink: K) -> PipelineResult<RunStats>
    where
        S: BatchSource,
        K: RecordSink,
    {
        let start = Instant::now();
        self.chain.take_counts();
        self.emit(PipelineEvent::RunStarted);

        match self.run_batches(&mut source, &mut sink) {
            Ok(stats) => {
                self.emit(PipelineEvent::RunFinished {
                    elapsed: start.elapsed(),
                    stats,
                });
                Ok(stats)
            }
            Err(err) => {
                self.emit(PipelineEvent::RunFailed {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn run_batches<S, K>(&mut self, source: &mut S, sink: &mut K) -> PipelineResult<RunStats>
    where
        S: BatchSource,
        K: RecordSink,
    {
        let mut stats = RunStats::default();
        let mut header_written = false;

        while let Some(mut batch) = source.next_batch()? {
            let batch_index = stats.batches_read;
            stats.batches_read += 1;
            stats.rows_read += batch.len() as u64;
            self.emit(PipelineEvent::BatchRead {
                batch_index,
                rows: batch.len(),
            });

            self.chain.retain_present(&mut batch);
            if batch.is_empty() {
                self.skipped(batch_index, FilterStage::Presence);
                continue;
            }
            self.chain.retain_unique(&mut batch);
            if batch.is_empty() {
                self.skipped(batch_index, FilterStage::Duplicate);
                continue;
            }
            self.chain.retain_complete(&mut batch);
            if batch.is_empty() {
                self.skipped(batch_index, FilterStage::Completeness);
                continue;
            }

            let mut mapped = map_batch(&batch, self.opts.clamp_policy);
            drop(batch);

            self.chain.retain_named(&mut mapped);
            if mapped.is_empty() {
                self.skipped(batch_index, FilterStage::BlankName);
                continue;
            }
            self.chain.retain_nonzero(&mut mapped);
            if mapped.is_empty() {
                self.skipped(batch_index, FilterStage::AllZero);
                continue;
            }

            sink.append(&mapped, !header_written)?;
            header_written = true;
            stats.batches_written += 1;
            stats.rows_written += mapped.len() as u64;
            self.emit(PipelineEvent::BatchWritten {
                batch_index,
                rows: mapped.len(),
                total_written: stats.rows_written,
            });
        }

        stats.malformed_rows = source.malformed_rows();
        stats.rejected = self.chain.take_counts();
        Ok(stats)
    }

    fn skipped(&self, batch_index: u64, stage: FilterStage) {
        self.emit(PipelineEvent::BatchSkipped { batch_index, stage });
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(o) = &self.observer {
            o.on_event(&event);
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("opts", &self.opts)
            .field("seen_keys", &self.chain.seen_keys().len())
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}
