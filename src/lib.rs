//! `food-table-cleaner` turns a large, messy, tab-separated food nutrition export into a clean,
//! canonical CSV, one bounded batch at a time.
//!
//! The primary entrypoint is [`execution::Pipeline`]: build it from [`execution::PipelineOptions`]
//! and call [`execution::Pipeline::run_files`] (or [`execution::Pipeline::run`] with any
//! [`ingestion::BatchSource`] / [`output::RecordSink`] pair).
//!
//! ## What a run does
//!
//! For every batch (10 000 rows by default):
//!
//! 1. drop rows with a blank or missing `product_name`
//! 2. drop rows whose `(name, brand)` was already accepted, ignoring case and surrounding
//!    whitespace, across the whole run
//! 3. drop rows scoring below `0.5` in the first available completeness column (strict mode)
//! 4. map the rest onto the canonical schema: numeric cells such as `"2,5 g"` or `"< 1 mg"` are
//!    parsed and clamped to `[0, 999 999]`, blank serving sizes become `"100g?"`, serving
//!    quantities outside `(0, 99]` become `1.0`, quotes are stripped from text
//! 5. drop rows whose nutrients are all zero
//! 6. append the survivors to the output, writing the header with the first surviving batch
//!
//! Per-row problems are absorbed by defaults or silent rejection; only I/O failures are errors.
//!
//! ## Quick example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use food_table_cleaner::execution::{Pipeline, PipelineOptions, StdErrObserver};
//!
//! # fn main() -> Result<(), food_table_cleaner::PipelineError> {
//! let mut pipeline = Pipeline::new(PipelineOptions::strict()).with_observer(Arc::new(StdErrObserver));
//! let stats = pipeline.run_files("en.openfoodfacts.org.products.csv", "products_reduced.csv")?;
//! println!("kept {} of {} rows", stats.rows_written, stats.rows_read);
//! # Ok(())
//! # }
//! ```
//!
//! ## In-memory example
//!
//! ```rust
//! use food_table_cleaner::execution::{Pipeline, PipelineOptions};
//! use food_table_cleaner::ingestion::MemorySource;
//! use food_table_cleaner::output::MemorySink;
//! use food_table_cleaner::types::{Nutrient, RawRecord};
//!
//! let source = MemorySource::new(vec![vec![
//!     RawRecord::from_pairs(&[("product_name", "Apple"), ("brands", "BrandX"), ("energy-kcal_100g", "52")]),
//!     RawRecord::from_pairs(&[("product_name", "Apple"), ("brands", "brandx"), ("energy-kcal_100g", "52")]),
//! ]]);
//! let mut sink = MemorySink::new();
//!
//! let stats = Pipeline::new(PipelineOptions::default()).run(source, &mut sink).unwrap();
//! assert_eq!(stats.rows_written, 1);
//! assert_eq!(sink.into_records()[0].nutrient(Nutrient::Calories), 52.0);
//! ```
//!
//! ## Modules
//!
//! - [`types`]: raw rows, the canonical record and its nutrient fields
//! - [`processing`]: numeric normalization, field mapping, filter chain
//! - [`ingestion`]: batch sources (tab-separated file reader, in-memory)
//! - [`output`]: record sinks (CSV append writer, in-memory)
//! - [`execution`]: the batch driver, its options, and observer hooks
//! - [`error`]: error types

pub mod error;
pub mod execution;
pub mod ingestion;
pub mod output;
pub mod processing;
pub mod types;

pub use error::{PipelineError, PipelineResult};
