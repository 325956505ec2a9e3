//! Cleans the Open Food Facts export in the working directory.
//!
//! Reads `en.openfoodfacts.org.products.csv` (tab-separated) and writes
//! `en.openfoodfacts.org.products_reduced.csv`. Takes no arguments.

use std::process::ExitCode;
use std::sync::Arc;

use food_table_cleaner::execution::{Pipeline, PipelineOptions, StdErrObserver};

const INPUT_PATH: &str = "en.openfoodfacts.org.products.csv";
const OUTPUT_PATH: &str = "en.openfoodfacts.org.products_reduced.csv";

fn main() -> ExitCode {
    let mut pipeline = Pipeline::new(PipelineOptions::strict()).with_observer(Arc::new(StdErrObserver));
    // Failures are already printed by the observer.
    match pipeline.run_files(INPUT_PATH, OUTPUT_PATH) {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
