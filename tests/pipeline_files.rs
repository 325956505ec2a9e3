use std::path::Path;

use food_table_cleaner::PipelineError;
use food_table_cleaner::execution::{Pipeline, PipelineOptions};
use food_table_cleaner::output::OutputMode;
use food_table_cleaner::types::CANONICAL_HEADER;

const FIXTURE: &str = "tests/fixtures/products.tsv";

fn small_batches(base: PipelineOptions) -> PipelineOptions {
    PipelineOptions { batch_size: 3, ..base }
}

/// Parse the output CSV into (header, rows).
fn read_output(path: &Path) -> (Vec<String>, Vec<csv::StringRecord>) {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    let header = rdr.headers().unwrap().iter().map(String::from).collect();
    let rows = rdr.records().map(Result::unwrap).collect();
    (header, rows)
}

fn cell<'a>(row: &'a csv::StringRecord, column: &str) -> &'a str {
    let idx = CANONICAL_HEADER.iter().position(|c| *c == column).unwrap();
    &row[idx]
}

fn num(row: &csv::StringRecord, column: &str) -> f64 {
    cell(row, column).parse().unwrap()
}

#[test]
fn strict_run_cleans_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reduced.csv");

    let stats = Pipeline::new(small_batches(PipelineOptions::strict()))
        .run_files(FIXTURE, &out)
        .unwrap();

    assert_eq!(stats.batches_read, 3);
    assert_eq!(stats.batches_written, 3);
    assert_eq!(stats.rows_read, 9);
    assert_eq!(stats.malformed_rows, 1);
    assert_eq!(stats.rows_written, 4);
    assert_eq!(stats.rejected.missing_name, 1);
    assert_eq!(stats.rejected.duplicate, 2);
    assert_eq!(stats.rejected.incomplete, 1);
    assert_eq!(stats.rejected.all_zero, 1);

    let (header, rows) = read_output(&out);
    assert_eq!(header, CANONICAL_HEADER);
    let names: Vec<&str> = rows.iter().map(|r| cell(r, "name")).collect();
    assert_eq!(names, vec!["Apple", "Oats", "Yogurt", "Salt"]);

    let apple = &rows[0];
    assert_eq!(cell(apple, "brand"), "BrandX");
    assert_eq!(num(apple, "fiber"), 2.4);
    assert_eq!(num(apple, "total_fats"), 0.2);
    assert_eq!(cell(apple, "serving_size"), "100g?");
    assert_eq!(num(apple, "servings"), 1.0);

    let oats = &rows[1];
    assert_eq!(num(oats, "fiber"), 2.5);
    assert_eq!(num(oats, "servings"), 1.0);
    assert_eq!(cell(oats, "serving_size"), "40 g");

    let yogurt = &rows[2];
    assert_eq!(cell(yogurt, "brand"), "Danone");
    assert_eq!(num(yogurt, "calories"), 60.0);
    assert_eq!(num(yogurt, "sugar"), 4.7);
    assert_eq!(num(yogurt, "servings"), 2.0);

    let salt = &rows[3];
    assert_eq!(num(salt, "sodium"), 999_999.0);
}

#[test]
fn every_output_number_is_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reduced.csv");
    Pipeline::new(small_batches(PipelineOptions::strict()))
        .run_files(FIXTURE, &out)
        .unwrap();

    let (_, rows) = read_output(&out);
    for row in &rows {
        assert!(!cell(row, "name").trim().is_empty());
        for column in &CANONICAL_HEADER[2..CANONICAL_HEADER.len() - 2] {
            let v = num(row, column);
            assert!(v.is_finite() && (0.0..=999_999.0).contains(&v), "{column}={v}");
        }
        let servings = num(row, "servings");
        assert!(servings > 0.0 && servings <= 99.0);
    }
}

#[test]
fn lenient_run_keeps_duplicates_and_zeroes_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reduced.csv");

    let stats = Pipeline::new(small_batches(PipelineOptions::lenient()))
        .run_files(FIXTURE, &out)
        .unwrap();
    assert_eq!(stats.rows_written, 8);
    assert_eq!(stats.rejected.missing_name, 1);

    let (_, rows) = read_output(&out);
    let salt = rows.iter().find(|r| cell(r, "name") == "Salt").unwrap();
    assert_eq!(num(salt, "sodium"), 0.0);
    assert_eq!(rows.iter().filter(|r| cell(r, "name").eq_ignore_ascii_case("apple")).count(), 3);
}

#[test]
fn rerun_replaces_output_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reduced.csv");

    Pipeline::new(PipelineOptions::strict()).run_files(FIXTURE, &out).unwrap();
    Pipeline::new(PipelineOptions::strict()).run_files(FIXTURE, &out).unwrap();

    let (_, rows) = read_output(&out);
    assert_eq!(rows.len(), 4);
}

#[test]
fn append_mode_duplicates_output_on_rerun() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reduced.csv");
    let opts = PipelineOptions {
        output_mode: OutputMode::Append,
        ..PipelineOptions::strict()
    };

    Pipeline::new(opts).run_files(FIXTURE, &out).unwrap();
    Pipeline::new(opts).run_files(FIXTURE, &out).unwrap();

    let text = std::fs::read_to_string(&out).unwrap();
    let header_line = CANONICAL_HEADER.join(",");
    assert_eq!(text.lines().filter(|l| *l == header_line).count(), 2);
    assert_eq!(text.lines().count(), 10);
}

#[test]
fn missing_input_fails_without_touching_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reduced.csv");

    let err = Pipeline::new(PipelineOptions::strict())
        .run_files(dir.path().join("missing.tsv"), &out)
        .unwrap_err();

    assert!(matches!(err, PipelineError::Open { .. }));
    assert!(err.to_string().contains("missing.tsv"));
    assert!(!out.exists());
}

#[test]
fn unwritable_output_is_an_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("no_such_dir").join("reduced.csv");

    let err = Pipeline::new(PipelineOptions::strict())
        .run_files(FIXTURE, &out)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Open { .. }));
}

#[test]
fn input_with_no_surviving_rows_writes_an_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.tsv");
    std::fs::write(&input, "product_name\tbrands\tenergy-kcal_100g\n\tx\t10\nWater\t\t0\n").unwrap();
    let out = dir.path().join("reduced.csv");

    let stats = Pipeline::new(PipelineOptions::strict())
        .run_files(&input, &out)
        .unwrap();
    assert_eq!(stats.rows_written, 0);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "");
}
