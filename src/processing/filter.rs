//! Record filter chain.
//!
//! Stages run in a fixed order, cheapest and most structural first:
//!
//! | stage | input | rejects |
//! |---|---|---|
//! | [`FilterChain::retain_present`] | raw | blank or missing `product_name` |
//! | [`FilterChain::retain_unique`] | raw | `(name, brand)` already seen in this run |
//! | [`FilterChain::retain_complete`] | raw | completeness score below threshold |
//! | [`FilterChain::retain_named`] | mapped | name left blank after quote stripping |
//! | [`FilterChain::retain_nonzero`] | mapped | every nutrient exactly `0.0` |
//!
//! Rejections are silent; they only bump a counter in [`FilterCounts`].

use std::collections::HashSet;

use crate::types::{CanonicalRecord, DedupKey, NAME_COLUMN, RawRecord};

/// Completeness-score columns, in preference order.
pub const COMPLETENESS_COLUMNS: [&str; 3] = ["data_quality_info_score", "data_quality_score", "completeness"];

/// Default minimum completeness score.
pub const DEFAULT_MIN_COMPLETENESS: f64 = 0.5;

/// True if the row has a non-blank `product_name`.
pub fn has_name(raw: &RawRecord) -> bool {
    raw.get(NAME_COLUMN).is_some_and(|n| !n.trim().is_empty())
}

/// Completeness score of a row.
///
/// Returns `None` when the source exposes none of [`COMPLETENESS_COLUMNS`]. Otherwise the first
/// exposed column is parsed as a plain float; blank, unparsable or non-finite cells score `0.0`.
pub fn completeness_score(raw: &RawRecord) -> Option<f64> {
    let column = COMPLETENESS_COLUMNS.iter().find(|c| raw.has_column(c))?;
    let score = raw
        .get(column)
        .and_then(|cell| cell.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);
    Some(score)
}

/// Every `(name, brand)` key accepted so far.
///
/// Grows for the lifetime of the owning [`FilterChain`] and is never cleared, so duplicates are
/// caught across batch boundaries.
#[derive(Debug, Clone, Default)]
pub struct SeenKeys {
    keys: HashSet<DedupKey>,
}

impl SeenKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key`. Returns `true` if it was not seen before.
    pub fn insert(&mut self, key: DedupKey) -> bool {
        self.keys.insert(key)
    }

    pub fn contains(&self, key: &DedupKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Which optional stages are active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterOptions {
    /// Drop rows whose `(name, brand)` key was already accepted.
    pub dedupe: bool,
    /// Drop rows scoring below `min_completeness` (when the source has a score column).
    pub enforce_completeness: bool,
    /// Threshold used when `enforce_completeness` is set.
    pub min_completeness: f64,
    /// Drop mapped rows whose nutrients are all zero.
    pub drop_all_zero_rows: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            dedupe: true,
            enforce_completeness: true,
            min_completeness: DEFAULT_MIN_COMPLETENESS,
            drop_all_zero_rows: true,
        }
    }
}

/// Per-stage rejection counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCounts {
    pub missing_name: u64,
    pub duplicate: u64,
    pub incomplete: u64,
    pub blank_name: u64,
    pub all_zero: u64,
}

/// The ordered filter stages plus the run-wide de-duplication state.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    options: FilterOptions,
    seen: SeenKeys,
    counts: FilterCounts,
}

impl FilterChain {
    pub fn new(options: FilterOptions) -> Self {
        Self {
            options,
            seen: SeenKeys::new(),
            counts: FilterCounts::default(),
        }
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn seen_keys(&self) -> &SeenKeys {
        &self.seen
    }

    pub fn counts(&self) -> FilterCounts {
        self.counts
    }

    /// Return the counters and reset them to zero. The seen-key set is left alone.
    pub fn take_counts(&mut self) -> FilterCounts {
        std::mem::take(&mut self.counts)
    }

    /// Drop rows with a blank or missing name.
    pub fn retain_present(&mut self, batch: &mut Vec<RawRecord>) {
        let before = batch.len();
        batch.retain(has_name);
        self.counts.missing_name += (before - batch.len()) as u64;
    }

    /// Drop rows whose key was accepted earlier in this batch or any previous one.
    ///
    /// First seen wins. A no-op when de-duplication is disabled.
    pub fn retain_unique(&mut self, batch: &mut Vec<RawRecord>) {
        if !self.options.dedupe {
            return;
        }
        let before = batch.len();
        let seen = &mut self.seen;
        batch.retain(|raw| match DedupKey::from_raw(raw) {
            Some(key) => seen.insert(key),
            None => false,
        });
        self.counts.duplicate += (before - batch.len()) as u64;
    }

    /// Drop rows scoring below the completeness threshold.
    ///
    /// Rows from a source without any completeness column pass untouched.
    pub fn retain_complete(&mut self, batch: &mut Vec<RawRecord>) {
        if !self.options.enforce_completeness {
            return;
        }
        let min = self.options.min_completeness;
        let before = batch.len();
        batch.retain(|raw| completeness_score(raw).is_none_or(|score| score >= min));
        self.counts.incomplete += (before - batch.len()) as u64;
    }

    /// Drop mapped rows whose name became blank once quotes were stripped.
    pub fn retain_named(&mut self, batch: &mut Vec<CanonicalRecord>) {
        let before = batch.len();
        batch.retain(|rec| !rec.name.trim().is_empty());
        self.counts.blank_name += (before - batch.len()) as u64;
    }

    /// Drop mapped rows with no nutrient information at all.
    pub fn retain_nonzero(&mut self, batch: &mut Vec<CanonicalRecord>) {
        if !self.options.drop_all_zero_rows {
            return;
        }
        let before = batch.len();
        batch.retain(|rec| !rec.nutrients.all_zero());
        self.counts.all_zero += (before - batch.len()) as u64;
    }
}
