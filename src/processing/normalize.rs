//! Numeric cell normalization.
//!
//! Export cells hold things like `"25 g"`, `"< 1 mg"`, `"0,8"` or nothing at all. Normalization
//! turns any of them into a finite `f64` inside `[NUMERIC_MIN, NUMERIC_MAX]`:
//!
//! 1. decimal commas become periods
//! 2. the first signed decimal numeral is extracted (`[-+]?\d*\.?\d+`)
//! 3. no numeral (or no cell) yields `0.0`
//! 4. out-of-range values are handled by the configured [`ClampPolicy`]

use std::sync::LazyLock;

use regex::Regex;

/// Smallest value a normalized numeric field may hold.
pub const NUMERIC_MIN: f64 = 0.0;
/// Largest value a normalized numeric field may hold.
pub const NUMERIC_MAX: f64 = 999_999.0;

static NUMERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d*\.?\d+").expect("numeral pattern is valid"));

/// What to do with a parsed value outside `[NUMERIC_MIN, NUMERIC_MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClampPolicy {
    /// Clip to the nearest bound (`-3` → `0`, `2e6` → `999_999`).
    #[default]
    Clip,
    /// Replace with `0.0`.
    Zero,
}

impl ClampPolicy {
    /// Apply the policy to an already-parsed value.
    pub fn apply(self, value: f64) -> f64 {
        // NaN and -0.0 both collapse to a plain zero.
        if value.is_nan() || value == 0.0 {
            return 0.0;
        }
        match self {
            ClampPolicy::Clip => value.clamp(NUMERIC_MIN, NUMERIC_MAX),
            ClampPolicy::Zero => {
                if (NUMERIC_MIN..=NUMERIC_MAX).contains(&value) {
                    value
                } else {
                    0.0
                }
            }
        }
    }
}

/// Extract the first decimal numeral from `cell`, treating `,` as a decimal separator.
///
/// Returns `None` when the cell has no digits. The result is unclamped and may be negative.
pub fn extract_numeral(cell: &str) -> Option<f64> {
    let normalized = cell.replace(',', ".");
    let m = NUMERAL.find(&normalized)?;
    m.as_str().parse::<f64>().ok()
}

/// Normalize one raw cell into a bounded, finite float.
///
/// Absent cells and cells without a numeral yield `0.0`.
pub fn normalize_numeric(cell: Option<&str>, policy: ClampPolicy) -> f64 {
    match cell.and_then(extract_numeral) {
        Some(v) => policy.apply(v),
        None => 0.0,
    }
}
