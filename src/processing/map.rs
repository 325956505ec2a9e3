//! Mapping raw export rows onto the canonical output schema.

use crate::types::{
    BRAND_COLUMN, CanonicalRecord, NAME_COLUMN, Nutrient, Nutrients, RawRecord, SERVING_QUANTITY_COLUMN,
    SERVING_SIZE_COLUMN,
};

use super::normalize::{ClampPolicy, extract_numeral, normalize_numeric};

/// Substituted for a blank or missing serving size.
pub const SERVING_SIZE_SENTINEL: &str = "100g?";
/// Substituted for a missing or out-of-range serving quantity.
pub const DEFAULT_SERVINGS: f64 = 1.0;
/// Largest accepted serving quantity.
pub const MAX_SERVINGS: f64 = 99.0;

/// Map one raw row into a [`CanonicalRecord`].
///
/// Never fails: every field has a deterministic default. Rows without a usable name are expected
/// to have been dropped already; if one slips through, `name` is the empty string.
pub fn map_record(raw: &RawRecord, policy: ClampPolicy) -> CanonicalRecord {
    let mut nutrients = Nutrients::zeroed();
    for nutrient in Nutrient::ALL {
        nutrients.set(nutrient, normalize_numeric(raw.get(nutrient.source_column()), policy));
    }

    let serving_size = match raw.get(SERVING_SIZE_COLUMN) {
        Some(s) if !s.trim().is_empty() => s,
        _ => SERVING_SIZE_SENTINEL,
    };

    CanonicalRecord {
        name: strip_quotes(raw.get(NAME_COLUMN).unwrap_or("")).trim().to_string(),
        brand: strip_quotes(raw.get(BRAND_COLUMN).unwrap_or("")),
        nutrients,
        serving_size: strip_quotes(serving_size),
        servings: parse_servings(raw.get(SERVING_QUANTITY_COLUMN)),
    }
}

/// Map a batch, preserving order.
pub fn map_batch(batch: &[RawRecord], policy: ClampPolicy) -> Vec<CanonicalRecord> {
    batch.iter().map(|raw| map_record(raw, policy)).collect()
}

/// Serving quantity in `(0, 99]`, or [`DEFAULT_SERVINGS`].
pub fn parse_servings(cell: Option<&str>) -> f64 {
    match cell.and_then(extract_numeral) {
        Some(v) if v > 0.0 && v <= MAX_SERVINGS => v,
        _ => DEFAULT_SERVINGS,
    }
}

/// Remove `"` and `'` so text cells cannot break the delimited output.
pub fn strip_quotes(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '"' | '\'')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_text_fields_with_defaults() {
        let raw = RawRecord::from_pairs(&[("product_name", "  Apple  "), ("energy-kcal_100g", "52")]);
        let rec = map_record(&raw, ClampPolicy::Clip);

        assert_eq!(rec.name, "Apple");
        assert_eq!(rec.brand, "");
        assert_eq!(rec.serving_size, SERVING_SIZE_SENTINEL);
        assert_eq!(rec.servings, DEFAULT_SERVINGS);
        assert_eq!(rec.nutrient(Nutrient::Calories), 52.0);
        assert_eq!(rec.nutrient(Nutrient::Protein), 0.0);
    }

    #[test]
    fn maps_every_nutrient_from_its_source_column() {
        let pairs: Vec<(String, String)> = std::iter::once(("product_name".to_string(), "X".to_string()))
            .chain(
                Nutrient::ALL
                    .iter()
                    .enumerate()
                    .map(|(i, n)| (n.source_column().to_string(), format!("{} mg", i + 1))),
            )
            .collect();
        let rec = map_record(&RawRecord::from_pairs(pairs.as_slice()), ClampPolicy::Clip);

        for (i, n) in Nutrient::ALL.iter().enumerate() {
            assert_eq!(rec.nutrient(*n), (i + 1) as f64, "{}", n.canonical_name());
        }
    }

    #[test]
    fn decimal_comma_with_unit() {
        let raw = RawRecord::from_pairs(&[("product_name", "Oats"), ("fiber_100g", "2,5 g")]);
        assert_eq!(map_record(&raw, ClampPolicy::Clip).nutrient(Nutrient::Fiber), 2.5);
    }

    #[test]
    fn blank_serving_size_gets_sentinel_and_text_is_kept_raw() {
        let blank = RawRecord::from_pairs(&[("product_name", "A"), ("serving_size", "   ")]);
        assert_eq!(map_record(&blank, ClampPolicy::Clip).serving_size, "100g?");

        let given = RawRecord::from_pairs(&[("product_name", "A"), ("serving_size", "1 cup (240 ml)")]);
        assert_eq!(map_record(&given, ClampPolicy::Clip).serving_size, "1 cup (240 ml)");
    }

    #[test]
    fn servings_outside_range_default_to_one() {
        assert_eq!(parse_servings(Some("150")), 1.0);
        assert_eq!(parse_servings(Some("0")), 1.0);
        assert_eq!(parse_servings(Some("-2")), 1.0);
        assert_eq!(parse_servings(Some("")), 1.0);
        assert_eq!(parse_servings(None), 1.0);
        assert_eq!(parse_servings(Some("99")), 99.0);
        assert_eq!(parse_servings(Some("2,5")), 2.5);
        assert_eq!(parse_servings(Some("30 g")), 30.0);
    }

    #[test]
    fn quotes_are_removed_from_text_fields() {
        let raw = RawRecord::from_pairs(&[
            ("product_name", "Grandma's \"best\" jam"),
            ("brands", "O'Brien"),
            ("serving_size", "1 \"tbsp\""),
        ]);
        let rec = map_record(&raw, ClampPolicy::Clip);
        assert_eq!(rec.name, "Grandmas best jam");
        assert_eq!(rec.brand, "OBrien");
        assert_eq!(rec.serving_size, "1 tbsp");
    }

    #[test]
    fn name_is_trimmed_after_quote_stripping() {
        let raw = RawRecord::from_pairs(&[("product_name", "'  Apple '"), ("brands", "\" Acme \"")]);
        let rec = map_record(&raw, ClampPolicy::Clip);
        assert_eq!(rec.name, "Apple");
        assert_eq!(rec.brand, " Acme ");
    }

    #[test]
    fn clamp_policy_is_applied_per_nutrient() {
        let raw = RawRecord::from_pairs(&[("product_name", "A"), ("sodium_100g", "5000000")]);
        assert_eq!(map_record(&raw, ClampPolicy::Clip).nutrient(Nutrient::Sodium), 999_999.0);
        assert_eq!(map_record(&raw, ClampPolicy::Zero).nutrient(Nutrient::Sodium), 0.0);
    }

    #[test]
    fn map_batch_preserves_order() {
        let batch = vec![
            RawRecord::from_pairs(&[("product_name", "first")]),
            RawRecord::from_pairs(&[("product_name", "second")]),
        ];
        let out = map_batch(&batch, ClampPolicy::Clip);
        assert_eq!(out.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), vec!["first", "second"]);
    }
}
