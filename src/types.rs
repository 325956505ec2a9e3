//! Core data model: raw source rows, the canonical output record, and the de-duplication key.
//!
//! A [`RawRecord`] is one row of the tab-separated export, addressed by column name through a
//! shared [`ColumnIndex`]. The field mapper turns it into a [`CanonicalRecord`], whose numeric
//! nutrient fields are stored in a fixed-order [`Nutrients`] array indexed by [`Nutrient`].

use std::collections::HashMap;
use std::sync::Arc;

use csv::StringRecord;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Maps header names to cell positions for one input source.
///
/// When a header name repeats, the first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    /// Build an index from header names in file order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut positions = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            positions.entry(name.clone()).or_insert(idx);
        }
        Self { names, positions }
    }

    /// Position of `name` in the header, if present.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Number of header columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Header names in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// One untyped source row.
///
/// Cells are looked up by column name. A column missing from the header, or a cell beyond the
/// end of a short row, reads as `None`; an empty cell reads as `Some("")`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    columns: Arc<ColumnIndex>,
    cells: StringRecord,
}

impl RawRecord {
    pub fn new(columns: Arc<ColumnIndex>, cells: StringRecord) -> Self {
        Self { columns, cells }
    }

    /// Build a standalone record from `(column, cell)` pairs.
    ///
    /// Handy for in-memory sources and tests; each record gets its own [`ColumnIndex`].
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let columns = ColumnIndex::new(pairs.iter().map(|(k, _)| k.as_ref().to_owned()));
        let cells = StringRecord::from(pairs.iter().map(|(_, v)| v.as_ref()).collect::<Vec<_>>());
        Self::new(Arc::new(columns), cells)
    }

    /// Cell for `column`, or `None` if the column or the cell is missing.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .position(column)
            .and_then(|idx| self.cells.get(idx))
    }

    /// Whether the source header exposes `column` at all.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn columns(&self) -> &ColumnIndex {
        &self.columns
    }
}

macro_rules! nutrients {
    ($( $variant:ident => $canonical:literal, $source:literal; )+) => {
        /// The numeric nutrient fields of the canonical schema, in output order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Nutrient {
            $( $variant, )+
        }

        impl Nutrient {
            /// Every nutrient, in canonical output order.
            pub const ALL: [Nutrient; nutrients!(@count $($variant)+)] = [$( Nutrient::$variant, )+];

            /// Number of nutrient fields.
            pub const COUNT: usize = Self::ALL.len();

            /// Column name in the cleaned output.
            pub const fn canonical_name(self) -> &'static str {
                match self {
                    $( Nutrient::$variant => $canonical, )+
                }
            }

            /// Column name in the raw export.
            pub const fn source_column(self) -> &'static str {
                match self {
                    $( Nutrient::$variant => $source, )+
                }
            }

            /// Position in [`Nutrient::ALL`].
            pub const fn index(self) -> usize {
                self as usize
            }
        }
    };
    (@count $($t:ident)+) => { 0 $( + nutrients!(@one $t) )+ };
    (@one $t:ident) => { 1 };
}

nutrients! {
    Calories => "calories", "energy-kcal_100g";
    TotalCarbs => "total_carbs", "carbohydrates_100g";
    Fiber => "fiber", "fiber_100g";
    Sugar => "sugar", "sugars_100g";
    AddedSugar => "added_sugar", "added-sugars_100g";
    TotalFats => "total_fats", "fat_100g";
    Omega3 => "omega_3", "omega-3-fat_100g";
    Omega6 => "omega_6", "omega-6-fat_100g";
    SaturatedFats => "saturated_fats", "saturated-fat_100g";
    TransFats => "trans_fats", "trans-fat_100g";
    Protein => "protein", "proteins_100g";
    VitaminA => "vitamin_a", "vitamin-a_100g";
    VitaminB6 => "vitamin_b6", "vitamin-b6_100g";
    VitaminB12 => "vitamin_b12", "vitamin-b12_100g";
    VitaminC => "vitamin_c", "vitamin-c_100g";
    VitaminD => "vitamin_d", "vitamin-d_100g";
    VitaminE => "vitamin_e", "vitamin-e_100g";
    VitaminK => "vitamin_k", "vitamin-k_100g";
    Thiamin => "thiamin", "vitamin-b1_100g";
    Riboflavin => "riboflavin", "vitamin-b2_100g";
    Niacin => "niacin", "vitamin-pp_100g";
    Folate => "folate", "vitamin-b9_100g";
    PantothenicAcid => "pantothenic_acid", "pantothenic-acid_100g";
    Biotin => "biotin", "biotin_100g";
    Choline => "choline", "choline_100g";
    Calcium => "calcium", "calcium_100g";
    Chromium => "chromium", "chromium_100g";
    Copper => "copper", "copper_100g";
    Fluoride => "fluoride", "fluoride_100g";
    Iodine => "iodine", "iodine_100g";
    Iron => "iron", "iron_100g";
    Magnesium => "magnesium", "magnesium_100g";
    Manganese => "manganese", "manganese_100g";
    Molybdenum => "molybdenum", "molybdenum_100g";
    Phosphorus => "phosphorus", "phosphorus_100g";
    Selenium => "selenium", "selenium_100g";
    Zinc => "zinc", "zinc_100g";
    Potassium => "potassium", "potassium_100g";
    Sodium => "sodium", "sodium_100g";
    Chloride => "chloride", "chloride_100g";
}

/// Source column holding the product name.
pub const NAME_COLUMN: &str = "product_name";
/// Source column holding the brand list.
pub const BRAND_COLUMN: &str = "brands";
/// Source column holding the free-text serving size.
pub const SERVING_SIZE_COLUMN: &str = "serving_size";
/// Source column holding the numeric serving quantity.
pub const SERVING_QUANTITY_COLUMN: &str = "serving_quantity";

/// Output header, in field order.
pub const CANONICAL_HEADER: [&str; Nutrient::COUNT + 4] = [
    "name",
    "brand",
    Nutrient::Calories.canonical_name(),
    Nutrient::TotalCarbs.canonical_name(),
    Nutrient::Fiber.canonical_name(),
    Nutrient::Sugar.canonical_name(),
    Nutrient::AddedSugar.canonical_name(),
    Nutrient::TotalFats.canonical_name(),
    Nutrient::Omega3.canonical_name(),
    Nutrient::Omega6.canonical_name(),
    Nutrient::SaturatedFats.canonical_name(),
    Nutrient::TransFats.canonical_name(),
    Nutrient::Protein.canonical_name(),
    Nutrient::VitaminA.canonical_name(),
    Nutrient::VitaminB6.canonical_name(),
    Nutrient::VitaminB12.canonical_name(),
    Nutrient::VitaminC.canonical_name(),
    Nutrient::VitaminD.canonical_name(),
    Nutrient::VitaminE.canonical_name(),
    Nutrient::VitaminK.canonical_name(),
    Nutrient::Thiamin.canonical_name(),
    Nutrient::Riboflavin.canonical_name(),
    Nutrient::Niacin.canonical_name(),
    Nutrient::Folate.canonical_name(),
    Nutrient::PantothenicAcid.canonical_name(),
    Nutrient::Biotin.canonical_name(),
    Nutrient::Choline.canonical_name(),
    Nutrient::Calcium.canonical_name(),
    Nutrient::Chromium.canonical_name(),
    Nutrient::Copper.canonical_name(),
    Nutrient::Fluoride.canonical_name(),
    Nutrient::Iodine.canonical_name(),
    Nutrient::Iron.canonical_name(),
    Nutrient::Magnesium.canonical_name(),
    Nutrient::Manganese.canonical_name(),
    Nutrient::Molybdenum.canonical_name(),
    Nutrient::Phosphorus.canonical_name(),
    Nutrient::Selenium.canonical_name(),
    Nutrient::Zinc.canonical_name(),
    Nutrient::Potassium.canonical_name(),
    Nutrient::Sodium.canonical_name(),
    Nutrient::Chloride.canonical_name(),
    "serving_size",
    "servings",
];

/// Fixed-order nutrient values for one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nutrients([f64; Nutrient::COUNT]);

impl Nutrients {
    /// All nutrients set to `0.0`.
    pub const fn zeroed() -> Self {
        Self([0.0; Nutrient::COUNT])
    }

    pub fn get(&self, nutrient: Nutrient) -> f64 {
        self.0[nutrient.index()]
    }

    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        self.0[nutrient.index()] = value;
    }

    /// `(nutrient, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        Nutrient::ALL.iter().map(|&n| (n, self.0[n.index()]))
    }

    /// True if every nutrient is exactly `0.0`.
    pub fn all_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }
}

impl Default for Nutrients {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// A cleaned output row.
///
/// Serializes as a flat struct whose field names and order match [`CANONICAL_HEADER`].
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub name: String,
    pub brand: String,
    pub nutrients: Nutrients,
    pub serving_size: String,
    pub servings: f64,
}

impl CanonicalRecord {
    /// Shorthand for `self.nutrients.get(nutrient)`.
    pub fn nutrient(&self, nutrient: Nutrient) -> f64 {
        self.nutrients.get(nutrient)
    }
}

impl Serialize for CanonicalRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("CanonicalRecord", CANONICAL_HEADER.len())?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("brand", &self.brand)?;
        for (nutrient, value) in self.nutrients.iter() {
            s.serialize_field(nutrient.canonical_name(), &value)?;
        }
        s.serialize_field("serving_size", &self.serving_size)?;
        s.serialize_field("servings", &self.servings)?;
        s.end()
    }
}

/// Normalized `(name, brand)` identity used for de-duplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    name: String,
    brand: String,
}

impl DedupKey {
    /// Trim and lowercase both parts. An absent brand is the empty string.
    pub fn new(name: &str, brand: Option<&str>) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            brand: brand.unwrap_or("").trim().to_lowercase(),
        }
    }

    /// Key for a raw row, or `None` if it has no name column/cell.
    pub fn from_raw(record: &RawRecord) -> Option<Self> {
        let name = record.get(NAME_COLUMN)?;
        Some(Self::new(name, record.get(BRAND_COLUMN)))
    }
}
