//! Per-record cleaning: numeric normalization, field mapping, and the filter chain.
//!
//! Everything here works on one batch at a time and knows nothing about files. The batch driver
//! in [`crate::execution`] decides the order the pieces run in.
//!
//! ## Example: clean one batch by hand
//!
//! ```rust
//! use food_table_cleaner::processing::{map_batch, ClampPolicy, FilterChain};
//! use food_table_cleaner::types::{Nutrient, RawRecord};
//!
//! let mut chain = FilterChain::default();
//! let mut batch = vec![
//!     RawRecord::from_pairs(&[("product_name", "Apple"), ("brands", "BrandX"), ("fiber_100g", "2,5 g")]),
//!     RawRecord::from_pairs(&[("product_name", "apple"), ("brands", "brandx"), ("fiber_100g", "2,5 g")]),
//!     RawRecord::from_pairs(&[("product_name", ""), ("fiber_100g", "1")]),
//! ];
//!
//! chain.retain_present(&mut batch);
//! chain.retain_unique(&mut batch);
//! chain.retain_complete(&mut batch);
//! let mut mapped = map_batch(&batch, ClampPolicy::Clip);
//! chain.retain_named(&mut mapped);
//! chain.retain_nonzero(&mut mapped);
//!
//! assert_eq!(mapped.len(), 1);
//! assert_eq!(mapped[0].nutrient(Nutrient::Fiber), 2.5);
//! ```

pub mod filter;
pub mod map;
pub mod normalize;

pub use filter::{FilterChain, FilterCounts, FilterOptions, SeenKeys};
pub use map::{map_batch, map_record};
pub use normalize::{ClampPolicy, normalize_numeric};
