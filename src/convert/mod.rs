//! Column vector to Arrow/Polars conversion
//!
//! This module maps field descriptors to Polars data types and materializes
//! finalized column vectors as Series, which is how failing round trips are
//! rendered for diagnosis.

mod arrow;
mod series;

pub use arrow::{field_to_dtype, scalar_to_dtype};
pub use series::{render, to_series};
