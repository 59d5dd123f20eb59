//! In-crate columnar storage.
//!
//! [`ColumnVector`] provides position-addressed writes, list/map entry
//! boundaries, struct row markers, value-count bookkeeping, decoding back to
//! [`Value`] and deep equality.

mod value;
mod vector;

pub use value::{EntryMap, MapEntry, Value};
pub use vector::{ColumnVector, ListVector, MapVector, ScalarVector, StructVector};
