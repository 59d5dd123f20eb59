//! Type trees for columnar values.
//!
//! This module defines the field descriptor model: scalar kinds, the nested
//! list/struct/map kinds, structural validation and JSON rendering.

mod types;

pub use types::*;
