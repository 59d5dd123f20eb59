//! Random type trees and matching columnar data.
//!
//! [`FieldGenerator`] produces well-formed [`Field`](crate::schema::Field)
//! trees bounded by [`GeneratorConfig::max_depth`]; [`ValueGenerator`] fills
//! a [`ColumnVector`](crate::column::ColumnVector) for such a tree. Both are
//! seeded, so a failing case is reproduced from its seed alone.

mod config;
mod fields;
mod values;

pub use config::GeneratorConfig;
pub use fields::{FieldGenerator, NameSession};
pub use values::ValueGenerator;

use rand::Rng;

/// Random lowercase ASCII string with a length in `min..=max`.
pub(crate) fn random_lowercase<R: Rng + ?Sized>(rng: &mut R, min: usize, max: usize) -> String {
    let len = rng.gen_range(min..=max);
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}
