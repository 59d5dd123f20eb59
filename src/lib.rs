//! Type-directed columnar value writer with randomized round-trip verification
//!
//! This library copies scalar and arbitrarily nested values (lists, structs,
//! maps) into column-oriented vectors, dispatching on a declared field tree
//! rather than on the shape of the incoming value. Around the writer it
//! provides random type-tree and value generation, a pluggable resolver for
//! heterogeneous decoded values, and a round-trip harness that checks the
//! writer reproduces its input exactly.
//!
//! # Example
//!
//! ```
//! use colwrite::{FieldGenerator, GeneratorConfig, NameSession, RoundTripHarness};
//!
//! let session = NameSession::new();
//! let harness = RoundTripHarness::default();
//! for seed in 0..10 {
//!     let field = FieldGenerator::new(GeneratorConfig::default(), session.clone(), seed).generate();
//!     assert!(harness.check(&field, seed).is_ok());
//! }
//! ```

pub mod column;
pub mod convert;
pub mod error;
pub mod generate;
pub mod harness;
pub mod resolver;
pub mod schema;
pub mod writer;

// Re-export main types
pub use column::{ColumnVector, EntryMap, MapEntry, Value};
pub use convert::{field_to_dtype, to_series};
pub use error::{
    ColumnError, ConvertError, Diagnostic, FailureKind, RoundTripError, SchemaError, WriteError,
};
pub use generate::{FieldGenerator, GeneratorConfig, NameSession, ValueGenerator};
pub use harness::{case_strategy, field_strategy, round_trip_holds, RoundTripHarness};
pub use resolver::{ColumnarResolver, FieldResolver};
pub use schema::{Field, FieldKind, NestedKind, ScalarKind};
pub use writer::{set_complex_value, set_value};
