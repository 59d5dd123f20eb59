//! Error types for type trees, columnar vectors, writing and round trips

use thiserror::Error;

/// Structural invariant violations in a type tree.
///
/// Generated trees are correct by construction; seeing one of these from a
/// generated tree is an implementation defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two siblings of a struct share a name
    #[error("Duplicate field name '{name}' in struct '{parent}'")]
    DuplicateFieldName { parent: String, name: String },
    /// A struct declared no children
    #[error("Struct '{0}' has no children")]
    EmptyStruct(String),
    /// Map entries are not a two-field struct named key/value
    #[error("Invalid map entries for '{field}': {message}")]
    InvalidMapEntries { field: String, message: String },
    /// Map key declared nullable
    #[error("Map key of '{0}' must not be nullable")]
    NullableMapKey(String),
}

/// Misuse of the columnar vector API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColumnError {
    /// Value kind does not match the vector kind
    #[error("Type mismatch: {vector} vector cannot store {value}")]
    TypeMismatch { vector: String, value: String },
    /// Read past the declared value count
    #[error("Position {index} out of range for value count {value_count}")]
    OutOfRange { index: usize, value_count: usize },
    /// Operation applied to a vector kind that does not support it
    #[error("Unsupported operation '{operation}' on {vector} vector")]
    UnsupportedOperation {
        operation: &'static str,
        vector: String,
    },
    /// List or map entry opened behind positions already written
    #[error("Position {index} is behind the {written} positions already written")]
    OutOfOrder { index: usize, written: usize },
    /// Decimal value with a scale different from the vector's
    #[error("Decimal scale mismatch: vector scale {expected}, value scale {found}")]
    ScaleMismatch { expected: i8, found: i8 },
}

/// Errors raised by the type-directed writer and by resolvers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WriteError {
    /// The value shape cannot be mapped onto the declared type
    #[error("Type mismatch for field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
    /// Map entry record is missing its key or value
    #[error("Map entry for field '{field}' has no '{entry}' member")]
    MissingEntryMember { field: String, entry: &'static str },
    /// Underlying vector rejected the write
    #[error("Column error: {0}")]
    Column(#[from] ColumnError),
}

/// Errors raised while materializing vectors as polars Series.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Vector contents could not be converted
    #[error("Conversion error: {0}")]
    InvalidData(String),
    /// Polars error during Series creation
    #[error("Polars error: {0}")]
    Polars(String),
    /// Vector could not be decoded
    #[error("Column error: {0}")]
    Column(#[from] ColumnError),
}

impl From<polars::prelude::PolarsError> for ConvertError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ConvertError::Polars(err.to_string())
    }
}

/// Which stage of a round trip failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Source population failed or produced an invalid tree
    Generation,
    /// The writer rejected a value
    Write,
    /// Writing succeeded but the destination differs from the source
    Mismatch,
}

/// Renderings attached to a failed round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostic {
    /// Type tree as JSON
    pub schema: String,
    /// Source vector, one position per line
    pub source: String,
    /// Destination vector, one position per line (empty if never allocated)
    pub destination: String,
}

/// Outcome of a failed round trip.
#[derive(Debug, Clone, Error)]
pub enum RoundTripError {
    /// The source could not be generated
    #[error("Generation failed: {message}")]
    Generation {
        message: String,
        diagnostic: Diagnostic,
    },
    /// Writing the value at `position` failed
    #[error("Write failed at position {position}: {cause}")]
    Write {
        position: usize,
        #[source]
        cause: WriteError,
        diagnostic: Diagnostic,
    },
    /// Destination differs from source
    #[error("Round trip mismatch")]
    Mismatch { diagnostic: Diagnostic },
}

impl RoundTripError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RoundTripError::Generation { .. } => FailureKind::Generation,
            RoundTripError::Write { .. } => FailureKind::Write,
            RoundTripError::Mismatch { .. } => FailureKind::Mismatch,
        }
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        match self {
            RoundTripError::Generation { diagnostic, .. }
            | RoundTripError::Write { diagnostic, .. }
            | RoundTripError::Mismatch { diagnostic } => diagnostic,
        }
    }
}
