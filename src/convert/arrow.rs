//! Field to Arrow/Polars type mapping
//!
//! | Field kind        | Polars Type                        |
//! |-------------------|------------------------------------|
//! | Boolean           | Boolean                            |
//! | Int32             | Int32                              |
//! | UInt32            | UInt32                             |
//! | Float32 / Float64 | Float32 / Float64                  |
//! | Decimal(p, s)     | Decimal(p, s)                      |
//! | DateDay           | Date                               |
//! | DateMilli         | Datetime(Milliseconds)             |
//! | TimestampMilliTz  | Datetime(Milliseconds, UTC)        |
//! | Binary            | Binary                             |
//! | Utf8              | String                             |
//! | List              | List                               |
//! | Struct            | Struct                             |
//! | Map               | List(Struct{key, value})           |

use polars::prelude::*;

use crate::schema::{self, FieldKind, ScalarKind};

/// Convert a field to a Polars DataType.
///
/// # Example
/// ```
/// use colwrite::convert::field_to_dtype;
/// use colwrite::schema::{Field, ScalarKind};
/// use polars::prelude::DataType;
///
/// let field = Field::scalar("a", ScalarKind::Int32, true);
/// assert_eq!(field_to_dtype(&field), DataType::Int32);
/// ```
pub fn field_to_dtype(field: &schema::Field) -> DataType {
    match &field.kind {
        FieldKind::Scalar(kind) => scalar_to_dtype(*kind),
        FieldKind::List(item) => DataType::List(Box::new(field_to_dtype(item))),
        FieldKind::Struct(children) => DataType::Struct(
            children
                .iter()
                .map(|child| Field::new(child.name.as_str().into(), field_to_dtype(child)))
                .collect(),
        ),
        // Map is represented as List of the entries struct
        FieldKind::Map(entries) => DataType::List(Box::new(field_to_dtype(entries))),
    }
}

/// Convert a scalar kind to a Polars DataType.
pub fn scalar_to_dtype(kind: ScalarKind) -> DataType {
    match kind {
        ScalarKind::Boolean => DataType::Boolean,
        ScalarKind::Int32 => DataType::Int32,
        ScalarKind::UInt32 => DataType::UInt32,
        ScalarKind::Float32 => DataType::Float32,
        ScalarKind::Float64 => DataType::Float64,
        ScalarKind::Decimal { precision, scale } => {
            DataType::Decimal(precision as usize, scale.max(0) as usize)
        }
        ScalarKind::DateDay => DataType::Date,
        // Polars dates are day-precision; millisecond dates keep their unit
        ScalarKind::DateMilli => DataType::Datetime(TimeUnit::Milliseconds, None),
        ScalarKind::TimestampMilliTz => {
            DataType::Datetime(TimeUnit::Milliseconds, Some(TimeZone::UTC))
        }
        ScalarKind::Binary => DataType::Binary,
        ScalarKind::Utf8 => DataType::String,
    }
}
