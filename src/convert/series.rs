//! Materialize column vectors as Polars Series.
//!
//! Scalars are collected into typed buffers and nested vectors are built from
//! their children, reusing the vector's own offsets for lists and maps. Absent
//! positions are applied last, as a validity mask.

use std::panic::{self, AssertUnwindSafe};

use polars::prelude::*;
use polars_arrow::array::{ArrayRef, ListArray, MutableBinaryViewArray};
use polars_arrow::offset::Offsets;
use tracing::{debug, warn};

use crate::column::{ColumnVector, ScalarVector, Value};
use crate::error::ConvertError;
use crate::schema::ScalarKind;

/// Convert a finalized vector into a Series named after its field.
///
/// Map vectors become `List(Struct{key, value})`.
pub fn to_series(vector: &ColumnVector) -> Result<Series, ConvertError> {
    let name = vector.field().name.as_str();
    let count = vector.value_count();
    let validity: Vec<bool> = (0..count).map(|i| vector.is_valid(i)).collect();

    let series = match vector {
        ColumnVector::Scalar(scalar) => {
            return scalar_series(vector, scalar, name, count, &validity);
        }
        ColumnVector::List(list) => {
            let inner = to_series(list.child())?;
            list_series(name, inner, list.offsets(), count)?
        }
        ColumnVector::Map(map) => {
            let entries = to_series(map.entries())?;
            list_series(name, entries, map.offsets(), count)?
        }
        ColumnVector::Struct(row) => {
            let children = row
                .children()
                .iter()
                .map(to_series)
                .collect::<Result<Vec<_>, _>>()?;
            StructChunked::from_series(name.into(), count, children.iter())
                .map_err(|e| ConvertError::InvalidData(format!("Failed to create struct: {}", e)))?
                .into_series()
        }
    };

    apply_validity(series, name, &validity)
}

fn list_series(
    name: &str,
    inner: Series,
    offsets: &[usize],
    count: usize,
) -> Result<Series, ConvertError> {
    if offsets.len() < count + 1 {
        return Err(ConvertError::InvalidData(format!(
            "List '{}' has {} offsets for {} values; value count not finalized",
            name,
            offsets.len(),
            count
        )));
    }
    let offsets: Vec<i64> = offsets[..=count].iter().map(|&o| o as i64).collect();

    // ListChunked stores its values in physical form; the logical inner
    // dtype is carried on the chunked array instead
    let inner_dtype = inner.dtype().clone();
    let physical = inner.to_physical_repr().rechunk();
    let values = physical.to_arrow(0, CompatLevel::newest());
    let list_arr = ListArray::<i64>::new(
        ListArray::<i64>::default_datatype(values.dtype().clone()),
        // SAFETY: vector offsets start at 0 and never decrease
        unsafe { Offsets::new_unchecked(offsets).into() },
        values,
        None,
    );

    // SAFETY: the values array is the physical layout of `inner_dtype`
    let list = unsafe {
        ListChunked::from_chunks_and_dtype(
            name.into(),
            vec![Box::new(list_arr) as ArrayRef],
            DataType::List(Box::new(inner_dtype)),
        )
    };
    Ok(list.into_series())
}

/// Null out absent positions, leaving the series untouched when all are present.
fn apply_validity(series: Series, name: &str, validity: &[bool]) -> Result<Series, ConvertError> {
    if validity.iter().all(|&v| v) {
        return Ok(series);
    }
    let mask = BooleanChunked::new("mask".into(), validity);
    let null_series = Series::full_null(name.into(), series.len(), series.dtype());
    let result = series
        .zip_with(&mask, &null_series)
        .map_err(|e| ConvertError::InvalidData(format!("Failed to apply null mask: {}", e)))?;
    Ok(result.with_name(name.into()))
}

/// Decode every position with `extract`, using the default for absent ones.
fn collect<T: Default>(
    vector: &ColumnVector,
    count: usize,
    extract: impl Fn(Value) -> Option<T>,
) -> Result<Vec<T>, ConvertError> {
    (0..count)
        .map(|i| Ok(extract(vector.get_object(i)?).unwrap_or_default()))
        .collect()
}

fn scalar_series(
    vector: &ColumnVector,
    scalar: &ScalarVector,
    name: &str,
    count: usize,
    validity: &[bool],
) -> Result<Series, ConvertError> {
    let series = match scalar.kind() {
        ScalarKind::Boolean => Series::new(
            name.into(),
            collect(vector, count, |v| match v {
                Value::Boolean(x) => Some(x),
                _ => None,
            })?,
        ),
        ScalarKind::Int32 => Series::new(
            name.into(),
            collect(vector, count, |v| match v {
                Value::Int32(x) => Some(x),
                _ => None,
            })?,
        ),
        ScalarKind::UInt32 => Series::new(
            name.into(),
            collect(vector, count, |v| match v {
                Value::UInt32(x) => Some(x),
                _ => None,
            })?,
        ),
        ScalarKind::Float32 => Series::new(
            name.into(),
            collect(vector, count, |v| match v {
                Value::Float32(x) => Some(x),
                _ => None,
            })?,
        ),
        ScalarKind::Float64 => Series::new(
            name.into(),
            collect(vector, count, |v| match v {
                Value::Float64(x) => Some(x),
                _ => None,
            })?,
        ),
        ScalarKind::Decimal { precision, scale } => {
            let values = collect(vector, count, |v| match v {
                Value::Decimal { unscaled, .. } => Some(unscaled),
                _ => None,
            })?;
            Int128Chunked::from_vec(name.into(), values)
                .into_decimal_unchecked(precision as usize, scale.max(0) as usize)
                .into_series()
        }
        ScalarKind::DateDay => {
            let values = collect(vector, count, |v| match v {
                Value::DateDay(x) => Some(x),
                _ => None,
            })?;
            Int32Chunked::new(name.into(), &values)
                .into_date()
                .into_series()
        }
        ScalarKind::DateMilli => {
            let values = collect(vector, count, |v| match v {
                Value::DateMilli(x) => Some(x),
                _ => None,
            })?;
            Int64Chunked::new(name.into(), &values)
                .into_datetime(TimeUnit::Milliseconds, None)
                .into_series()
        }
        ScalarKind::TimestampMilliTz => {
            let values = collect(vector, count, |v| match v {
                Value::TimestampMilliTz { millis, .. } => Some(millis),
                _ => None,
            })?;
            Int64Chunked::new(name.into(), &values)
                .into_datetime(TimeUnit::Milliseconds, Some(TimeZone::UTC))
                .into_series()
        }
        // Binary and String carry nulls in the builder itself
        ScalarKind::Binary => {
            let mut builder = MutableBinaryViewArray::<[u8]>::with_capacity(count);
            for index in 0..count {
                match vector.get_object(index)? {
                    Value::Binary(bytes) => builder.push_value(bytes.as_slice()),
                    _ => builder.push_null(),
                }
            }
            return Ok(BinaryChunked::with_chunk(name.into(), builder.freeze()).into_series());
        }
        ScalarKind::Utf8 => {
            let mut builder = MutableBinaryViewArray::<str>::with_capacity(count);
            for index in 0..count {
                match vector.get_object(index)? {
                    Value::Utf8(text) => builder.push_value(text.as_str()),
                    _ => builder.push_null(),
                }
            }
            return Ok(StringChunked::with_chunk(name.into(), builder.freeze()).into_series());
        }
    };

    apply_validity(series, name, validity)
}

/// Render a vector as a Polars table, falling back to a per-position dump
/// when it cannot be materialized.
///
/// Never panics: a panic inside Polars is caught and logged, and the dump
/// is returned instead.
pub fn render(vector: &ColumnVector) -> String {
    let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
        to_series(vector).map(|series| format!("{}", series))
    }));
    match rendered {
        Ok(Ok(table)) => table,
        Ok(Err(e)) => {
            debug!(field = %vector.field().name, error = %e, "Falling back to vector dump");
            vector.describe()
        }
        Err(_) => {
            warn!(field = %vector.field().name, "Polars panicked while rendering vector");
            vector.describe()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{GeneratorConfig, ValueGenerator};
    use crate::schema::Field;

    fn int_vector(values: &[Option<i32>]) -> ColumnVector {
        let field = Field::scalar("a", ScalarKind::Int32, true);
        let mut vector = ColumnVector::new(&field);
        let scalar = vector.as_scalar_mut().unwrap();
        for (i, value) in values.iter().enumerate() {
            match value {
                Some(v) => scalar.set_safe(i, &Value::Int32(*v)).unwrap(),
                None => scalar.set_null(i),
            }
        }
        vector.set_value_count(values.len());
        vector
    }

    #[test]
    fn test_scalar_series_with_nulls() {
        let series = to_series(&int_vector(&[Some(1), None, Some(3)])).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.null_count(), 1);
        assert_eq!(series.dtype(), &DataType::Int32);
        assert_eq!(series.name().as_str(), "a");
    }

    #[test]
    fn test_utf8_series() {
        let field = Field::scalar("s", ScalarKind::Utf8, true);
        let mut vector = ColumnVector::new(&field);
        let scalar = vector.as_scalar_mut().unwrap();
        scalar.set_safe(0, &Value::Utf8("abc".to_string())).unwrap();
        scalar.set_null(1);
        vector.set_value_count(2);

        let series = to_series(&vector).unwrap();
        assert_eq!(series.dtype(), &DataType::String);
        assert_eq!(series.null_count(), 1);
    }

    #[test]
    fn test_list_series() {
        let field = Field::list("l", true, Field::scalar("x", ScalarKind::Int32, true));
        let mut vector = ColumnVector::new(&field);
        {
            let list = vector.as_list_mut().unwrap();
            let start = list.start_new_value(0).unwrap();
            for k in 0..2 {
                list.child_mut()
                    .as_scalar_mut()
                    .unwrap()
                    .set_safe(start + k, &Value::Int32(k as i32))
                    .unwrap();
            }
            list.end_value(0, 2).unwrap();
        }
        vector.set_value_count(2);

        let series = to_series(&vector).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.dtype(), &DataType::List(Box::new(DataType::Int32)));
    }

    #[test]
    fn test_struct_series() {
        let field = Field::structure(
            "s",
            true,
            vec![
                Field::scalar("a", ScalarKind::Int32, true),
                Field::scalar("b", ScalarKind::Float64, true),
            ],
        );
        let mut vector = ColumnVector::new(&field);
        {
            let row = vector.as_struct_mut().unwrap();
            row.children_mut()[0]
                .as_scalar_mut()
                .unwrap()
                .set_safe(0, &Value::Int32(1))
                .unwrap();
            row.set_index_defined(0);
        }
        vector.set_value_count(1);

        let series = to_series(&vector).unwrap();
        assert_eq!(series.len(), 1);
        assert!(matches!(series.dtype(), DataType::Struct(fields) if fields.len() == 2));
    }

    /// Every scalar kind under a list, a struct and as a map value.
    fn nested_fields() -> Vec<Field> {
        ScalarKind::ALL
            .iter()
            .flat_map(|&kind| {
                [
                    Field::list("l", true, Field::scalar("x", kind, true)),
                    Field::structure(
                        "s",
                        true,
                        vec![
                            Field::list("inner", true, Field::scalar("y", kind, true)),
                            Field::scalar("z", kind, true),
                        ],
                    ),
                    Field::map(
                        "m",
                        true,
                        Field::scalar("k", ScalarKind::Int32, false),
                        Field::scalar("v", kind, true),
                    ),
                ]
            })
            .collect()
    }

    #[test]
    fn test_nested_logical_kinds_materialize() {
        for field in nested_fields() {
            for seed in 0..5 {
                let vector = ValueGenerator::new(GeneratorConfig::default(), seed)
                    .generate_values(&field)
                    .unwrap();
                let series = to_series(&vector)
                    .unwrap_or_else(|e| panic!("{} seed {}: {}", field, seed, e));
                assert_eq!(series.len(), vector.value_count(), "{}", field);
            }
        }
    }

    #[test]
    fn test_list_keeps_logical_inner_dtype() {
        let field = Field::list("l", true, Field::scalar("x", ScalarKind::DateMilli, true));
        let vector = ValueGenerator::new(GeneratorConfig::default(), 12)
            .generate_values(&field)
            .unwrap();
        let series = to_series(&vector).unwrap();
        assert_eq!(
            series.dtype(),
            &DataType::List(Box::new(DataType::Datetime(TimeUnit::Milliseconds, None)))
        );
    }

    #[test]
    fn test_render_nested_logical_kinds() {
        for field in nested_fields() {
            let vector = ValueGenerator::new(GeneratorConfig::default(), 3)
                .generate_values(&field)
                .unwrap();
            let rendered = render(&vector);
            // a rendered table carries the dtype header, the dump does not
            assert!(rendered.contains("shape:"), "{} fell back:\n{}", field, rendered);
        }
    }

    #[test]
    fn test_render_timestamp_with_timezone() {
        let field = Field::scalar("t", ScalarKind::TimestampMilliTz, false);
        let vector = ValueGenerator::new(GeneratorConfig::default(), 0)
            .generate_values(&field)
            .unwrap();
        let rendered = render(&vector);
        assert!(rendered.contains("shape:"), "{}", rendered);
        assert!(rendered.contains("UTC"));
    }

    #[test]
    fn test_render_contains_field_name() {
        let rendered = render(&int_vector(&[Some(42)]));
        assert!(rendered.contains('a'));
        assert!(rendered.contains("42"));
    }
}
