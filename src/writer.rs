//! Type-directed writer.
//!
//! Values are written by walking the destination's field tree, never by
//! inspecting the value's own shape: the field decides whether a value is
//! read as a list, a record or a map, and the resolver supplies the sub-value
//! of every struct child and map.

use tracing::trace;

use crate::column::{ColumnVector, Value};
use crate::error::WriteError;
use crate::resolver::FieldResolver;
use crate::schema::{Field, FieldKind};

/// Write a scalar value at `position`. `Value::Null` marks the position absent.
pub fn set_value(
    vector: &mut ColumnVector,
    position: usize,
    value: &Value,
) -> Result<(), WriteError> {
    match vector {
        ColumnVector::Scalar(scalar) => {
            scalar.set_safe(position, value)?;
            Ok(())
        }
        other => Err(mismatch(other.field(), "scalar value", value)),
    }
}

/// Write a list, struct or map value at `position`.
///
/// Struct children and maps are extracted through `resolver`; nested values
/// are written recursively.
pub fn set_complex_value<R: FieldResolver + ?Sized>(
    vector: &mut ColumnVector,
    position: usize,
    resolver: &R,
    value: &Value,
) -> Result<(), WriteError> {
    let field = vector.field().clone();
    if !field.is_complex() {
        return Err(mismatch(&field, "complex field", value));
    }
    write_at(&field, vector, position, resolver, value)
}

fn write_at<R: FieldResolver + ?Sized>(
    field: &Field,
    vector: &mut ColumnVector,
    position: usize,
    resolver: &R,
    value: &Value,
) -> Result<(), WriteError> {
    if value.is_null() {
        vector.set_null(position);
        return Ok(());
    }

    match &field.kind {
        FieldKind::Scalar(_) => set_value(vector, position, value),
        FieldKind::List(item) => {
            let Value::List(items) = value else {
                return Err(mismatch(field, "List", value));
            };
            let list = vector.as_list_mut()?;
            let start = list.start_new_value(position)?;
            for (offset, item_value) in items.iter().enumerate() {
                write_at(item, list.child_mut(), start + offset, resolver, item_value)?;
            }
            list.end_value(position, items.len())?;
            Ok(())
        }
        FieldKind::Struct(children) => {
            if !matches!(value, Value::Struct(_) | Value::Map(_)) {
                return Err(mismatch(field, "Struct", value));
            }
            let row = vector.as_struct_mut()?;
            for (child_field, child) in children.iter().zip(row.children_mut().iter_mut()) {
                let child_value = resolver.resolve_field(child_field, value)?;
                write_at(child_field, child, position, resolver, &child_value)?;
            }
            row.set_index_defined(position);
            Ok(())
        }
        FieldKind::Map(_) => write_map(field, vector, position, resolver, value),
    }
}

fn write_map<R: FieldResolver + ?Sized>(
    field: &Field,
    vector: &mut ColumnVector,
    position: usize,
    resolver: &R,
    value: &Value,
) -> Result<(), WriteError> {
    let resolved;
    let map = match value {
        Value::Map(map) => map,
        other => {
            resolved = resolver.resolve_field(field, other)?;
            match &resolved {
                Value::Map(map) => map,
                Value::Null => {
                    vector.set_null(position);
                    return Ok(());
                }
                found => return Err(mismatch(field, "Map", found)),
            }
        }
    };
    let Some((key_field, value_field)) = field.map_key_value() else {
        return Err(mismatch(field, "Map with key and value", value));
    };

    let map_vector = vector.as_map_mut()?;
    let start = map_vector.start_new_value(position)?;
    let entries = map_vector.entries_mut()?;
    let [keys, values] = entries.children_mut() else {
        return Err(mismatch(field, "Map with key and value", value));
    };
    for (offset, entry) in map.iter().enumerate() {
        write_at(key_field, keys, start + offset, resolver, &entry.key)?;
        write_at(value_field, values, start + offset, resolver, &entry.value)?;
    }
    for offset in 0..map.len() {
        entries.set_index_defined(start + offset);
    }
    map_vector.end_value(position, map.len())?;

    trace!(field = %field.name, position, entries = map.len(), "Wrote map");
    Ok(())
}

fn mismatch(field: &Field, expected: &str, found: &Value) -> WriteError {
    WriteError::TypeMismatch {
        field: field.name.clone(),
        expected: expected.to_string(),
        found: found.kind_name().to_string(),
    }
}
