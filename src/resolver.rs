//! Field resolvers.
//!
//! A resolver extracts the sub-value belonging to a field from a decoded
//! container. The writer calls it for every struct child and for every map,
//! so callers can feed it records, generic keyed mappings or values that are
//! already in the expected shape.

use crate::column::{EntryMap, Value};
use crate::error::WriteError;
use crate::schema::{Field, FieldKind, MAP_KEY_NAME, MAP_VALUE_NAME};

/// Extracts the value relevant to `field` from a container value.
///
/// Implementations must be pure: the result depends only on the arguments.
pub trait FieldResolver {
    /// Return the value of `field` within `container`.
    fn resolve_field(&self, field: &Field, container: &Value) -> Result<Value, WriteError>;
}

impl<R: FieldResolver + ?Sized> FieldResolver for &R {
    fn resolve_field(&self, field: &Field, container: &Value) -> Result<Value, WriteError> {
        (**self).resolve_field(field, container)
    }
}

/// Resolver for values decoded from column vectors.
///
/// - Records ([`Value::Struct`]) are looked up by field name; a missing
///   member resolves to `Null`.
/// - Keyed mappings ([`Value::Map`]) are looked up by a `Utf8` key equal to
///   the field name. For a map field without such a key the mapping is taken
///   to be the field's own value.
/// - Map fields turn a list of `{key, value}` entry records into an
///   [`EntryMap`], one entry per record, so equal keys never merge.
/// - Anything else is already the field's value and passes through.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnarResolver;

impl ColumnarResolver {
    pub fn new() -> Self {
        Self
    }
}

impl FieldResolver for ColumnarResolver {
    fn resolve_field(&self, field: &Field, container: &Value) -> Result<Value, WriteError> {
        if let FieldKind::Map(_) = field.kind {
            let name_key = Value::Utf8(field.name.clone());
            let input = match container {
                Value::Struct(_) => container.member(&field.name).unwrap_or(&Value::Null),
                // a keyed container holding the field; otherwise the map itself
                Value::Map(map) => map.get(&name_key).unwrap_or(container),
                other => other,
            };
            return entries_to_map(field, input);
        }

        let resolved = match container {
            Value::Struct(_) => container.member(&field.name).cloned(),
            Value::Map(map) => map.get(&Value::Utf8(field.name.clone())).cloned(),
            other => Some(other.clone()),
        };
        Ok(resolved.unwrap_or(Value::Null))
    }
}

/// Build an ordered mapping from decoded map entries.
fn entries_to_map(field: &Field, input: &Value) -> Result<Value, WriteError> {
    match input {
        Value::Null | Value::Map(_) => Ok(input.clone()),
        Value::List(entries) => {
            let mut map = EntryMap::new();
            for entry in entries {
                let key = entry
                    .member(MAP_KEY_NAME)
                    .ok_or_else(|| WriteError::MissingEntryMember {
                        field: field.name.clone(),
                        entry: MAP_KEY_NAME,
                    })?;
                let value = entry
                    .member(MAP_VALUE_NAME)
                    .ok_or_else(|| WriteError::MissingEntryMember {
                        field: field.name.clone(),
                        entry: MAP_VALUE_NAME,
                    })?;
                map.insert(key.clone(), value.clone());
            }
            Ok(Value::Map(map))
        }
        other => Err(WriteError::TypeMismatch {
            field: field.name.clone(),
            expected: "List of map entries".to_string(),
            found: other.kind_name().to_string(),
        }),
    }
}
