//! Field descriptors for columnar type trees.
//!
//! A [`Field`] is one node of a type tree: a name, a nullability flag and a
//! [`FieldKind`]. Scalar kinds are leaves; `List`, `Struct` and `Map` own
//! their children, so the arity rules of each nested kind are carried by the
//! variant itself wherever the type system can express them.

use std::collections::HashSet;
use std::fmt;

use serde_json::{json, Map, Value};

use crate::error::SchemaError;

/// Name of the synthetic struct child backing a map.
pub const MAP_ENTRIES_NAME: &str = "entries";
/// Name of the key field inside map entries.
pub const MAP_KEY_NAME: &str = "key";
/// Name of the value field inside map entries.
pub const MAP_VALUE_NAME: &str = "value";

/// Precision of generated decimal fields.
pub const DECIMAL_PRECISION: u8 = 10;
/// Scale of generated decimal fields.
pub const DECIMAL_SCALE: i8 = 5;
/// Timezone carried by millisecond timestamps.
pub const TIMESTAMP_TIMEZONE: &str = "UTC";

/// Scalar (leaf) column kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Single bit boolean.
    Boolean,
    /// 32-bit signed integer.
    Int32,
    /// 32-bit unsigned integer.
    UInt32,
    /// 32-bit IEEE 754 float.
    Float32,
    /// 64-bit IEEE 754 float.
    Float64,
    /// Fixed precision and scale decimal, 128-bit storage.
    Decimal { precision: u8, scale: i8 },
    /// Days since the Unix epoch.
    DateDay,
    /// Milliseconds since the Unix epoch, date semantics.
    DateMilli,
    /// Milliseconds since the Unix epoch in [`TIMESTAMP_TIMEZONE`].
    TimestampMilliTz,
    /// Variable-length bytes.
    Binary,
    /// Variable-length UTF-8 text.
    Utf8,
}

impl ScalarKind {
    /// Every scalar kind, with the decimal at its generated precision and scale.
    pub const ALL: [ScalarKind; 11] = [
        ScalarKind::Boolean,
        ScalarKind::Int32,
        ScalarKind::UInt32,
        ScalarKind::Float32,
        ScalarKind::Float64,
        ScalarKind::Decimal {
            precision: DECIMAL_PRECISION,
            scale: DECIMAL_SCALE,
        },
        ScalarKind::DateDay,
        ScalarKind::DateMilli,
        ScalarKind::TimestampMilliTz,
        ScalarKind::Binary,
        ScalarKind::Utf8,
    ];

    /// Short type name used in rendering and error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarKind::Boolean => "Bool",
            ScalarKind::Int32 => "Int32",
            ScalarKind::UInt32 => "UInt32",
            ScalarKind::Float32 => "Float32",
            ScalarKind::Float64 => "Float64",
            ScalarKind::Decimal { .. } => "Decimal",
            ScalarKind::DateDay => "DateDay",
            ScalarKind::DateMilli => "DateMilli",
            ScalarKind::TimestampMilliTz => "TimestampMilliTz",
            ScalarKind::Binary => "Binary",
            ScalarKind::Utf8 => "Utf8",
        }
    }
}

/// Nested kind tags, used where only the shape matters (generator config).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NestedKind {
    List,
    Struct,
    Map,
}

impl NestedKind {
    /// Every nested kind.
    pub const ALL: [NestedKind; 3] = [NestedKind::List, NestedKind::Struct, NestedKind::Map];
}

/// The kind of a field together with its children.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Leaf value.
    Scalar(ScalarKind),
    /// Variable-length list of a single element field.
    List(Box<Field>),
    /// Ordered named children sharing the parent's positions.
    Struct(Vec<Field>),
    /// Flattened key/value entries; the boxed field is the `entries` struct.
    Map(Box<Field>),
}

/// A node in a type tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name, unique among struct siblings.
    pub name: String,
    /// Whether positions of this field may be null.
    pub nullable: bool,
    /// Kind and children.
    pub kind: FieldKind,
}

impl Field {
    /// Create a scalar field.
    pub fn scalar(name: impl Into<String>, kind: ScalarKind, nullable: bool) -> Self {
        Self {
            name: name.into(),
            nullable,
            kind: FieldKind::Scalar(kind),
        }
    }

    /// Create a list field with a single element field.
    pub fn list(name: impl Into<String>, nullable: bool, item: Field) -> Self {
        Self {
            name: name.into(),
            nullable,
            kind: FieldKind::List(Box::new(item)),
        }
    }

    /// Create a struct field.
    pub fn structure(name: impl Into<String>, nullable: bool, children: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            nullable,
            kind: FieldKind::Struct(children),
        }
    }

    /// Create a map field.
    ///
    /// The key and value are renamed to `key` / `value`, the key is forced
    /// non-nullable, and both are wrapped in a non-nullable `entries` struct.
    pub fn map(name: impl Into<String>, nullable: bool, key: Field, value: Field) -> Self {
        let key = Field {
            name: MAP_KEY_NAME.to_string(),
            nullable: false,
            kind: key.kind,
        };
        let value = Field {
            name: MAP_VALUE_NAME.to_string(),
            ..value
        };
        let entries = Field::structure(MAP_ENTRIES_NAME, false, vec![key, value]);
        Self {
            name: name.into(),
            nullable,
            kind: FieldKind::Map(Box::new(entries)),
        }
    }

    /// Whether this field is a list, struct or map.
    pub fn is_complex(&self) -> bool {
        !matches!(self.kind, FieldKind::Scalar(_))
    }

    /// Direct children, in declaration order.
    pub fn children(&self) -> &[Field] {
        match &self.kind {
            FieldKind::Scalar(_) => &[],
            FieldKind::List(item) => std::slice::from_ref(item.as_ref()),
            FieldKind::Struct(children) => children,
            FieldKind::Map(entries) => std::slice::from_ref(entries.as_ref()),
        }
    }

    /// Key and value fields of a map, if this is a well-formed map.
    pub fn map_key_value(&self) -> Option<(&Field, &Field)> {
        match &self.kind {
            FieldKind::Map(entries) => match &entries.kind {
                FieldKind::Struct(children) if children.len() == 2 => {
                    Some((&children[0], &children[1]))
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Type name of this node without its children.
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            FieldKind::Scalar(kind) => kind.type_name(),
            FieldKind::List(_) => "List",
            FieldKind::Struct(_) => "Struct",
            FieldKind::Map(_) => "Map",
        }
    }

    /// Nesting depth: 0 for scalars, 1 + deepest child otherwise.
    pub fn depth(&self) -> usize {
        match &self.kind {
            FieldKind::Scalar(_) => 0,
            _ => 1 + self.children().iter().map(Field::depth).max().unwrap_or(0),
        }
    }

    /// Check the structural invariants of the whole tree.
    ///
    /// Struct children must be non-empty with distinct names, and a map must
    /// hold a single `entries` struct of exactly `key` and `value`, with the
    /// key non-nullable.
    pub fn validate(&self) -> Result<(), SchemaError> {
        match &self.kind {
            FieldKind::Scalar(_) => Ok(()),
            FieldKind::List(item) => item.validate(),
            FieldKind::Struct(children) => {
                if children.is_empty() {
                    return Err(SchemaError::EmptyStruct(self.name.clone()));
                }
                let mut seen = HashSet::new();
                for child in children {
                    if !seen.insert(child.name.as_str()) {
                        return Err(SchemaError::DuplicateFieldName {
                            parent: self.name.clone(),
                            name: child.name.clone(),
                        });
                    }
                    child.validate()?;
                }
                Ok(())
            }
            FieldKind::Map(entries) => {
                let invalid = |message: &str| SchemaError::InvalidMapEntries {
                    field: self.name.clone(),
                    message: message.to_string(),
                };
                if entries.name != MAP_ENTRIES_NAME {
                    return Err(invalid("entries field must be named 'entries'"));
                }
                let FieldKind::Struct(children) = &entries.kind else {
                    return Err(invalid("entries must be a struct"));
                };
                if children.len() != 2 {
                    return Err(invalid("entries must have exactly two children"));
                }
                if children[0].name != MAP_KEY_NAME || children[1].name != MAP_VALUE_NAME {
                    return Err(invalid("entries children must be named 'key' and 'value'"));
                }
                if children[0].nullable {
                    return Err(SchemaError::NullableMapKey(self.name.clone()));
                }
                entries.validate()
            }
        }
    }

    /// Serialize the type tree to a JSON Value.
    pub fn to_json_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("name".to_string(), json!(&self.name));
        obj.insert("type".to_string(), json!(self.type_name()));
        obj.insert("nullable".to_string(), json!(self.nullable));

        match &self.kind {
            FieldKind::Scalar(ScalarKind::Decimal { precision, scale }) => {
                obj.insert("precision".to_string(), json!(precision));
                obj.insert("scale".to_string(), json!(scale));
            }
            FieldKind::Scalar(ScalarKind::TimestampMilliTz) => {
                obj.insert("timezone".to_string(), json!(TIMESTAMP_TIMEZONE));
            }
            FieldKind::Scalar(_) => {}
            _ => {
                let children: Vec<Value> =
                    self.children().iter().map(Field::to_json_value).collect();
                obj.insert("children".to_string(), Value::Array(children));
            }
        }

        Value::Object(obj)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.type_name())?;
        if let FieldKind::Scalar(ScalarKind::Decimal { precision, scale }) = &self.kind {
            write!(f, "({}, {})", precision, scale)?;
        }
        if self.is_complex() {
            write!(f, "<")?;
            for (i, child) in self.children().iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", child)?;
            }
            write!(f, ">")?;
        }
        if !self.nullable {
            write!(f, " not null")?;
        }
        Ok(())
    }
}
