//! In-memory values decoded from (and written into) columnar vectors.

use std::fmt;

/// A decoded position of a columnar vector.
///
/// Nested positions decode recursively: lists to [`Value::List`], structs to
/// [`Value::Struct`] records, and map positions to a `List` of entry records
/// with `key` and `value` members. [`Value::Map`] only appears after a
/// resolver has turned those entry records into an [`EntryMap`].
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent position
    Null,
    /// Boolean value
    Boolean(bool),
    /// 32-bit signed integer
    Int32(i32),
    /// 32-bit unsigned integer
    UInt32(u32),
    /// 32-bit floating point
    Float32(f32),
    /// 64-bit floating point
    Float64(f64),
    /// Decimal as an unscaled integer and its scale
    Decimal {
        /// The unscaled value
        unscaled: i128,
        /// Digits after the decimal point
        scale: i8,
    },
    /// Days since Unix epoch
    DateDay(i32),
    /// Milliseconds since Unix epoch
    DateMilli(i64),
    /// Milliseconds since Unix epoch with a timezone
    TimestampMilliTz {
        /// Milliseconds since Unix epoch
        millis: i64,
        /// Timezone name
        timezone: String,
    },
    /// Byte array
    Binary(Vec<u8>),
    /// UTF-8 string
    Utf8(String),
    /// List elements
    List(Vec<Value>),
    /// Record keyed by field name
    Struct(Vec<(String, Value)>),
    /// Ordered key/value entries
    Map(EntryMap),
}

impl Value {
    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Bool",
            Value::Int32(_) => "Int32",
            Value::UInt32(_) => "UInt32",
            Value::Float32(_) => "Float32",
            Value::Float64(_) => "Float64",
            Value::Decimal { .. } => "Decimal",
            Value::DateDay(_) => "DateDay",
            Value::DateMilli(_) => "DateMilli",
            Value::TimestampMilliTz { .. } => "TimestampMilliTz",
            Value::Binary(_) => "Binary",
            Value::Utf8(_) => "Utf8",
            Value::List(_) => "List",
            Value::Struct(_) => "Struct",
            Value::Map(_) => "Map",
        }
    }

    /// Look up a member of a record by name.
    ///
    /// Returns `None` if this is not a record or has no such member.
    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(members) => members.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Floats compare bit-for-bit so that NaN payloads and signed zeros round trip exactly.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::UInt32(a), Value::UInt32(b)) => a == b,
            (Value::Float32(a), Value::Float32(b)) => a.to_bits() == b.to_bits(),
            (Value::Float64(a), Value::Float64(b)) => a.to_bits() == b.to_bits(),
            (
                Value::Decimal {
                    unscaled: a,
                    scale: sa,
                },
                Value::Decimal {
                    unscaled: b,
                    scale: sb,
                },
            ) => a == b && sa == sb,
            (Value::DateDay(a), Value::DateDay(b)) => a == b,
            (Value::DateMilli(a), Value::DateMilli(b)) => a == b,
            (
                Value::TimestampMilliTz {
                    millis: a,
                    timezone: ta,
                },
                Value::TimestampMilliTz {
                    millis: b,
                    timezone: tb,
                },
            ) => a == b && ta == tb,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Utf8(a), Value::Utf8(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Decimal { unscaled, scale } => write!(f, "{}e-{}", unscaled, scale),
            Value::DateDay(v) => write!(f, "day({})", v),
            Value::DateMilli(v) => write!(f, "date_ms({})", v),
            Value::TimestampMilliTz { millis, timezone } => {
                write!(f, "ts_ms({}, {})", millis, timezone)
            }
            Value::Binary(v) => write!(f, "{:?}", v),
            Value::Utf8(v) => write!(f, "{:?}", v),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Struct(members) => {
                write!(f, "{{")?;
                for (i, (name, value)) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, entry) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", entry.key, entry.value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// One key/value pair of a resolved map, tagged with its entry position.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    /// Position of the entry within its map
    pub index: usize,
    /// Entry key
    pub key: Value,
    /// Entry value
    pub value: Value,
}

/// Insertion-ordered key/value mapping keyed by entry position.
///
/// Keys are never merged: two entries whose keys compare equal stay two
/// entries, because they are distinct rows of the flattened map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryMap {
    entries: Vec<MapEntry>,
}

impl EntryMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its index.
    pub fn insert(&mut self, key: Value, value: Value) -> usize {
        let index = self.entries.len();
        self.entries.push(MapEntry { index, key, value });
        index
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of the first entry whose key equals `key`.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|entry| &entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, MapEntry> {
        self.entries.iter()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|entry| &entry.key)
    }
}

impl<'a> IntoIterator for &'a EntryMap {
    type Item = &'a MapEntry;
    type IntoIter = std::slice::Iter<'a, MapEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
