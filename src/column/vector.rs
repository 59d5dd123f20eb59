//! Position-addressed columnar vectors.
//!
//! Every vector keeps a validity flag per position and an explicit value
//! count. Writes are "safe": writing past the current length grows storage,
//! and any positions skipped over become absent. The value count only moves
//! through [`ColumnVector::set_value_count`], which also settles the value
//! counts of children.
//!
//! Layout follows the usual columnar scheme:
//! - scalar vectors store one placeholder-or-value slot per position
//! - list and map vectors store `offsets[i]..offsets[i + 1]` into a single
//!   flattened child (maps into an `entries` struct of key and value)
//! - struct children share the parent's position indices

use std::ops::Range;

use crate::column::value::Value;
use crate::error::ColumnError;
use crate::schema::{Field, FieldKind, ScalarKind, TIMESTAMP_TIMEZONE};

/// A vector for any field kind.
#[derive(Debug, Clone)]
pub enum ColumnVector {
    /// Leaf values
    Scalar(ScalarVector),
    /// Variable-length lists over a flattened child
    List(ListVector),
    /// Records sharing positions with their children
    Struct(StructVector),
    /// Variable-length key/value entries over a flattened `entries` struct
    Map(MapVector),
}

impl ColumnVector {
    /// Allocate an empty vector tree for `field`.
    pub fn new(field: &Field) -> Self {
        match &field.kind {
            FieldKind::Scalar(kind) => ColumnVector::Scalar(ScalarVector::new(field, *kind)),
            FieldKind::List(item) => ColumnVector::List(ListVector::new(field, item)),
            FieldKind::Struct(children) => {
                ColumnVector::Struct(StructVector::new(field, children))
            }
            FieldKind::Map(entries) => ColumnVector::Map(MapVector::new(field, entries)),
        }
    }

    /// The field this vector was allocated from.
    pub fn field(&self) -> &Field {
        match self {
            ColumnVector::Scalar(v) => &v.field,
            ColumnVector::List(v) => &v.field,
            ColumnVector::Struct(v) => &v.field,
            ColumnVector::Map(v) => &v.field,
        }
    }

    /// Declared number of positions.
    pub fn value_count(&self) -> usize {
        match self {
            ColumnVector::Scalar(v) => v.value_count,
            ColumnVector::List(v) => v.value_count,
            ColumnVector::Struct(v) => v.value_count,
            ColumnVector::Map(v) => v.value_count,
        }
    }

    /// Finalize the number of positions, padding with absent positions or
    /// truncating, and settle children accordingly.
    pub fn set_value_count(&mut self, count: usize) {
        match self {
            ColumnVector::Scalar(v) => v.set_value_count(count),
            ColumnVector::List(v) => v.set_value_count(count),
            ColumnVector::Struct(v) => v.set_value_count(count),
            ColumnVector::Map(v) => v.set_value_count(count),
        }
    }

    /// Mark a position absent.
    pub fn set_null(&mut self, index: usize) {
        match self {
            ColumnVector::Scalar(v) => v.set_null(index),
            ColumnVector::List(v) => v.layout.set_null(index),
            ColumnVector::Struct(v) => v.set_null(index),
            ColumnVector::Map(v) => v.layout.set_null(index),
        }
    }

    /// Whether a position is present.
    pub fn is_valid(&self, index: usize) -> bool {
        match self {
            ColumnVector::Scalar(v) => flag(&v.validity, index),
            ColumnVector::List(v) => flag(&v.layout.validity, index),
            ColumnVector::Struct(v) => flag(&v.validity, index),
            ColumnVector::Map(v) => flag(&v.layout.validity, index),
        }
    }

    /// Decode a position into an in-memory value.
    pub fn get_object(&self, index: usize) -> Result<Value, ColumnError> {
        let value_count = self.value_count();
        if index >= value_count {
            return Err(ColumnError::OutOfRange { index, value_count });
        }
        match self {
            ColumnVector::Scalar(v) => v.get_object(index),
            ColumnVector::List(v) => v.get_object(index),
            ColumnVector::Struct(v) => v.get_object(index),
            ColumnVector::Map(v) => v.get_object(index),
        }
    }

    /// Deep structural equality.
    ///
    /// Fields, value counts, validity and offsets must match exactly, and
    /// present positions must hold equal values. Placeholders under absent
    /// positions are ignored.
    pub fn equals(&self, other: &ColumnVector) -> bool {
        match (self, other) {
            (ColumnVector::Scalar(a), ColumnVector::Scalar(b)) => a.equals(b),
            (ColumnVector::List(a), ColumnVector::List(b)) => a.equals(b),
            (ColumnVector::Struct(a), ColumnVector::Struct(b)) => a.equals(b),
            (ColumnVector::Map(a), ColumnVector::Map(b)) => a.equals(b),
            _ => false,
        }
    }

    pub fn as_scalar_mut(&mut self) -> Result<&mut ScalarVector, ColumnError> {
        match self {
            ColumnVector::Scalar(v) => Ok(v),
            other => Err(unsupported("scalar write", other)),
        }
    }

    pub fn as_list_mut(&mut self) -> Result<&mut ListVector, ColumnError> {
        match self {
            ColumnVector::List(v) => Ok(v),
            other => Err(unsupported("list entry", other)),
        }
    }

    pub fn as_struct_mut(&mut self) -> Result<&mut StructVector, ColumnError> {
        match self {
            ColumnVector::Struct(v) => Ok(v),
            other => Err(unsupported("struct row", other)),
        }
    }

    pub fn as_map_mut(&mut self) -> Result<&mut MapVector, ColumnError> {
        match self {
            ColumnVector::Map(v) => Ok(v),
            other => Err(unsupported("map entry", other)),
        }
    }

    /// Render every position, one per line, for diagnostics.
    pub fn describe(&self) -> String {
        let mut out = format!("{} [{} values]", self.field(), self.value_count());
        for index in 0..self.value_count() {
            match self.get_object(index) {
                Ok(value) => out.push_str(&format!("\n  {}: {}", index, value)),
                Err(e) => out.push_str(&format!("\n  {}: <{}>", index, e)),
            }
        }
        out
    }
}

fn unsupported(operation: &'static str, vector: &ColumnVector) -> ColumnError {
    ColumnError::UnsupportedOperation {
        operation,
        vector: vector.field().type_name().to_string(),
    }
}

/// Validity flag at `index`, absent beyond the stored length.
fn flag(validity: &[bool], index: usize) -> bool {
    validity.get(index).copied().unwrap_or(false)
}

// ============================================================================
// Scalar vectors
// ============================================================================

/// Typed storage for scalar vectors.
#[derive(Debug, Clone)]
enum ScalarData {
    Boolean(Vec<bool>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Decimal(Vec<i128>),
    DateDay(Vec<i32>),
    DateMilli(Vec<i64>),
    TimestampMilliTz(Vec<i64>),
    Binary(Vec<Vec<u8>>),
    Utf8(Vec<String>),
}

impl ScalarData {
    fn new(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Boolean => ScalarData::Boolean(Vec::new()),
            ScalarKind::Int32 => ScalarData::Int32(Vec::new()),
            ScalarKind::UInt32 => ScalarData::UInt32(Vec::new()),
            ScalarKind::Float32 => ScalarData::Float32(Vec::new()),
            ScalarKind::Float64 => ScalarData::Float64(Vec::new()),
            ScalarKind::Decimal { .. } => ScalarData::Decimal(Vec::new()),
            ScalarKind::DateDay => ScalarData::DateDay(Vec::new()),
            ScalarKind::DateMilli => ScalarData::DateMilli(Vec::new()),
            ScalarKind::TimestampMilliTz => ScalarData::TimestampMilliTz(Vec::new()),
            ScalarKind::Binary => ScalarData::Binary(Vec::new()),
            ScalarKind::Utf8 => ScalarData::Utf8(Vec::new()),
        }
    }

    /// Resize storage, filling new slots with the kind's zero placeholder.
    fn resize(&mut self, len: usize) {
        match self {
            ScalarData::Boolean(v) => v.resize(len, false),
            ScalarData::Int32(v) => v.resize(len, 0),
            ScalarData::UInt32(v) => v.resize(len, 0),
            ScalarData::Float32(v) => v.resize(len, 0.0),
            ScalarData::Float64(v) => v.resize(len, 0.0),
            ScalarData::Decimal(v) => v.resize(len, 0),
            ScalarData::DateDay(v) => v.resize(len, 0),
            ScalarData::DateMilli(v) => v.resize(len, 0),
            ScalarData::TimestampMilliTz(v) => v.resize(len, 0),
            ScalarData::Binary(v) => v.resize(len, Vec::new()),
            ScalarData::Utf8(v) => v.resize(len, String::new()),
        }
    }

    /// Store `value` at `index`; storage must already cover `index`.
    ///
    /// Returns `false` if the value kind does not match the storage kind.
    fn set(&mut self, index: usize, value: &Value) -> bool {
        match (self, value) {
            (ScalarData::Boolean(v), Value::Boolean(x)) => v[index] = *x,
            (ScalarData::Int32(v), Value::Int32(x)) => v[index] = *x,
            (ScalarData::UInt32(v), Value::UInt32(x)) => v[index] = *x,
            (ScalarData::Float32(v), Value::Float32(x)) => v[index] = *x,
            (ScalarData::Float64(v), Value::Float64(x)) => v[index] = *x,
            (ScalarData::Decimal(v), Value::Decimal { unscaled, .. }) => v[index] = *unscaled,
            (ScalarData::DateDay(v), Value::DateDay(x)) => v[index] = *x,
            (ScalarData::DateMilli(v), Value::DateMilli(x)) => v[index] = *x,
            (ScalarData::TimestampMilliTz(v), Value::TimestampMilliTz { millis, .. }) => {
                v[index] = *millis
            }
            (ScalarData::Binary(v), Value::Binary(x)) => v[index].clone_from(x),
            (ScalarData::Utf8(v), Value::Utf8(x)) => v[index].clone_from(x),
            _ => return false,
        }
        true
    }

    fn get(&self, index: usize, kind: ScalarKind) -> Value {
        match self {
            ScalarData::Boolean(v) => Value::Boolean(v[index]),
            ScalarData::Int32(v) => Value::Int32(v[index]),
            ScalarData::UInt32(v) => Value::UInt32(v[index]),
            ScalarData::Float32(v) => Value::Float32(v[index]),
            ScalarData::Float64(v) => Value::Float64(v[index]),
            ScalarData::Decimal(v) => {
                let scale = match kind {
                    ScalarKind::Decimal { scale, .. } => scale,
                    _ => 0,
                };
                Value::Decimal {
                    unscaled: v[index],
                    scale,
                }
            }
            ScalarData::DateDay(v) => Value::DateDay(v[index]),
            ScalarData::DateMilli(v) => Value::DateMilli(v[index]),
            ScalarData::TimestampMilliTz(v) => Value::TimestampMilliTz {
                millis: v[index],
                timezone: TIMESTAMP_TIMEZONE.to_string(),
            },
            ScalarData::Binary(v) => Value::Binary(v[index].clone()),
            ScalarData::Utf8(v) => Value::Utf8(v[index].clone()),
        }
    }

    fn eq_at(&self, other: &ScalarData, index: usize) -> bool {
        match (self, other) {
            (ScalarData::Boolean(a), ScalarData::Boolean(b)) => a[index] == b[index],
            (ScalarData::Int32(a), ScalarData::Int32(b)) => a[index] == b[index],
            (ScalarData::UInt32(a), ScalarData::UInt32(b)) => a[index] == b[index],
            (ScalarData::Float32(a), ScalarData::Float32(b)) => {
                a[index].to_bits() == b[index].to_bits()
            }
            (ScalarData::Float64(a), ScalarData::Float64(b)) => {
                a[index].to_bits() == b[index].to_bits()
            }
            (ScalarData::Decimal(a), ScalarData::Decimal(b)) => a[index] == b[index],
            (ScalarData::DateDay(a), ScalarData::DateDay(b)) => a[index] == b[index],
            (ScalarData::DateMilli(a), ScalarData::DateMilli(b)) => a[index] == b[index],
            (ScalarData::TimestampMilliTz(a), ScalarData::TimestampMilliTz(b)) => {
                a[index] == b[index]
            }
            (ScalarData::Binary(a), ScalarData::Binary(b)) => a[index] == b[index],
            (ScalarData::Utf8(a), ScalarData::Utf8(b)) => a[index] == b[index],
            _ => false,
        }
    }
}

/// Vector of a single scalar kind.
#[derive(Debug, Clone)]
pub struct ScalarVector {
    field: Field,
    kind: ScalarKind,
    data: ScalarData,
    validity: Vec<bool>,
    value_count: usize,
}

impl ScalarVector {
    fn new(field: &Field, kind: ScalarKind) -> Self {
        Self {
            field: field.clone(),
            kind,
            data: ScalarData::new(kind),
            validity: Vec::new(),
            value_count: 0,
        }
    }

    /// The scalar kind stored by this vector.
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Grow storage so `index` is addressable.
    fn ensure_len(&mut self, len: usize) {
        if self.validity.len() < len {
            self.validity.resize(len, false);
            self.data.resize(len);
        }
    }

    /// Store a value at `index`, growing storage as needed.
    ///
    /// `Value::Null` marks the position absent.
    pub fn set_safe(&mut self, index: usize, value: &Value) -> Result<(), ColumnError> {
        if value.is_null() {
            self.set_null(index);
            return Ok(());
        }
        match (self.kind, value) {
            (ScalarKind::Decimal { scale, .. }, Value::Decimal { scale: found, .. })
                if scale != *found =>
            {
                return Err(ColumnError::ScaleMismatch {
                    expected: scale,
                    found: *found,
                });
            }
            (ScalarKind::TimestampMilliTz, Value::TimestampMilliTz { timezone, .. })
                if timezone != TIMESTAMP_TIMEZONE =>
            {
                return Err(self.mismatch(value));
            }
            _ => {}
        }
        self.ensure_len(index + 1);
        if !self.data.set(index, value) {
            return Err(self.mismatch(value));
        }
        self.validity[index] = true;
        Ok(())
    }

    /// Mark `index` absent; the slot keeps a zero placeholder.
    pub fn set_null(&mut self, index: usize) {
        self.ensure_len(index + 1);
        self.validity[index] = false;
    }

    fn mismatch(&self, value: &Value) -> ColumnError {
        ColumnError::TypeMismatch {
            vector: self.kind.type_name().to_string(),
            value: value.kind_name().to_string(),
        }
    }

    fn set_value_count(&mut self, count: usize) {
        self.validity.resize(count, false);
        self.data.resize(count);
        self.value_count = count;
    }

    fn get_object(&self, index: usize) -> Result<Value, ColumnError> {
        if !flag(&self.validity, index) {
            return Ok(Value::Null);
        }
        Ok(self.data.get(index, self.kind))
    }

    fn equals(&self, other: &ScalarVector) -> bool {
        if self.field != other.field || self.value_count != other.value_count {
            return false;
        }
        (0..self.value_count).all(|i| {
            let valid = flag(&self.validity, i);
            valid == flag(&other.validity, i) && (!valid || self.data.eq_at(&other.data, i))
        })
    }
}

// ============================================================================
// Offset layout shared by list and map vectors
// ============================================================================

/// Per-position validity and offsets into a flattened child.
///
/// Invariant: `offsets.len() == validity.len() + 1` and offsets never decrease.
#[derive(Debug, Clone)]
struct OffsetLayout {
    validity: Vec<bool>,
    offsets: Vec<usize>,
}

impl OffsetLayout {
    fn new() -> Self {
        Self {
            validity: Vec::new(),
            offsets: vec![0],
        }
    }

    fn end_offset(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    /// Fill positions before `index` as absent, zero-length entries.
    fn fill_to(&mut self, index: usize) {
        while self.validity.len() < index {
            let end = self.end_offset();
            self.validity.push(false);
            self.offsets.push(end);
        }
    }

    /// Drop `index` and everything after it.
    fn truncate(&mut self, index: usize) {
        self.validity.truncate(index);
        self.offsets.truncate(index + 1);
    }

    /// Entries are written in position order; reopening an earlier
    /// position would orphan every entry after it.
    fn check_order(&self, index: usize) -> Result<(), ColumnError> {
        let written = self.validity.len();
        if index < written {
            return Err(ColumnError::OutOfOrder { index, written });
        }
        Ok(())
    }

    fn start_new_value(&mut self, index: usize) -> Result<usize, ColumnError> {
        self.check_order(index)?;
        self.fill_to(index);
        Ok(self.offsets[index])
    }

    fn end_value(&mut self, index: usize, size: usize) -> Result<(), ColumnError> {
        self.check_order(index)?;
        self.fill_to(index);
        let start = self.offsets[index];
        self.validity.push(true);
        self.offsets.push(start + size);
        Ok(())
    }

    /// A null written over an existing position keeps its element range.
    fn set_null(&mut self, index: usize) {
        if index < self.validity.len() {
            self.validity[index] = false;
            return;
        }
        self.fill_to(index);
        let end = self.end_offset();
        self.validity.push(false);
        self.offsets.push(end);
    }

    fn set_value_count(&mut self, count: usize) -> usize {
        self.fill_to(count);
        self.truncate(count);
        self.end_offset()
    }

    fn range(&self, index: usize) -> Range<usize> {
        self.offsets[index]..self.offsets[index + 1]
    }

    fn equals(&self, other: &OffsetLayout, count: usize) -> bool {
        (0..count).all(|i| {
            flag(&self.validity, i) == flag(&other.validity, i)
                && self.range(i) == other.range(i)
        })
    }
}

// ============================================================================
// List vectors
// ============================================================================

/// Variable-length lists over a single flattened child vector.
#[derive(Debug, Clone)]
pub struct ListVector {
    field: Field,
    layout: OffsetLayout,
    child: Box<ColumnVector>,
    value_count: usize,
}

impl ListVector {
    fn new(field: &Field, item: &Field) -> Self {
        Self {
            field: field.clone(),
            layout: OffsetLayout::new(),
            child: Box::new(ColumnVector::new(item)),
            value_count: 0,
        }
    }

    /// Open the list at `index` and return the child position its first
    /// element goes to. Earlier unwritten positions become absent.
    ///
    /// Positions must be opened in increasing order; an index below the
    /// positions already written is rejected with [`ColumnError::OutOfOrder`].
    pub fn start_new_value(&mut self, index: usize) -> Result<usize, ColumnError> {
        self.layout.start_new_value(index)
    }

    /// Close the list at `index` with `size` elements and mark it present.
    pub fn end_value(&mut self, index: usize, size: usize) -> Result<(), ColumnError> {
        self.layout.end_value(index, size)
    }

    /// The flattened element vector.
    pub fn child(&self) -> &ColumnVector {
        &self.child
    }

    pub fn child_mut(&mut self) -> &mut ColumnVector {
        &mut self.child
    }

    /// Child positions covered by the list at `index`.
    pub fn element_range(&self, index: usize) -> Range<usize> {
        self.layout.range(index)
    }

    /// Offsets of every position, `value_count + 1` entries once finalized.
    pub fn offsets(&self) -> &[usize] {
        &self.layout.offsets
    }

    fn set_value_count(&mut self, count: usize) {
        let end = self.layout.set_value_count(count);
        self.child.set_value_count(end);
        self.value_count = count;
    }

    fn get_object(&self, index: usize) -> Result<Value, ColumnError> {
        if !flag(&self.layout.validity, index) {
            return Ok(Value::Null);
        }
        let items = self
            .layout
            .range(index)
            .map(|i| self.child.get_object(i))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::List(items))
    }

    fn equals(&self, other: &ListVector) -> bool {
        self.field == other.field
            && self.value_count == other.value_count
            && self.layout.equals(&other.layout, self.value_count)
            && self.child.equals(&other.child)
    }
}

// ============================================================================
// Struct vectors
// ============================================================================

/// Records whose children share the parent's position indices.
#[derive(Debug, Clone)]
pub struct StructVector {
    field: Field,
    validity: Vec<bool>,
    children: Vec<ColumnVector>,
    value_count: usize,
}

impl StructVector {
    fn new(field: &Field, children: &[Field]) -> Self {
        Self {
            field: field.clone(),
            validity: Vec::new(),
            children: children.iter().map(ColumnVector::new).collect(),
            value_count: 0,
        }
    }

    /// Mark the row at `index` present.
    pub fn set_index_defined(&mut self, index: usize) {
        if self.validity.len() <= index {
            self.validity.resize(index + 1, false);
        }
        self.validity[index] = true;
    }

    /// Mark the row at `index` absent, along with every child at `index`.
    pub fn set_null(&mut self, index: usize) {
        if self.validity.len() <= index {
            self.validity.resize(index + 1, false);
        }
        self.validity[index] = false;
        for child in &mut self.children {
            child.set_null(index);
        }
    }

    pub fn children(&self) -> &[ColumnVector] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [ColumnVector] {
        &mut self.children
    }

    fn set_value_count(&mut self, count: usize) {
        self.validity.resize(count, false);
        for child in &mut self.children {
            child.set_value_count(count);
        }
        self.value_count = count;
    }

    fn get_object(&self, index: usize) -> Result<Value, ColumnError> {
        if !flag(&self.validity, index) {
            return Ok(Value::Null);
        }
        let members = self
            .children
            .iter()
            .map(|child| Ok((child.field().name.clone(), child.get_object(index)?)))
            .collect::<Result<Vec<_>, ColumnError>>()?;
        Ok(Value::Struct(members))
    }

    fn equals(&self, other: &StructVector) -> bool {
        self.field == other.field
            && self.value_count == other.value_count
            && (0..self.value_count)
                .all(|i| flag(&self.validity, i) == flag(&other.validity, i))
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|(a, b)| a.equals(b))
    }
}

// ============================================================================
// Map vectors
// ============================================================================

/// Variable-length key/value entries over a flattened `entries` struct.
#[derive(Debug, Clone)]
pub struct MapVector {
    field: Field,
    layout: OffsetLayout,
    entries: Box<ColumnVector>,
    value_count: usize,
}

impl MapVector {
    fn new(field: &Field, entries: &Field) -> Self {
        Self {
            field: field.clone(),
            layout: OffsetLayout::new(),
            entries: Box::new(ColumnVector::new(entries)),
            value_count: 0,
        }
    }

    /// Open the map at `index` and return the entry position its first
    /// key/value pair goes to.
    pub fn start_new_value(&mut self, index: usize) -> Result<usize, ColumnError> {
        self.layout.start_new_value(index)
    }

    /// Close the map at `index` with `size` entries and mark it present.
    pub fn end_value(&mut self, index: usize, size: usize) -> Result<(), ColumnError> {
        self.layout.end_value(index, size)
    }

    /// The `entries` vector.
    pub fn entries(&self) -> &ColumnVector {
        &self.entries
    }

    /// The `entries` struct, for writing keys and values.
    pub fn entries_mut(&mut self) -> Result<&mut StructVector, ColumnError> {
        self.entries.as_struct_mut()
    }

    /// Entry positions covered by the map at `index`.
    pub fn entry_range(&self, index: usize) -> Range<usize> {
        self.layout.range(index)
    }

    pub fn offsets(&self) -> &[usize] {
        &self.layout.offsets
    }

    fn set_value_count(&mut self, count: usize) {
        let end = self.layout.set_value_count(count);
        self.entries.set_value_count(end);
        self.value_count = count;
    }

    fn get_object(&self, index: usize) -> Result<Value, ColumnError> {
        if !flag(&self.layout.validity, index) {
            return Ok(Value::Null);
        }
        let entries = self
            .layout
            .range(index)
            .map(|i| self.entries.get_object(i))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::List(entries))
    }

    fn equals(&self, other: &MapVector) -> bool {
        self.field == other.field
            && self.value_count == other.value_count
            && self.layout.equals(&other.layout, self.value_count)
            && self.entries.equals(&other.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_field(name: &str) -> Field {
        Field::scalar(name, ScalarKind::Int32, true)
    }

    #[test]
    fn test_scalar_set_safe_grows_and_fills_absent() {
        let mut vector = ColumnVector::new(&int_field("a"));
        let scalar = vector.as_scalar_mut().unwrap();
        scalar.set_safe(2, &Value::Int32(7)).unwrap();
        vector.set_value_count(3);

        assert_eq!(vector.value_count(), 3);
        assert_eq!(vector.get_object(0).unwrap(), Value::Null);
        assert_eq!(vector.get_object(1).unwrap(), Value::Null);
        assert_eq!(vector.get_object(2).unwrap(), Value::Int32(7));
        assert!(matches!(
            vector.get_object(3),
            Err(ColumnError::OutOfRange { index: 3, value_count: 3 })
        ));
    }

    #[test]
    fn test_scalar_type_mismatch() {
        let mut vector = ColumnVector::new(&int_field("a"));
        let err = vector
            .as_scalar_mut()
            .unwrap()
            .set_safe(0, &Value::Utf8("x".to_string()))
            .unwrap_err();
        assert!(matches!(err, ColumnError::TypeMismatch { .. }));
    }

    #[test]
    fn test_decimal_scale_mismatch() {
        let field = Field::scalar(
            "d",
            ScalarKind::Decimal {
                precision: 10,
                scale: 5,
            },
            true,
        );
        let mut vector = ColumnVector::new(&field);
        let err = vector
            .as_scalar_mut()
            .unwrap()
            .set_safe(
                0,
                &Value::Decimal {
                    unscaled: 1,
                    scale: 2,
                },
            )
            .unwrap_err();
        assert_eq!(
            err,
            ColumnError::ScaleMismatch {
                expected: 5,
                found: 2
            }
        );
    }

    #[test]
    fn test_list_offsets_with_null_position() {
        let field = Field::list("l", true, int_field("item"));
        let mut vector = ColumnVector::new(&field);
        {
            let list = vector.as_list_mut().unwrap();
            let start = list.start_new_value(0).unwrap();
            assert_eq!(start, 0);
            for i in 0..2 {
                list.child_mut()
                    .as_scalar_mut()
                    .unwrap()
                    .set_safe(start + i, &Value::Int32(i as i32))
                    .unwrap();
            }
            list.end_value(0, 2).unwrap();
            // position 1 skipped: becomes null with an empty range
            let start = list.start_new_value(2).unwrap();
            assert_eq!(start, 2);
            list.child_mut()
                .as_scalar_mut()
                .unwrap()
                .set_safe(start, &Value::Int32(9))
                .unwrap();
            list.end_value(2, 1).unwrap();
        }
        vector.set_value_count(4);

        let ColumnVector::List(list) = &vector else {
            panic!("expected list vector");
        };
        assert_eq!(list.offsets(), &[0, 2, 2, 3, 3]);
        assert_eq!(list.child().value_count(), 3);
        assert_eq!(
            vector.get_object(0).unwrap(),
            Value::List(vec![Value::Int32(0), Value::Int32(1)])
        );
        assert_eq!(vector.get_object(1).unwrap(), Value::Null);
        assert_eq!(vector.get_object(2).unwrap(), Value::List(vec![Value::Int32(9)]));
        assert_eq!(vector.get_object(3).unwrap(), Value::Null);
    }

    #[test]
    fn test_reopening_earlier_list_position_is_rejected() {
        let field = Field::list("l", true, int_field("item"));
        let mut vector = ColumnVector::new(&field);
        let list = vector.as_list_mut().unwrap();
        for index in 0..2 {
            let start = list.start_new_value(index).unwrap();
            list.child_mut()
                .as_scalar_mut()
                .unwrap()
                .set_safe(start, &Value::Int32(index as i32))
                .unwrap();
            list.end_value(index, 1).unwrap();
        }

        assert_eq!(
            list.start_new_value(0),
            Err(ColumnError::OutOfOrder { index: 0, written: 2 })
        );
        assert_eq!(
            list.end_value(1, 3),
            Err(ColumnError::OutOfOrder { index: 1, written: 2 })
        );
        // the rejected calls left both positions intact
        assert_eq!(list.offsets(), &[0, 1, 2]);
        vector.set_value_count(2);
        assert_eq!(vector.get_object(1).unwrap(), Value::List(vec![Value::Int32(1)]));
    }

    #[test]
    fn test_struct_value_count_cascades() {
        let field = Field::structure("s", true, vec![int_field("a"), int_field("b")]);
        let mut vector = ColumnVector::new(&field);
        {
            let row = vector.as_struct_mut().unwrap();
            row.children_mut()[0]
                .as_scalar_mut()
                .unwrap()
                .set_safe(0, &Value::Int32(1))
                .unwrap();
            row.set_index_defined(0);
            row.set_index_defined(1);
        }
        vector.set_value_count(2);

        let ColumnVector::Struct(row) = &vector else {
            panic!("expected struct vector");
        };
        assert!(row.children().iter().all(|c| c.value_count() == 2));
        assert_eq!(
            vector.get_object(1).unwrap(),
            Value::Struct(vec![
                ("a".to_string(), Value::Null),
                ("b".to_string(), Value::Null)
            ])
        );
    }

    #[test]
    fn test_map_decodes_to_entry_records() {
        let field = Field::map(
            "m",
            true,
            int_field("k"),
            Field::scalar("v", ScalarKind::Utf8, true),
        );
        let mut vector = ColumnVector::new(&field);
        {
            let map = vector.as_map_mut().unwrap();
            let start = map.start_new_value(0).unwrap();
            let entries = map.entries_mut().unwrap();
            entries.children_mut()[0]
                .as_scalar_mut()
                .unwrap()
                .set_safe(start, &Value::Int32(1))
                .unwrap();
            entries.children_mut()[1]
                .as_scalar_mut()
                .unwrap()
                .set_safe(start, &Value::Utf8("one".to_string()))
                .unwrap();
            entries.set_index_defined(start);
            map.end_value(0, 1).unwrap();
        }
        vector.set_value_count(1);

        assert_eq!(
            vector.get_object(0).unwrap(),
            Value::List(vec![Value::Struct(vec![
                ("key".to_string(), Value::Int32(1)),
                ("value".to_string(), Value::Utf8("one".to_string())),
            ])])
        );
    }

    #[test]
    fn test_equals_ignores_placeholders_under_nulls() {
        let field = int_field("a");
        let mut a = ColumnVector::new(&field);
        let mut b = ColumnVector::new(&field);
        a.as_scalar_mut().unwrap().set_safe(0, &Value::Int32(5)).unwrap();
        a.set_null(0);
        b.set_null(0);
        a.set_value_count(1);
        b.set_value_count(1);
        assert!(a.equals(&b));
    }

    #[test]
    fn test_equals_detects_value_and_schema_differences() {
        let field = int_field("a");
        let mut a = ColumnVector::new(&field);
        let mut b = ColumnVector::new(&field);
        a.as_scalar_mut().unwrap().set_safe(0, &Value::Int32(1)).unwrap();
        b.as_scalar_mut().unwrap().set_safe(0, &Value::Int32(2)).unwrap();
        a.set_value_count(1);
        b.set_value_count(1);
        assert!(!a.equals(&b));

        let mut c = ColumnVector::new(&int_field("other"));
        c.as_scalar_mut().unwrap().set_safe(0, &Value::Int32(1)).unwrap();
        c.set_value_count(1);
        assert!(!a.equals(&c));
    }
}
