//! Random columnar data for a type tree.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::column::{ColumnVector, Value};
use crate::error::ColumnError;
use crate::generate::{random_lowercase, GeneratorConfig};
use crate::schema::{Field, FieldKind, ScalarKind, TIMESTAMP_TIMEZONE};

/// Largest generated millisecond instant, 9999-12-31T23:59:59.999Z.
const MAX_EPOCH_MILLIS: i64 = 253_402_300_799_999;
/// Largest generated decimal magnitude, before scaling.
const DECIMAL_BOUND: i128 = 99_999;

/// Populates vectors with random values that respect their field's rules.
///
/// Population is append-only: every call starts at the vector's current
/// value count and returns the new one. A requested count of `0` picks a
/// random count in `1..=max_count`.
pub struct ValueGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl ValueGenerator {
    pub fn new(config: GeneratorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Allocate a vector for `field` and populate a random number of positions.
    pub fn generate_values(&mut self, field: &Field) -> Result<ColumnVector, ColumnError> {
        let mut vector = ColumnVector::new(field);
        self.populate(field, &mut vector, 0)?;
        Ok(vector)
    }

    /// Append `count` positions (random when `0`) and return the new value count.
    pub fn populate(
        &mut self,
        field: &Field,
        vector: &mut ColumnVector,
        count: usize,
    ) -> Result<usize, ColumnError> {
        match &field.kind {
            FieldKind::Scalar(kind) => self.populate_scalar(field, *kind, vector, count),
            FieldKind::List(item) => self.populate_list(field, item, vector, count),
            FieldKind::Struct(children) => self.populate_struct(children, vector, count),
            FieldKind::Map(_) => self.populate_map(field, vector, count),
        }
    }

    fn count(&mut self, requested: usize) -> usize {
        if requested == 0 {
            self.rng.gen_range(1..=self.config.max_count)
        } else {
            requested
        }
    }

    fn is_null(&mut self, field: &Field) -> bool {
        field.nullable && self.rng.gen_range(0..self.config.null_one_in) == 0
    }

    fn populate_scalar(
        &mut self,
        field: &Field,
        kind: ScalarKind,
        vector: &mut ColumnVector,
        count: usize,
    ) -> Result<usize, ColumnError> {
        let start = vector.value_count();
        let count = self.count(count);
        let scalar = vector.as_scalar_mut()?;
        for index in start..start + count {
            if self.is_null(field) {
                scalar.set_null(index);
            } else {
                let value = self.scalar_value(kind);
                scalar.set_safe(index, &value)?;
            }
        }
        vector.set_value_count(start + count);
        Ok(start + count)
    }

    fn populate_list(
        &mut self,
        field: &Field,
        item: &Field,
        vector: &mut ColumnVector,
        count: usize,
    ) -> Result<usize, ColumnError> {
        let start = vector.value_count();
        let count = self.count(count);
        let list = vector.as_list_mut()?;
        for index in start..start + count {
            // null positions never open an entry and add no elements
            if self.is_null(field) {
                continue;
            }
            let child_start = list.start_new_value(index)?;
            let child_end = self.populate(item, list.child_mut(), 0)?;
            list.end_value(index, child_end - child_start)?;
        }
        vector.set_value_count(start + count);
        trace!(field = %field.name, start, count, "Populated list");
        Ok(start + count)
    }

    fn populate_struct(
        &mut self,
        children: &[Field],
        vector: &mut ColumnVector,
        count: usize,
    ) -> Result<usize, ColumnError> {
        let start = vector.value_count();
        let row = vector.as_struct_mut()?;
        let mut max_child = 0;
        for (child_field, child) in children.iter().zip(row.children_mut().iter_mut()) {
            max_child = max_child.max(self.populate(child_field, child, count)?);
        }
        for index in start..max_child {
            row.set_index_defined(index);
        }
        // pads shorter children with absent positions
        vector.set_value_count(max_child);
        Ok(max_child)
    }

    fn populate_map(
        &mut self,
        field: &Field,
        vector: &mut ColumnVector,
        count: usize,
    ) -> Result<usize, ColumnError> {
        let Some((key_field, value_field)) = field.map_key_value() else {
            return Err(ColumnError::UnsupportedOperation {
                operation: "map entries",
                vector: field.type_name().to_string(),
            });
        };
        let start = vector.value_count();
        let count = self.count(count);
        let map = vector.as_map_mut()?;
        for index in start..start + count {
            map.start_new_value(index)?;
            let entry_count = self.count(0);
            let entries = map.entries_mut()?;
            let [keys, values] = entries.children_mut() else {
                return Err(ColumnError::UnsupportedOperation {
                    operation: "map entries",
                    vector: field.type_name().to_string(),
                });
            };
            self.populate(key_field, keys, entry_count)?;
            self.populate(value_field, values, entry_count)?;
            map.end_value(index, entry_count)?;
        }
        vector.set_value_count(start + count);

        let map = vector.as_map_mut()?;
        let total = map.entries().value_count();
        let entries = map.entries_mut()?;
        for index in 0..total {
            entries.set_index_defined(index);
        }
        trace!(field = %field.name, start, count, entries = total, "Populated map");
        Ok(start + count)
    }

    /// A random non-null value of `kind`.
    pub fn scalar_value(&mut self, kind: ScalarKind) -> Value {
        match kind {
            ScalarKind::Boolean => Value::Boolean(self.rng.gen()),
            ScalarKind::Int32 => Value::Int32(self.rng.gen()),
            ScalarKind::UInt32 => Value::UInt32(self.rng.gen_range(0..=i32::MAX as u32)),
            ScalarKind::Float32 => {
                let mantissa: f32 = self.rng.gen();
                Value::Float32(mantissa * 10f32.powi(self.rng.gen_range(-10..=10)))
            }
            ScalarKind::Float64 => {
                let mantissa: f64 = self.rng.gen();
                Value::Float64(mantissa * 10f64.powi(self.rng.gen_range(-20..=20)))
            }
            ScalarKind::Decimal { scale, .. } => {
                let factor = 10i128.pow(u32::from(scale.unsigned_abs()));
                let bound = DECIMAL_BOUND * factor;
                Value::Decimal {
                    unscaled: self.rng.gen_range(-bound..=bound),
                    scale,
                }
            }
            ScalarKind::DateDay => Value::DateDay(self.rng.gen_range(1..=31)),
            ScalarKind::DateMilli => Value::DateMilli(self.rng.gen_range(0..=MAX_EPOCH_MILLIS)),
            ScalarKind::TimestampMilliTz => Value::TimestampMilliTz {
                millis: self.rng.gen_range(0..=MAX_EPOCH_MILLIS),
                timezone: TIMESTAMP_TIMEZONE.to_string(),
            },
            ScalarKind::Binary => {
                let len = self.rng.gen_range(0..=10);
                let text: String = (0..len).map(|_| self.rng.gen::<char>()).collect();
                Value::Binary(text.into_bytes())
            }
            ScalarKind::Utf8 => Value::Utf8(random_lowercase(&mut self.rng, 5, 10)),
        }
    }
}
