//! Property-based tests for colwrite.
//!
//! These tests use proptest to verify universal properties across many
//! generated type trees and populated vectors.

use proptest::prelude::*;

use colwrite::column::{ColumnVector, Value};
use colwrite::generate::{FieldGenerator, GeneratorConfig, NameSession, ValueGenerator};
use colwrite::harness::{case_strategy, field_strategy, RoundTripHarness};
use colwrite::resolver::{ColumnarResolver, FieldResolver};
use colwrite::schema::{Field, FieldKind, NestedKind, ScalarKind};

// ============================================================================
// Helpers
// ============================================================================

/// Nesting levels of a field, counting a map as one level over its key and value.
fn levels(field: &Field) -> usize {
    match &field.kind {
        FieldKind::Scalar(_) => 1,
        FieldKind::List(item) => 1 + levels(item),
        FieldKind::Struct(children) => 1 + children.iter().map(levels).max().unwrap_or(0),
        FieldKind::Map(_) => {
            let (key, value) = field.map_key_value().expect("well-formed map");
            1 + levels(key).max(levels(value))
        }
    }
}

/// Visit every vector of a tree, parents before children.
fn visit(vector: &ColumnVector, f: &mut dyn FnMut(&ColumnVector)) {
    f(vector);
    match vector {
        ColumnVector::Scalar(_) => {}
        ColumnVector::List(list) => visit(list.child(), f),
        ColumnVector::Struct(row) => {
            for child in row.children() {
                visit(child, f);
            }
        }
        ColumnVector::Map(map) => visit(map.entries(), f),
    }
}

fn nested_config(kinds: Vec<NestedKind>) -> GeneratorConfig {
    GeneratorConfig::default().with_nested_kinds(kinds)
}

// ============================================================================
// Type-Tree Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Generated type trees satisfy every structural invariant.
    #[test]
    fn prop_generated_fields_are_valid(
        field in field_strategy(NameSession::new(), GeneratorConfig::default())
    ) {
        prop_assert!(field.validate().is_ok(), "invalid tree: {}", field);
    }

    /// Generated trees never nest deeper than the configured bound.
    #[test]
    fn prop_depth_is_bounded(
        max_depth in 1usize..=5,
        seed in any::<u64>()
    ) {
        let config = GeneratorConfig::default().with_max_depth(max_depth);
        let field = FieldGenerator::new(config, NameSession::new(), seed).generate();
        prop_assert!(
            levels(&field) <= max_depth,
            "{} has {} levels, bound {}", field, levels(&field), max_depth
        );
    }
}

// ============================================================================
// Round-Trip Law
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any generated field and populated source, writing every decoded
    /// position into a fresh vector reproduces the source exactly.
    #[test]
    fn prop_round_trip(
        (field, seed) in case_strategy(NameSession::new(), GeneratorConfig::default())
    ) {
        let result = RoundTripHarness::default().check(&field, seed);
        prop_assert!(result.is_ok(), "round trip failed for {}: {:?}", field, result);
    }

    /// The round trip law holds with non-nullable trees as well.
    #[test]
    fn prop_round_trip_non_nullable(
        (field, seed) in case_strategy(
            NameSession::new(),
            GeneratorConfig::default().with_default_nullable(false),
        )
    ) {
        let harness = RoundTripHarness::new(GeneratorConfig::default().with_default_nullable(false));
        prop_assert!(harness.check(&field, seed).is_ok());
    }

    /// Maps nested in maps, lists and structs survive the round trip.
    #[test]
    fn prop_round_trip_map_heavy(
        (field, seed) in case_strategy(
            NameSession::new(),
            nested_config(vec![NestedKind::Map]).with_max_depth(4),
        )
    ) {
        prop_assert!(RoundTripHarness::default().check(&field, seed).is_ok());
    }
}

// ============================================================================
// Value Generator Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The null rate of a nullable scalar converges to 1/6.
    #[test]
    fn prop_null_rate_converges(seed in any::<u64>(), kind_index in 0usize..ScalarKind::ALL.len()) {
        let samples = 2000;
        let field = Field::scalar("n", ScalarKind::ALL[kind_index], true);
        let mut vector = ColumnVector::new(&field);
        ValueGenerator::new(GeneratorConfig::default(), seed)
            .populate(&field, &mut vector, samples)
            .unwrap();

        let nulls = (0..samples).filter(|&i| !vector.is_valid(i)).count();
        let rate = nulls as f64 / samples as f64;
        prop_assert!((rate - 1.0 / 6.0).abs() < 0.05, "null rate {}", rate);
    }

    /// Non-nullable fields are never null.
    #[test]
    fn prop_non_nullable_never_null(seed in any::<u64>()) {
        let field = Field::scalar("n", ScalarKind::Float64, false);
        let mut vector = ColumnVector::new(&field);
        ValueGenerator::new(GeneratorConfig::default(), seed)
            .populate(&field, &mut vector, 500)
            .unwrap();
        prop_assert!((0..500).all(|i| vector.is_valid(i)));
    }

    /// Every struct child ends with the parent's value count.
    #[test]
    fn prop_struct_children_match_parent(
        (field, seed) in case_strategy(NameSession::new(), nested_config(vec![NestedKind::Struct, NestedKind::List]))
    ) {
        let source = ValueGenerator::new(GeneratorConfig::default(), seed)
            .generate_values(&field)
            .unwrap();
        let mut short = Vec::new();
        visit(&source, &mut |vector| {
            if let ColumnVector::Struct(row) = vector {
                for child in row.children() {
                    if child.value_count() != vector.value_count() {
                        short.push(child.field().name.clone());
                    }
                }
            }
        });
        prop_assert!(short.is_empty(), "short children: {:?}", short);
    }

    /// Null list positions contribute no elements; present positions
    /// contribute exactly their decoded elements.
    #[test]
    fn prop_list_ranges(
        (field, seed) in case_strategy(NameSession::new(), nested_config(vec![NestedKind::List]))
    ) {
        let source = ValueGenerator::new(GeneratorConfig::default(), seed)
            .generate_values(&field)
            .unwrap();
        let mut failures = Vec::new();
        visit(&source, &mut |vector| {
            if let ColumnVector::List(list) = vector {
                for i in 0..vector.value_count() {
                    let range = list.element_range(i);
                    match vector.get_object(i).unwrap() {
                        Value::Null if range.is_empty() => {}
                        Value::List(items) if items.len() == range.len() && !items.is_empty() => {}
                        other => failures.push(format!("{} at {}: {:?} over {:?}", vector.field().name, i, other, range)),
                    }
                }
            }
        });
        prop_assert!(failures.is_empty(), "{:?}", failures);
    }

    /// Map keys and values have equal counts per position, and the resolver
    /// rebuilds one entry per stored pair.
    #[test]
    fn prop_map_entries(
        (field, seed) in case_strategy(NameSession::new(), nested_config(vec![NestedKind::Map]))
    ) {
        let source = ValueGenerator::new(GeneratorConfig::default(), seed)
            .generate_values(&field)
            .unwrap();
        let mut failures = Vec::new();
        visit(&source, &mut |vector| {
            if let ColumnVector::Map(map) = vector {
                let ColumnVector::Struct(entries) = map.entries() else {
                    failures.push("entries is not a struct".to_string());
                    return;
                };
                let [keys, values] = entries.children() else {
                    failures.push("entries arity".to_string());
                    return;
                };
                if keys.value_count() != values.value_count() {
                    failures.push(format!("{} keys vs {} values", keys.value_count(), values.value_count()));
                }
                for i in 0..vector.value_count() {
                    let decoded = vector.get_object(i).unwrap();
                    if decoded.is_null() {
                        continue;
                    }
                    match ColumnarResolver.resolve_field(vector.field(), &decoded) {
                        Ok(Value::Map(resolved)) if resolved.len() == map.entry_range(i).len() => {}
                        other => failures.push(format!("position {}: {:?}", i, other)),
                    }
                }
            }
        });
        prop_assert!(failures.is_empty(), "{:?}", failures);
    }
}
