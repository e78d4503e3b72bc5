// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field-name based equality and copy.

use crate::migrate::{convert, match_fields, within_bounds};
use crate::value::Value;
use crate::versioned::VersionedValue;
use std::sync::Arc;

/// Recursive equality by field name.
///
/// Values with different field-name sets are unequal. Floats compare by bit
/// pattern, so `NaN` equals an identical `NaN` and `0.0` differs from `-0.0`.
pub fn equal(a: &VersionedValue, b: &VersionedValue) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.fields().all(|(field, va)| {
        b.get_field(&field.name)
            .map(|vb| values_equal(va, vb))
            .unwrap_or(false)
    })
}

/// Equality of two field values, floats compared bitwise.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::F32(x), Value::F32(y)) => x.to_bits() == y.to_bits(),
        (Value::F64(x), Value::F64(y)) => x.to_bits() == y.to_bits(),
        (Value::Struct(x), Value::Struct(y)) => equal(x, y),
        _ => a == b,
    }
}

/// Copy every field of `src` that has a same-name, same-type counterpart in `dest`.
///
/// Unmatched destination fields, and fields whose `max_length` the source
/// string exceeds, are left untouched. Nested structs are
/// migrated into the destination's nested schema.
pub fn copy(dest: &mut VersionedValue, src: &VersionedValue) {
    let schema = Arc::clone(dest.schema());
    let matches = match_fields(src.schema(), &schema);
    let targets = dest.values_mut();
    for ((slot, field), matched) in targets.iter_mut().zip(schema.fields()).zip(matches) {
        if let Some(value) = matched.and_then(|i| src.values().get(i)) {
            if within_bounds(value, &field.field_type) {
                *slot = convert(value.clone(), &field.field_type);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{PrimitiveKind, SchemaRegistry, StructBuilder, TypeCatalog};

    fn registry() -> SchemaRegistry {
        let catalog = TypeCatalog::new()
            .with_struct(
                StructBuilder::new("A")
                    .field("x", PrimitiveKind::F32)
                    .string_field("name")
                    .build(),
            )
            .with_struct(
                StructBuilder::new("B")
                    .string_field("name")
                    .field("x", PrimitiveKind::F32)
                    .build(),
            )
            .with_struct(
                StructBuilder::new("C")
                    .field("x", PrimitiveKind::F64)
                    .string_field("name")
                    .field("extra", PrimitiveKind::U8)
                    .with_default(9u8)
                    .build(),
            );
        SchemaRegistry::build(&catalog).unwrap()
    }

    #[test]
    fn equal_ignores_declaration_order() {
        let reg = registry();
        let mut a = reg.new_value("A").unwrap();
        let mut b = reg.new_value("B").unwrap();
        a.set("x", 1.5f32).unwrap();
        a.set("name", "n").unwrap();
        b.set("x", 1.5f32).unwrap();
        b.set("name", "n").unwrap();
        assert!(equal(&a, &b));

        b.set("name", "m").unwrap();
        assert!(!equal(&a, &b));
    }

    #[test]
    fn equal_compares_floats_bitwise() {
        let reg = registry();
        let mut a = reg.new_value("A").unwrap();
        let mut b = reg.new_value("A").unwrap();
        a.set("x", f32::NAN).unwrap();
        b.set("x", f32::NAN).unwrap();
        assert!(equal(&a, &b));

        a.set("x", 0.0f32).unwrap();
        b.set("x", -0.0f32).unwrap();
        assert!(!equal(&a, &b));
    }

    #[test]
    fn different_field_sets_are_unequal() {
        let reg = registry();
        let a = reg.new_value("A").unwrap();
        let c = reg.new_value("C").unwrap();
        assert!(!equal(&a, &c));
        assert!(!equal(&c, &a));
    }

    #[test]
    fn copy_matches_name_and_type() {
        let reg = registry();
        let mut a = reg.new_value("A").unwrap();
        a.set("x", 2.0f32).unwrap();
        a.set("name", "copied").unwrap();

        let mut c = reg.new_value("C").unwrap();
        c.set("x", 7.0f64).unwrap();
        copy(&mut c, &a);

        assert_eq!(c.get::<String>("name").unwrap(), "copied");
        // f32 -> f64 is a tag mismatch: untouched
        assert_eq!(c.get::<f64>("x").unwrap(), 7.0);
        assert_eq!(c.get::<u8>("extra").unwrap(), 9);
    }
}
