// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cross-version promotion.
//!
//! A step from version N to N+1 starts from N+1's defaults, copies every
//! field whose name and type tag are identical in both versions, and drops
//! the rest. A string longer than the next version's `max_length` is treated
//! as unmatched. Nested structs follow their own chain with the same rule.

use crate::schema::{FieldType, SchemaChain, SchemaVersion};
use crate::value::Value;
use crate::versioned::VersionedValue;
use std::sync::Arc;

/// For each field of `dst`, the index of the matching field of `src`.
pub fn match_fields(src: &SchemaVersion, dst: &SchemaVersion) -> Vec<Option<usize>> {
    dst.fields()
        .iter()
        .map(|d| {
            let tag = d.tag();
            src.fields()
                .iter()
                .position(|s| s.name == d.name && s.tag() == tag)
        })
        .collect()
}

/// Promote a value to the latest version of `chain`.
///
/// Values bound to a version of the chain step through every later version;
/// anything else is converted directly.
pub fn promote(value: VersionedValue, chain: &SchemaChain) -> VersionedValue {
    let latest = chain.latest();
    if value.schema().same_as(latest) {
        return value;
    }
    match chain.get(value.version()) {
        Some(version) if version.same_as(value.schema()) => chain
            .iter()
            .skip(value.version() as usize + 1)
            .fold(value, |current, next| step(current, next)),
        _ => step(value, latest),
    }
}

/// Migrate a value to `target`.
///
/// When the value's schema is an ancestor of `target` the chain between them
/// is walked one version at a time; otherwise a single direct step is taken.
pub fn migrate(value: VersionedValue, target: &Arc<SchemaVersion>) -> VersionedValue {
    if value.schema().same_as(target) {
        return value;
    }

    let mut path = vec![target];
    let mut found = false;
    for ancestor in target.ancestors() {
        if ancestor.same_as(value.schema()) {
            found = true;
            break;
        }
        path.push(ancestor);
    }
    if !found {
        return step(value, target);
    }

    path.into_iter()
        .rev()
        .fold(value, |current, next| step(current, next))
}

/// One migration step into `next`.
pub fn step(value: VersionedValue, next: &Arc<SchemaVersion>) -> VersionedValue {
    let matches = match_fields(value.schema(), next);
    let from = Arc::clone(value.schema());
    let mut source: Vec<Option<Value>> = value.into_values().into_iter().map(Some).collect();

    let mut values = Vec::with_capacity(next.fields().len());
    for (field, matched) in next.fields().iter().zip(matches) {
        match matched.and_then(|i| source.get_mut(i).and_then(Option::take)) {
            Some(v) if within_bounds(&v, &field.field_type) => {
                values.push(convert(v, &field.field_type));
            }
            Some(_) => {
                log::trace!(
                    "[savepipe] {} -> {}: {} exceeds its bound, defaulted",
                    from.type_name(),
                    next.type_name(),
                    field.name
                );
                values.push(field.default.clone());
            }
            None => {
                log::trace!(
                    "[savepipe] {} -> {}: {} defaulted",
                    from.type_name(),
                    next.type_name(),
                    field.name
                );
                values.push(field.default.clone());
            }
        }
    }

    if log::log_enabled!(log::Level::Trace) {
        for (field, left) in from.fields().iter().zip(&source) {
            if left.is_some() {
                log::trace!(
                    "[savepipe] {} -> {}: {} dropped",
                    from.type_name(),
                    next.type_name(),
                    field.name
                );
            }
        }
    }

    VersionedValue::from_parts(Arc::clone(next), values)
}

/// Whether a matched value satisfies the target field's size constraint.
///
/// Type tags ignore `max_length`, so a longer string can match a bounded field.
pub(crate) fn within_bounds(value: &Value, field_type: &FieldType) -> bool {
    match (field_type.max_length(), value) {
        (Some(max), Value::String(s)) => s.len() <= max,
        _ => true,
    }
}

/// Carry a matched value into a field of the next version.
pub(crate) fn convert(value: Value, field_type: &FieldType) -> Value {
    match (value, field_type) {
        (Value::Struct(nested), FieldType::Struct(schema)) => Value::Struct(migrate(nested, schema)),
        (value, _) => value,
    }
}
