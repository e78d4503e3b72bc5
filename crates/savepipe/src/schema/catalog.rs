// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory reflection provider with a fluent builder API.

use super::reflect::{
    ReflectedEnum, ReflectedField, ReflectedStruct, ReflectedType, ReflectionProvider,
};
use super::types::{EnumVariant, PrimitiveKind};
use crate::record::SaveRecord;
use crate::value::Value;
use std::collections::HashMap;

/// HashMap-backed [`ReflectionProvider`].
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    structs: HashMap<String, ReflectedStruct>,
    enums: HashMap<String, ReflectedEnum>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a struct type.
    pub fn add_struct(&mut self, reflected: ReflectedStruct) -> &mut Self {
        self.structs.insert(reflected.name.clone(), reflected);
        self
    }

    /// Add (or replace) an enum type.
    pub fn add_enum(&mut self, reflected: ReflectedEnum) -> &mut Self {
        self.enums.insert(reflected.name.clone(), reflected);
        self
    }

    /// Builder-style [`add_struct`](Self::add_struct).
    pub fn with_struct(mut self, reflected: ReflectedStruct) -> Self {
        self.add_struct(reflected);
        self
    }

    /// Builder-style [`add_enum`](Self::add_enum).
    pub fn with_enum(mut self, reflected: ReflectedEnum) -> Self {
        self.add_enum(reflected);
        self
    }

    /// Register a derived record type together with its bases and every
    /// struct or enum it references.
    pub fn register<T: SaveRecord>(&mut self) -> &mut Self {
        T::register(self);
        self
    }

    pub fn contains_struct(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }

    pub fn contains_enum(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    pub fn get_struct(&self, name: &str) -> Option<&ReflectedStruct> {
        self.structs.get(name)
    }
}

impl ReflectionProvider for TypeCatalog {
    fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.structs.keys().cloned().collect();
        names.sort();
        names
    }

    fn enumerate(&self, type_name: &str) -> Option<Vec<ReflectedField>> {
        self.structs.get(type_name).map(|s| s.fields.clone())
    }

    fn resolve_base(&self, type_name: &str) -> Option<String> {
        self.structs.get(type_name).and_then(|s| s.base.clone())
    }

    fn enumerate_enum(&self, enum_name: &str) -> Option<ReflectedEnum> {
        self.enums.get(enum_name).cloned()
    }

    fn contains(&self, type_name: &str) -> bool {
        self.structs.contains_key(type_name)
    }
}

// ----------------------------------------------------------------------------
// StructBuilder
// ----------------------------------------------------------------------------

/// Builder for reflected struct types.
#[derive(Debug)]
pub struct StructBuilder {
    name: String,
    base: Option<String>,
    fields: Vec<ReflectedField>,
}

impl StructBuilder {
    /// Create a new builder for a struct type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            fields: Vec::new(),
        }
    }

    /// Declare the previous version of this type.
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Add a primitive field.
    pub fn field(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.field_with_type(ReflectedField::new(name, ReflectedType::Primitive(kind)))
    }

    /// Add a fully described field.
    pub fn field_with_type(mut self, field: ReflectedField) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a string field.
    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.field_with_type(ReflectedField::new(name, ReflectedType::String))
    }

    pub fn bounded_string_field(self, name: impl Into<String>, max_length: usize) -> Self {
        self.field_with_type(
            ReflectedField::new(name, ReflectedType::String).with_max_length(max_length),
        )
    }

    /// Add a fixed-width string field.
    pub fn fixed_string_field(self, name: impl Into<String>, width: usize) -> Self {
        self.field_with_type(ReflectedField::new(name, ReflectedType::FixedString(width)))
    }

    /// Add an enum field.
    pub fn enum_field(self, name: impl Into<String>, enum_name: impl Into<String>) -> Self {
        self.field_with_type(ReflectedField::new(
            name,
            ReflectedType::Enum(enum_name.into()),
        ))
    }

    /// Add a nested struct field.
    pub fn struct_field(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.field_with_type(ReflectedField::new(
            name,
            ReflectedType::Struct(type_name.into()),
        ))
    }

    /// Set the default of the most recently added field.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        if let Some(last) = self.fields.last_mut() {
            last.default = Some(value.into());
        }
        self
    }

    /// Build the reflected struct.
    pub fn build(self) -> ReflectedStruct {
        ReflectedStruct {
            name: self.name,
            base: self.base,
            fields: self.fields,
        }
    }
}

// ----------------------------------------------------------------------------
// EnumBuilder
// ----------------------------------------------------------------------------

/// Builder for reflected enum types.
#[derive(Debug)]
pub struct EnumBuilder {
    name: String,
    variants: Vec<EnumVariant>,
    next_value: i64,
    underlying: PrimitiveKind,
}

impl EnumBuilder {
    /// Create a new enum builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
            next_value: 0,
            underlying: PrimitiveKind::U32,
        }
    }

    /// Add a variant with auto-incrementing value.
    pub fn variant(mut self, name: impl Into<String>) -> Self {
        self.variants.push(EnumVariant::new(name, self.next_value));
        self.next_value = self.next_value.wrapping_add(1);
        self
    }

    /// Add a variant with explicit value.
    pub fn variant_value(mut self, name: impl Into<String>, value: i64) -> Self {
        self.variants.push(EnumVariant::new(name, value));
        self.next_value = value.wrapping_add(1);
        self
    }

    /// Set underlying type.
    pub fn underlying(mut self, kind: PrimitiveKind) -> Self {
        self.underlying = kind;
        self
    }

    /// Build the reflected enum.
    pub fn build(self) -> ReflectedEnum {
        ReflectedEnum {
            name: self.name,
            variants: self.variants,
            underlying: self.underlying,
        }
    }
}
