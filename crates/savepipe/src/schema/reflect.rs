// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reflection model consumed by schema extraction.
//!
//! A [`ReflectionProvider`] answers three questions about registered types:
//! which fields a struct declares (in order), which type it was derived from,
//! and which variants an enum has. Extraction turns those answers into
//! immutable [`SchemaVersion`](super::SchemaVersion) chains.

use super::types::{EnumVariant, PrimitiveKind};
use crate::value::Value;

/// Type of a reflected field, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ReflectedType {
    Primitive(PrimitiveKind),
    /// Enum, by enum type name.
    Enum(String),
    /// String of exactly this many bytes on the wire.
    FixedString(usize),
    /// Length-prefixed string.
    String,
    /// Nested struct, by type name.
    Struct(String),
    /// A type with no stable binary representation.
    Unsupported(String),
}

/// One field as reported by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectedField {
    pub name: String,
    pub ty: ReflectedType,
    /// Size constraint for dynamic strings.
    pub max_length: Option<usize>,
    /// Declared default; the type's zero value when absent.
    pub default: Option<Value>,
}

impl ReflectedField {
    pub fn new(name: impl Into<String>, ty: ReflectedType) -> Self {
        Self {
            name: name.into(),
            ty,
            max_length: None,
            default: None,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_default(mut self, default: impl Into<Option<Value>>) -> Self {
        self.default = default.into();
        self
    }
}

/// A struct as reported by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectedStruct {
    pub name: String,
    /// Previous version of this type, if any.
    pub base: Option<String>,
    pub fields: Vec<ReflectedField>,
}

/// An enum as reported by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectedEnum {
    pub name: String,
    pub variants: Vec<EnumVariant>,
    pub underlying: PrimitiveKind,
}

/// Source of type metadata.
///
/// Implementations must answer consistently for the lifetime of a registry
/// build; the registry does not call a provider afterwards.
pub trait ReflectionProvider {
    /// Names of every struct type to register.
    fn type_names(&self) -> Vec<String>;

    /// Ordered fields of a struct type.
    fn enumerate(&self, type_name: &str) -> Option<Vec<ReflectedField>>;

    /// Base (previous version) of a struct type.
    fn resolve_base(&self, type_name: &str) -> Option<String>;

    /// Variants of an enum type.
    fn enumerate_enum(&self, enum_name: &str) -> Option<ReflectedEnum>;

    /// Whether the provider knows a struct type.
    fn contains(&self, type_name: &str) -> bool {
        self.enumerate(type_name).is_some()
    }
}
