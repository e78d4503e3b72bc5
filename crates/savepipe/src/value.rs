// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field value types.

use crate::schema::{FieldType, PrimitiveKind};
use crate::versioned::VersionedValue;

/// The value of one field of a [`VersionedValue`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    /// Raw enum integer; not required to name a variant.
    Enum(i64),
    /// Fixed-width or dynamic string.
    String(String),
    /// Nested struct bound to its own schema version.
    Struct(VersionedValue),
}

impl Value {
    /// Short name of the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Enum(_) => "enum",
            Self::String(_) => "string",
            Self::Struct(_) => "struct",
        }
    }

    /// Primitive kind of a primitive value.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::U8(_) => PrimitiveKind::U8,
            Self::U16(_) => PrimitiveKind::U16,
            Self::U32(_) => PrimitiveKind::U32,
            Self::U64(_) => PrimitiveKind::U64,
            Self::I8(_) => PrimitiveKind::I8,
            Self::I16(_) => PrimitiveKind::I16,
            Self::I32(_) => PrimitiveKind::I32,
            Self::I64(_) => PrimitiveKind::I64,
            Self::F32(_) => PrimitiveKind::F32,
            Self::F64(_) => PrimitiveKind::F64,
            Self::Enum(_) | Self::String(_) | Self::Struct(_) => return None,
        })
    }

    /// Whether this value can be stored in a field of `field_type`.
    ///
    /// Nested structs must be bound to exactly the field's schema version.
    pub fn matches(&self, field_type: &FieldType) -> bool {
        match (self, field_type) {
            (Self::Enum(_), FieldType::Enum(_)) => true,
            (Self::String(_), FieldType::FixedString { .. } | FieldType::String { .. }) => true,
            (Self::Struct(v), FieldType::Struct(schema)) => v.schema().same_as(schema),
            (v, FieldType::Primitive(kind)) => v.primitive_kind() == Some(*kind),
            _ => false,
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as raw enum value.
    pub fn as_enum(&self) -> Option<i64> {
        match self {
            Self::Enum(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as nested struct.
    pub fn as_struct(&self) -> Option<&VersionedValue> {
        match self {
            Self::Struct(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as mutable nested struct.
    pub fn as_struct_mut(&mut self) -> Option<&mut VersionedValue> {
        match self {
            Self::Struct(v) => Some(v),
            _ => None,
        }
    }
}

/// Trait for extracting typed values from a [`Value`].
pub trait FromValue: Sized {
    /// Kind name reported when extraction fails.
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

/// Trait for converting into a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

macro_rules! impl_value_conversions {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl FromValue for $ty {
            const EXPECTED: &'static str = $name;

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }

        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_value_conversions!(bool, Bool, "bool");
impl_value_conversions!(u8, U8, "u8");
impl_value_conversions!(u16, U16, "u16");
impl_value_conversions!(u32, U32, "u32");
impl_value_conversions!(u64, U64, "u64");
impl_value_conversions!(i8, I8, "i8");
impl_value_conversions!(i16, I16, "i16");
impl_value_conversions!(i32, I32, "i32");
impl_value_conversions!(i64, I64, "i64");
impl_value_conversions!(f32, F32, "f32");
impl_value_conversions!(f64, F64, "f64");

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromValue for VersionedValue {
    const EXPECTED: &'static str = "struct";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_struct().cloned()
    }
}

impl FromValue for Value {
    const EXPECTED: &'static str = "value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoValue for VersionedValue {
    fn into_value(self) -> Value {
        Value::Struct(self)
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumDescriptor, EnumVariant};
    use std::sync::Arc;

    #[test]
    fn test_value_matches_field_type() {
        let i32_ty = FieldType::Primitive(PrimitiveKind::I32);
        assert!(Value::I32(7).matches(&i32_ty));
        assert!(!Value::I64(7).matches(&i32_ty));
        assert!(!Value::Enum(7).matches(&i32_ty));

        let flag = FieldType::Enum(Arc::new(
            EnumDescriptor::new("Flag", vec![EnumVariant::new("A", 0)])
                .with_underlying(PrimitiveKind::U8),
        ));
        assert!(Value::Enum(42).matches(&flag));
        assert!(!Value::U8(0).matches(&flag));

        assert!(Value::from("x").matches(&FieldType::FixedString { width: 4 }));
        assert!(Value::from("x").matches(&FieldType::String { max_length: None }));
    }

    #[test]
    fn test_typed_extraction() {
        assert_eq!(u16::from_value(&Value::U16(9)), Some(9));
        assert_eq!(u16::from_value(&Value::U32(9)), None);
        assert_eq!(
            String::from_value(&Value::from("abc")).as_deref(),
            Some("abc")
        );
        assert_eq!(3.5f64.into_value(), Value::F64(3.5));
        assert_eq!(Value::I8(-1).kind_name(), "i8");
    }
}
