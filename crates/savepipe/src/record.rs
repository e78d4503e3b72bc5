// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed record bridge.
//!
//! `#[derive(SaveRecord)]` and `#[derive(SaveEnum)]` implement these traits so
//! plain Rust types can be registered, written and read without building
//! [`VersionedValue`]s by hand.
//!
//! ```
//! use savepipe::{SaveEnum, SaveRecord, SchemaRegistry, TypeCatalog};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, SaveEnum)]
//! #[repr(u8)]
//! enum Difficulty {
//!     Easy,
//!     Hard,
//! }
//!
//! #[derive(Debug, PartialEq, SaveRecord)]
//! struct ProgressV1 {
//!     level: u32,
//! }
//!
//! #[derive(Debug, PartialEq, SaveRecord)]
//! #[save(base = ProgressV1)]
//! struct Progress {
//!     level: u32,
//!     #[save(default = Difficulty::Hard)]
//!     difficulty: Difficulty,
//! }
//!
//! let mut catalog = TypeCatalog::new();
//! catalog.register::<Progress>();
//! let registry = SchemaRegistry::build(&catalog).unwrap();
//!
//! let bytes = registry.write_record(&ProgressV1 { level: 3 }).unwrap();
//! let loaded: Progress = registry.read_record(&bytes).unwrap();
//! assert_eq!(loaded, Progress { level: 3, difficulty: Difficulty::Hard });
//! ```

use crate::error::{Error, ValueError};
use crate::schema::{
    FieldType, PrimitiveKind, ReflectedEnum, ReflectedStruct, ReflectedType, SchemaRegistry,
    SchemaVersion, TypeCatalog,
};
use crate::value::{FromValue, Value};
use crate::versioned::VersionedValue;
use std::sync::Arc;

/// A Rust type usable as a field of a [`SaveRecord`].
pub trait SaveField: Sized {
    /// Reflected type of a field of this Rust type.
    fn reflected_type() -> ReflectedType;

    /// Add any struct or enum this type depends on to the catalog.
    fn register(_catalog: &mut TypeCatalog) {}

    /// Convert for storage in a field of `field_type`.
    fn to_value(&self, field_type: &FieldType) -> Result<Value, ValueError>;

    fn from_value(value: &Value) -> Result<Self, ValueError>;

    /// Declared default literal, when this value can serve as one.
    fn default_literal(&self) -> Option<Value>;
}

/// A Rust struct that is one version of a persisted type.
pub trait SaveRecord: Sized {
    /// Registered type name.
    const TYPE_NAME: &'static str;

    /// Name of the previous version, if any.
    fn base_type() -> Option<&'static str>;

    /// Reflected layout of this version.
    fn reflect() -> ReflectedStruct;

    /// Add this type, its bases and every referenced type to the catalog.
    fn register(catalog: &mut TypeCatalog);

    /// Convert to a value bound to `schema`.
    fn to_versioned(&self, schema: &Arc<SchemaVersion>) -> Result<VersionedValue, ValueError>;

    /// Convert from a value bound to this type's schema.
    fn from_versioned(value: &VersionedValue) -> Result<Self, ValueError>;
}

/// A fieldless Rust enum persisted as its discriminant.
pub trait SaveEnum: Sized + Copy {
    const ENUM_NAME: &'static str;
    const UNDERLYING: PrimitiveKind;

    /// `(name, discriminant)` in declaration order.
    fn variants() -> Vec<(&'static str, i64)>;

    fn to_raw(self) -> i64;

    fn from_raw(raw: i64) -> Option<Self>;
}

/// Reflected form of a [`SaveEnum`].
pub fn reflect_enum<T: SaveEnum>() -> ReflectedEnum {
    ReflectedEnum {
        name: T::ENUM_NAME.to_string(),
        variants: T::variants()
            .into_iter()
            .map(|(name, value)| crate::schema::EnumVariant::new(name, value))
            .collect(),
        underlying: T::UNDERLYING,
    }
}

// ---------------------------------------------------------------------------
// Derive support
// ---------------------------------------------------------------------------

/// [`SaveField::to_value`] for a nested record.
pub fn record_to_value<T: SaveRecord>(
    record: &T,
    field_type: &FieldType,
) -> Result<Value, ValueError> {
    match field_type {
        FieldType::Struct(schema) => Ok(Value::Struct(record.to_versioned(schema)?)),
        other => Err(ValueError::TypeMismatch {
            field: T::TYPE_NAME.to_string(),
            expected: other.tag().to_string(),
            found: "struct",
        }),
    }
}

/// [`SaveField::from_value`] for a nested record.
pub fn record_from_value<T: SaveRecord>(value: &Value) -> Result<T, ValueError> {
    match value {
        Value::Struct(nested) => T::from_versioned(nested),
        other => Err(ValueError::TypeMismatch {
            field: T::TYPE_NAME.to_string(),
            expected: "struct".to_string(),
            found: other.kind_name(),
        }),
    }
}

/// [`SaveField::register`] for an enum.
pub fn register_enum<T: SaveEnum>(catalog: &mut TypeCatalog) {
    if !catalog.contains_enum(T::ENUM_NAME) {
        catalog.add_enum(reflect_enum::<T>());
    }
}

/// [`SaveField::from_value`] for an enum.
pub fn enum_from_value<T: SaveEnum>(value: &Value) -> Result<T, ValueError> {
    let raw = value.as_enum().ok_or_else(|| ValueError::TypeMismatch {
        field: T::ENUM_NAME.to_string(),
        expected: "enum".to_string(),
        found: value.kind_name(),
    })?;
    T::from_raw(raw).ok_or_else(|| ValueError::UnknownEnumValue {
        enum_name: T::ENUM_NAME.to_string(),
        value: raw,
    })
}

// ---------------------------------------------------------------------------
// Built-in field types
// ---------------------------------------------------------------------------

macro_rules! impl_save_field_primitive {
    ($ty:ty, $kind:ident) => {
        impl SaveField for $ty {
            fn reflected_type() -> ReflectedType {
                ReflectedType::Primitive(PrimitiveKind::$kind)
            }

            fn to_value(&self, _field_type: &FieldType) -> Result<Value, ValueError> {
                Ok(Value::$kind(*self))
            }

            fn from_value(value: &Value) -> Result<Self, ValueError> {
                <$ty as FromValue>::from_value(value).ok_or_else(|| ValueError::TypeMismatch {
                    field: String::new(),
                    expected: <$ty as FromValue>::EXPECTED.to_string(),
                    found: value.kind_name(),
                })
            }

            fn default_literal(&self) -> Option<Value> {
                Some(Value::$kind(*self))
            }
        }
    };
}

impl_save_field_primitive!(bool, Bool);
impl_save_field_primitive!(u8, U8);
impl_save_field_primitive!(u16, U16);
impl_save_field_primitive!(u32, U32);
impl_save_field_primitive!(u64, U64);
impl_save_field_primitive!(i8, I8);
impl_save_field_primitive!(i16, I16);
impl_save_field_primitive!(i32, I32);
impl_save_field_primitive!(i64, I64);
impl_save_field_primitive!(f32, F32);
impl_save_field_primitive!(f64, F64);

impl SaveField for String {
    fn reflected_type() -> ReflectedType {
        ReflectedType::String
    }

    fn to_value(&self, _field_type: &FieldType) -> Result<Value, ValueError> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(ValueError::TypeMismatch {
                field: String::new(),
                expected: "string".to_string(),
                found: other.kind_name(),
            }),
        }
    }

    fn default_literal(&self) -> Option<Value> {
        Some(Value::String(self.clone()))
    }
}

// ---------------------------------------------------------------------------
// Typed registry API
// ---------------------------------------------------------------------------

impl SchemaRegistry {
    /// Encode a record with the schema registered under its type name.
    pub fn write_record<T: SaveRecord>(&self, record: &T) -> Result<Vec<u8>, Error> {
        let schema = self.schema(T::TYPE_NAME)?;
        let value = record.to_versioned(schema)?;
        Ok(self.write(&value)?)
    }

    /// Decode a blob written by any version of `T` and convert it to `T`.
    pub fn read_record<T: SaveRecord>(&self, bytes: &[u8]) -> Result<T, Error> {
        let value = self.read(T::TYPE_NAME, bytes)?;
        Ok(T::from_versioned(&value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{StructBuilder, TypeCatalog};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Light {
        Off,
        On,
    }

    impl SaveEnum for Light {
        const ENUM_NAME: &'static str = "Light";
        const UNDERLYING: PrimitiveKind = PrimitiveKind::U8;

        fn variants() -> Vec<(&'static str, i64)> {
            vec![("Off", 0), ("On", 1)]
        }

        fn to_raw(self) -> i64 {
            self as i64
        }

        fn from_raw(raw: i64) -> Option<Self> {
            match raw {
                0 => Some(Self::Off),
                1 => Some(Self::On),
                _ => None,
            }
        }
    }

    #[test]
    fn test_reflect_enum() {
        let reflected = reflect_enum::<Light>();
        assert_eq!(reflected.name, "Light");
        assert_eq!(reflected.variants.len(), 2);
        assert_eq!(reflected.underlying, PrimitiveKind::U8);
    }

    #[test]
    fn test_enum_from_value() {
        assert_eq!(enum_from_value::<Light>(&Value::Enum(1)), Ok(Light::On));
        assert!(matches!(
            enum_from_value::<Light>(&Value::Enum(5)),
            Err(ValueError::UnknownEnumValue { value: 5, .. })
        ));
        assert!(matches!(
            enum_from_value::<Light>(&Value::U8(1)),
            Err(ValueError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_load_reports_field_name() {
        let catalog = TypeCatalog::new()
            .with_struct(StructBuilder::new("S").field("n", PrimitiveKind::U8).build());
        let reg = SchemaRegistry::build(&catalog).unwrap();
        let value = reg.new_value("S").unwrap();

        assert_eq!(value.load::<u8>("n"), Ok(0));
        assert!(matches!(
            value.load::<u16>("n"),
            Err(ValueError::TypeMismatch { ref field, .. }) if field == "n"
        ));
    }

    #[test]
    fn test_primitive_default_literal() {
        assert_eq!(3u16.default_literal(), Some(Value::U16(3)));
        assert_eq!(
            String::from("x").default_literal(),
            Some(Value::String("x".into()))
        );
    }
}
