// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! VersionedValue container bound to one schema version.

use crate::error::ValueError;
use crate::record::SaveField;
use crate::schema::{FieldDescriptor, FieldType, SchemaVersion};
use crate::value::{FromValue, IntoValue, Value};
use std::sync::Arc;

/// In-memory instance of one schema version.
///
/// Holds exactly one value per field of its schema, in declaration order.
/// Every mutation is checked against the field's type.
#[derive(Debug, Clone)]
pub struct VersionedValue {
    schema: Arc<SchemaVersion>,
    values: Vec<Value>,
}

impl VersionedValue {
    /// Create a value holding every field's declared default.
    pub fn new(schema: &Arc<SchemaVersion>) -> Self {
        let values = schema.fields().iter().map(|f| f.default.clone()).collect();
        Self {
            schema: Arc::clone(schema),
            values,
        }
    }

    /// Create from field values in declaration order (with validation).
    pub fn from_values(
        schema: &Arc<SchemaVersion>,
        values: Vec<Value>,
    ) -> Result<Self, ValueError> {
        if values.len() != schema.fields().len() {
            return Err(ValueError::FieldCount {
                expected: schema.fields().len(),
                found: values.len(),
            });
        }
        for (field, value) in schema.fields().iter().zip(&values) {
            check_assignable(field, value)?;
        }
        Ok(Self {
            schema: Arc::clone(schema),
            values,
        })
    }

    /// Decoder and migrator output; values already match the schema.
    pub(crate) fn from_parts(schema: Arc<SchemaVersion>, values: Vec<Value>) -> Self {
        debug_assert_eq!(schema.fields().len(), values.len());
        Self { schema, values }
    }

    /// Get the schema version.
    pub fn schema(&self) -> &Arc<SchemaVersion> {
        &self.schema
    }

    /// Get the type name.
    pub fn type_name(&self) -> &str {
        self.schema.type_name()
    }

    /// Get the version index.
    pub fn version(&self) -> u32 {
        self.schema.index()
    }

    /// Field values in declaration order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [Value] {
        &mut self.values
    }

    pub(crate) fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Iterate `(descriptor, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &Value)> {
        self.schema.fields().iter().zip(&self.values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a field value by name.
    pub fn get_field(&self, name: &str) -> Result<&Value, ValueError> {
        let index = self.index_of(name)?;
        Ok(&self.values[index])
    }

    /// Get a typed field value by name.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, ValueError> {
        let value = self.get_field(name)?;
        T::from_value(value).ok_or_else(|| ValueError::TypeMismatch {
            field: name.to_string(),
            expected: T::EXPECTED.to_string(),
            found: value.kind_name(),
        })
    }

    /// Get the raw integer of an enum field.
    pub fn get_enum(&self, name: &str) -> Result<i64, ValueError> {
        let value = self.get_field(name)?;
        value.as_enum().ok_or_else(|| ValueError::TypeMismatch {
            field: name.to_string(),
            expected: "enum".to_string(),
            found: value.kind_name(),
        })
    }

    /// Set a field value by name.
    pub fn set<T: IntoValue>(&mut self, name: &str, value: T) -> Result<(), ValueError> {
        let index = self.index_of(name)?;
        let value = value.into_value();
        check_assignable(&self.schema.fields()[index], &value)?;
        self.values[index] = value;
        Ok(())
    }

    /// Set the raw integer of an enum field.
    pub fn set_enum(&mut self, name: &str, raw: i64) -> Result<(), ValueError> {
        self.set(name, Value::Enum(raw))
    }

    /// Mutable access to a nested struct field.
    pub fn nested_mut(&mut self, name: &str) -> Result<&mut VersionedValue, ValueError> {
        let index = self.index_of(name)?;
        let value = &mut self.values[index];
        let found = value.kind_name();
        value.as_struct_mut().ok_or_else(|| ValueError::TypeMismatch {
            field: name.to_string(),
            expected: "struct".to_string(),
            found,
        })
    }

    /// Store a typed field, converting it for the field's declared type.
    pub fn store<T: SaveField>(&mut self, name: &str, value: &T) -> Result<(), ValueError> {
        let index = self.index_of(name)?;
        let converted = value.to_value(&self.schema.fields()[index].field_type)?;
        self.set(name, converted)
    }

    /// Load a typed field.
    pub fn load<T: SaveField>(&self, name: &str) -> Result<T, ValueError> {
        T::from_value(self.get_field(name)?).map_err(|err| match err {
            ValueError::TypeMismatch {
                expected, found, ..
            } => ValueError::TypeMismatch {
                field: name.to_string(),
                expected,
                found,
            },
            other => other,
        })
    }

    fn index_of(&self, name: &str) -> Result<usize, ValueError> {
        self.schema
            .field_index(name)
            .ok_or_else(|| ValueError::FieldNotFound(name.to_string()))
    }
}

impl PartialEq for VersionedValue {
    fn eq(&self, other: &Self) -> bool {
        crate::compare::equal(self, other)
    }
}

fn check_assignable(field: &FieldDescriptor, value: &Value) -> Result<(), ValueError> {
    if !value.matches(&field.field_type) {
        return Err(ValueError::TypeMismatch {
            field: field.name.clone(),
            expected: field.tag().to_string(),
            found: value.kind_name(),
        });
    }
    if let (Some(max), Value::String(s)) = (field.field_type.max_length(), value) {
        if s.len() > max {
            return Err(ValueError::StringTooLong {
                field: field.name.clone(),
                length: s.len(),
                max,
            });
        }
    }
    if let (FieldType::Enum(desc), Value::Enum(raw)) = (&field.field_type, value) {
        if !desc.underlying.holds(*raw) {
            return Err(ValueError::EnumOutOfRange {
                field: field.name.clone(),
                value: *raw,
                underlying: desc.underlying,
            });
        }
    }
    Ok(())
}
