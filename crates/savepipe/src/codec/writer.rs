// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary writer.

use super::io::ByteSink;
use crate::error::WriteError;
use crate::schema::{FieldDescriptor, FieldType, PrimitiveKind};
use crate::value::Value;
use crate::versioned::VersionedValue;

/// Encode a value with its version header.
pub fn encode(value: &VersionedValue) -> Result<Vec<u8>, WriteError> {
    let mut buffer = Vec::with_capacity(4 + value.schema().min_payload_size());
    encode_into(value, &mut buffer)?;
    Ok(buffer)
}

/// Encode a value with its version header into a sink.
///
/// Returns the number of bytes written.
pub fn encode_into<S: ByteSink + ?Sized>(
    value: &VersionedValue,
    sink: &mut S,
) -> Result<usize, WriteError> {
    let mut encoder = Encoder { sink, written: 0 };
    encoder.put(&value.version().to_le_bytes())?;
    encoder.encode_struct(value)?;
    Ok(encoder.written)
}

/// Field payload encoder; no alignment, no padding.
struct Encoder<'a, S: ?Sized> {
    sink: &'a mut S,
    written: usize,
}

impl<S: ByteSink + ?Sized> Encoder<'_, S> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), WriteError> {
        self.sink.write_bytes(bytes)?;
        self.written += bytes.len();
        Ok(())
    }

    fn encode_struct(&mut self, value: &VersionedValue) -> Result<(), WriteError> {
        for (field, field_value) in value.fields() {
            self.encode_field(field, field_value)?;
        }
        Ok(())
    }

    fn encode_field(&mut self, field: &FieldDescriptor, value: &Value) -> Result<(), WriteError> {
        match (&field.field_type, value) {
            (FieldType::Primitive(kind), _) => self.encode_primitive(field, *kind, value),
            (FieldType::Enum(desc), Value::Enum(raw)) => {
                self.encode_int(field, desc.underlying, *raw)
            }
            (FieldType::FixedString { width }, Value::String(s)) => {
                let mut slot = vec![0u8; *width];
                let kept = truncate_to_char_boundary(s, *width);
                slot[..kept.len()].copy_from_slice(kept);
                self.put(&slot)
            }
            (FieldType::String { .. }, Value::String(s)) => {
                let length = u32::try_from(s.len()).map_err(|_| WriteError::Oversized {
                    field: field.name.clone(),
                    length: s.len(),
                })?;
                self.put(&length.to_le_bytes())?;
                self.put(s.as_bytes())
            }
            (FieldType::Struct(schema), Value::Struct(nested)) if nested.schema().same_as(schema) => {
                self.encode_struct(nested)
            }
            _ => Err(mismatch(field, value)),
        }
    }

    // @audit-ok: Simple pattern matching - primitive encoding dispatch table
    fn encode_primitive(
        &mut self,
        field: &FieldDescriptor,
        kind: PrimitiveKind,
        value: &Value,
    ) -> Result<(), WriteError> {
        match (kind, value) {
            (PrimitiveKind::Bool, Value::Bool(v)) => self.put(&[u8::from(*v)]),
            (PrimitiveKind::U8, Value::U8(v)) => self.put(&v.to_le_bytes()),
            (PrimitiveKind::U16, Value::U16(v)) => self.put(&v.to_le_bytes()),
            (PrimitiveKind::U32, Value::U32(v)) => self.put(&v.to_le_bytes()),
            (PrimitiveKind::U64, Value::U64(v)) => self.put(&v.to_le_bytes()),
            (PrimitiveKind::I8, Value::I8(v)) => self.put(&v.to_le_bytes()),
            (PrimitiveKind::I16, Value::I16(v)) => self.put(&v.to_le_bytes()),
            (PrimitiveKind::I32, Value::I32(v)) => self.put(&v.to_le_bytes()),
            (PrimitiveKind::I64, Value::I64(v)) => self.put(&v.to_le_bytes()),
            (PrimitiveKind::F32, Value::F32(v)) => self.put(&v.to_le_bytes()),
            (PrimitiveKind::F64, Value::F64(v)) => self.put(&v.to_le_bytes()),
            _ => Err(mismatch(field, value)),
        }
    }

    /// Enum raw values are written at the underlying width; values that do
    /// not fit are rejected rather than truncated.
    fn encode_int(
        &mut self,
        field: &FieldDescriptor,
        kind: PrimitiveKind,
        raw: i64,
    ) -> Result<(), WriteError> {
        let out_of_range = |_| WriteError::EnumOutOfRange {
            field: field.name.clone(),
            value: raw,
            underlying: kind,
        };
        match kind {
            PrimitiveKind::U8 => self.put(&u8::try_from(raw).map_err(out_of_range)?.to_le_bytes()),
            PrimitiveKind::U16 => self.put(&u16::try_from(raw).map_err(out_of_range)?.to_le_bytes()),
            PrimitiveKind::U32 => self.put(&u32::try_from(raw).map_err(out_of_range)?.to_le_bytes()),
            // u64 raw values above i64::MAX are stored reinterpreted
            PrimitiveKind::U64 => self.put(&raw.to_le_bytes()),
            PrimitiveKind::I8 => self.put(&i8::try_from(raw).map_err(out_of_range)?.to_le_bytes()),
            PrimitiveKind::I16 => self.put(&i16::try_from(raw).map_err(out_of_range)?.to_le_bytes()),
            PrimitiveKind::I32 => self.put(&i32::try_from(raw).map_err(out_of_range)?.to_le_bytes()),
            PrimitiveKind::I64 => self.put(&raw.to_le_bytes()),
            PrimitiveKind::Bool | PrimitiveKind::F32 | PrimitiveKind::F64 => {
                Err(mismatch(field, &Value::Enum(raw)))
            }
        }
    }
}

/// Longest prefix of `s` that fits in `width` bytes without splitting a character.
pub(crate) fn truncate_to_char_boundary(s: &str, width: usize) -> &[u8] {
    let mut end = s.len().min(width);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s.as_bytes()[..end]
}

fn mismatch(field: &FieldDescriptor, value: &Value) -> WriteError {
    WriteError::TypeMismatch {
        field: field.name.clone(),
        expected: field.tag().to_string(),
        found: value.kind_name(),
    }
}
