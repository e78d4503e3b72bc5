// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary reader.
//!
//! Decodes a blob strictly with the schema version named by its header and
//! then promotes the result along the chain to the latest version.

use super::io::{ByteSource, SliceSource};
use crate::error::ReadError;
use crate::migrate;
use crate::schema::{FieldDescriptor, FieldType, PrimitiveKind, SchemaChain, SchemaVersion};
use crate::value::Value;
use crate::versioned::VersionedValue;
use std::io;
use std::sync::Arc;

/// Upper bound of a single read when the source size is unknown.
const CHUNK_SIZE: usize = 64 * 1024;

/// Result of a read, with the version found in the header.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// Value bound to the chain's latest version.
    pub value: VersionedValue,
    /// Version index written in the blob header.
    pub source_version: u32,
    /// Name fingerprint of the version that wrote the blob.
    pub source_fingerprint: u32,
    /// Number of migration steps applied.
    pub steps: usize,
}

impl Decoded {
    /// Whether the blob was written by an older version.
    pub fn migrated(&self) -> bool {
        self.steps > 0
    }
}

/// Decode a blob against a chain.
pub fn decode(chain: &SchemaChain, bytes: &[u8], max_versions: u32) -> Result<Decoded, ReadError> {
    let mut source = SliceSource::new(bytes);
    decode_from(chain, &mut source, max_versions)
}

/// Decode one blob from a source against a chain.
pub fn decode_from<S: ByteSource + ?Sized>(
    chain: &SchemaChain,
    source: &mut S,
    max_versions: u32,
) -> Result<Decoded, ReadError> {
    let mut decoder = Decoder { source };
    let index = decoder.decode_header(max_versions)?;
    let schema = chain.get(index).ok_or_else(|| ReadError::UnknownVersion {
        type_name: chain.type_name().to_string(),
        index,
        latest: chain.latest().index(),
    })?;

    let source_fingerprint = schema.fingerprint();
    let value = decoder.decode_struct(schema)?;
    let steps = (chain.latest().index() - index) as usize;
    let value = migrate::promote(value, chain);

    Ok(Decoded {
        value,
        source_version: index,
        source_fingerprint,
        steps,
    })
}

/// Read `$ty` in little-endian byte order.
macro_rules! read_le {
    ($self:ident, $ty:ty) => {
        <$ty>::from_le_bytes($self.read_array()?)
    };
}

struct Decoder<'a, S: ?Sized> {
    source: &'a mut S,
}

impl<S: ByteSource + ?Sized> Decoder<'_, S> {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        let offset = self.source.position();
        let needed = buf.len();
        self.source.read_exact_into(buf).map_err(|err| match err.kind() {
            io::ErrorKind::UnexpectedEof => ReadError::UnexpectedEndOfStream { offset, needed },
            _ => ReadError::Io(err),
        })
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        let mut bytes = [0u8; N];
        self.read_into(&mut bytes)?;
        Ok(bytes)
    }

    /// Read `len` bytes, growing the buffer as data actually arrives.
    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, ReadError> {
        if let Some(remaining) = self.source.remaining() {
            if len > remaining {
                return Err(ReadError::UnexpectedEndOfStream {
                    offset: self.source.position(),
                    needed: len,
                });
            }
        }
        let mut bytes = Vec::with_capacity(len.min(CHUNK_SIZE));
        while bytes.len() < len {
            let start = bytes.len();
            let take = (len - start).min(CHUNK_SIZE);
            bytes.resize(start + take, 0);
            self.read_into(&mut bytes[start..])?;
        }
        Ok(bytes)
    }

    fn decode_header(&mut self, max_versions: u32) -> Result<u32, ReadError> {
        let mut header = [0u8; 4];
        self.source
            .read_exact_into(&mut header)
            .map_err(|err| match err.kind() {
                io::ErrorKind::UnexpectedEof => ReadError::CorruptHeader {
                    reason: "fewer than 4 header bytes".to_string(),
                },
                _ => ReadError::Io(err),
            })?;
        let index = u32::from_le_bytes(header);
        if index >= max_versions {
            return Err(ReadError::CorruptHeader {
                reason: format!("version index {} exceeds limit {}", index, max_versions),
            });
        }
        Ok(index)
    }

    fn decode_struct(&mut self, schema: &Arc<SchemaVersion>) -> Result<VersionedValue, ReadError> {
        let mut values = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            values.push(self.decode_field(field)?);
        }
        Ok(VersionedValue::from_parts(Arc::clone(schema), values))
    }

    fn decode_field(&mut self, field: &FieldDescriptor) -> Result<Value, ReadError> {
        match &field.field_type {
            FieldType::Primitive(kind) => self.decode_primitive(*kind),
            FieldType::Enum(desc) => {
                let raw = self.decode_int(field, desc.underlying)?;
                if desc.variant_by_value(raw).is_none() {
                    log::warn!(
                        "[savepipe] field {}: value {} names no variant of {}",
                        field.name,
                        raw,
                        desc.name
                    );
                }
                Ok(Value::Enum(raw))
            }
            FieldType::FixedString { width } => {
                let bytes = self.read_vec(*width)?;
                let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
                Ok(Value::String(
                    String::from_utf8_lossy(&bytes[..end]).into_owned(),
                ))
            }
            FieldType::String { max_length } => {
                let len = read_le!(self, u32) as usize;
                if let Some(max) = *max_length {
                    if len > max {
                        return Err(ReadError::StringTooLong {
                            field: field.name.clone(),
                            length: len,
                            max,
                        });
                    }
                }
                let offset = self.source.position();
                let bytes = self.read_vec(len)?;
                let s = String::from_utf8(bytes).map_err(|_| ReadError::InvalidUtf8 {
                    field: field.name.clone(),
                    offset,
                })?;
                Ok(Value::String(s))
            }
            FieldType::Struct(schema) => Ok(Value::Struct(self.decode_struct(schema)?)),
        }
    }

    // @audit-ok: Simple pattern matching - primitive decoding dispatch table
    fn decode_primitive(&mut self, kind: PrimitiveKind) -> Result<Value, ReadError> {
        Ok(match kind {
            PrimitiveKind::Bool => Value::Bool(read_le!(self, u8) != 0),
            PrimitiveKind::U8 => Value::U8(read_le!(self, u8)),
            PrimitiveKind::U16 => Value::U16(read_le!(self, u16)),
            PrimitiveKind::U32 => Value::U32(read_le!(self, u32)),
            PrimitiveKind::U64 => Value::U64(read_le!(self, u64)),
            PrimitiveKind::I8 => Value::I8(read_le!(self, i8)),
            PrimitiveKind::I16 => Value::I16(read_le!(self, i16)),
            PrimitiveKind::I32 => Value::I32(read_le!(self, i32)),
            PrimitiveKind::I64 => Value::I64(read_le!(self, i64)),
            PrimitiveKind::F32 => Value::F32(read_le!(self, f32)),
            PrimitiveKind::F64 => Value::F64(read_le!(self, f64)),
        })
    }

    /// Enum raw values are widened from the underlying width.
    fn decode_int(&mut self, field: &FieldDescriptor, kind: PrimitiveKind) -> Result<i64, ReadError> {
        Ok(match kind {
            PrimitiveKind::U8 => i64::from(read_le!(self, u8)),
            PrimitiveKind::U16 => i64::from(read_le!(self, u16)),
            PrimitiveKind::U32 => i64::from(read_le!(self, u32)),
            PrimitiveKind::U64 => read_le!(self, u64) as i64,
            PrimitiveKind::I8 => i64::from(read_le!(self, i8)),
            PrimitiveKind::I16 => i64::from(read_le!(self, i16)),
            PrimitiveKind::I32 => i64::from(read_le!(self, i32)),
            PrimitiveKind::I64 => read_le!(self, i64),
            PrimitiveKind::Bool | PrimitiveKind::F32 | PrimitiveKind::F64 => {
                return Err(ReadError::NonIntegerEnum {
                    field: field.name.clone(),
                    kind,
                })
            }
        })
    }
}
