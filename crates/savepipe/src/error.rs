// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types.

use crate::schema::PrimitiveKind;
use std::io;

/// Errors raised while building a [`SchemaRegistry`](crate::SchemaRegistry).
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    #[error("base type cycle detected starting at {type_name}")]
    SchemaCycle { type_name: String },

    #[error("{type_name} names base type {base} which is not registered")]
    DanglingBase { type_name: String, base: String },

    #[error("unsupported type for field {type_name}.{field}: {reason}")]
    UnsupportedFieldType {
        type_name: String,
        field: String,
        reason: String,
    },

    #[error("duplicate field {field} in {type_name}")]
    DuplicateField { type_name: String, field: String },

    #[error("invalid default for field {type_name}.{field}: expected {expected}")]
    InvalidDefault {
        type_name: String,
        field: String,
        expected: String,
    },

    #[error("enum field {type_name}.{field} does not extend its previous version: {detail}")]
    EnumEvolution {
        type_name: String,
        field: String,
        detail: String,
    },

    #[error("version chain of {type_name} has {length} versions (limit {limit})")]
    ChainTooLong {
        type_name: String,
        length: usize,
        limit: u32,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while decoding a blob.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("corrupt header: {reason}")]
    CorruptHeader { reason: String },

    #[error("{type_name} has no version {index} (latest is {latest})")]
    UnknownVersion {
        type_name: String,
        index: u32,
        latest: u32,
    },

    #[error("unexpected end of stream at offset {offset} (needed {needed} bytes)")]
    UnexpectedEndOfStream { offset: usize, needed: usize },

    #[error("invalid UTF-8 in field {field} at offset {offset}")]
    InvalidUtf8 { field: String, offset: usize },

    #[error("string for field {field} is {length} bytes (max {max})")]
    StringTooLong {
        field: String,
        length: usize,
        max: usize,
    },

    #[error("enum field {field} has non-integer underlying type {kind}")]
    NonIntegerEnum { field: String, kind: PrimitiveKind },

    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    #[error("read failed: {0}")]
    Io(#[source] io::Error),
}

/// Errors raised while encoding a value.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("write failed: {0}")]
    Io(#[from] io::Error),

    #[error("field {field} holds {found}, schema expects {expected}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: &'static str,
    },

    #[error("field {field} is {length} bytes, too long for a u32 length prefix")]
    Oversized { field: String, length: usize },

    #[error("enum field {field} holds {value}, which does not fit {underlying}")]
    EnumOutOfRange {
        field: String,
        value: i64,
        underlying: PrimitiveKind,
    },
}

/// Errors raised by typed access to a [`VersionedValue`](crate::VersionedValue).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("field {field} holds {found}, expected {expected}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: &'static str,
    },

    #[error("expected {expected} fields, got {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("string for field {field} is {length} bytes (max {max})")]
    StringTooLong {
        field: String,
        length: usize,
        max: usize,
    },

    #[error("{enum_name} has no variant with value {value}")]
    UnknownEnumValue { enum_name: String, value: i64 },

    #[error("enum field {field} cannot hold {value} in {underlying}")]
    EnumOutOfRange {
        field: String,
        value: i64,
        underlying: PrimitiveKind,
    },
}

/// Errors raised while loading a [`RegistryConfig`](crate::RegistryConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Umbrella error for the typed record API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias for the typed record API.
pub type Result<T> = std::result::Result<T, Error>;
