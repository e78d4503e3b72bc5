// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # savepipe - versioned binary save data
//!
//! Persist structured records in a compact binary form and keep reading them
//! after the record type has changed. Every version of a type names the
//! version it replaces; a blob records which version wrote it, and reading
//! promotes it one version at a time to the current shape.
//!
//! ## Quick Start
//!
//! ```rust
//! use savepipe::{SaveRecord, SchemaRegistry, TypeCatalog};
//!
//! #[derive(Debug, PartialEq, SaveRecord)]
//! struct SaveV1 {
//!     count: i32,
//!     name: String,
//! }
//!
//! #[derive(Debug, PartialEq, SaveRecord)]
//! #[save(base = SaveV1)]
//! struct Save {
//!     count: i32,
//!     name: String,
//!     #[save(default = 60.0)]
//!     time: f32,
//! }
//!
//! # fn main() -> savepipe::Result<()> {
//! let mut catalog = TypeCatalog::new();
//! catalog.register::<Save>();
//! let registry = SchemaRegistry::build(&catalog)?;
//!
//! // written by an older build of the application
//! let old = registry.write_record(&SaveV1 { count: 3, name: "slot".into() })?;
//!
//! let save: Save = registry.read_record(&old)?;
//! assert_eq!(save, Save { count: 3, name: "slot".into(), time: 60.0 });
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ReflectionProvider (TypeCatalog / #[derive(SaveRecord)])
//!        |
//!        v
//! SchemaRegistry ---- SchemaChain: V0 <- V1 <- ... <- latest
//!        |
//!        +-- write: VersionedValue -> [u32 index][fields...]
//!        +-- read:  bytes -> decode with V(index) -> migrate -> latest
//! ```
//!
//! Fields correspond across versions only when both name and type are
//! identical; anything else is dropped (old side) or defaulted (new side).
//!
//! ## Modules Overview
//!
//! - [`schema`] - schema model, reflection and the registry
//! - [`codec`] - binary writer and reader
//! - [`migrate`] - cross-version promotion
//! - [`compare`] - field-name equality and copy
//! - [`record`] - typed bridge used by the derive macros

// Allow the derive macros to work inside this crate's tests
extern crate self as savepipe;

/// Binary writer and reader.
pub mod codec;
/// Field-name based equality and copy.
pub mod compare;
/// Registry configuration.
pub mod config;
/// Error types.
pub mod error;
/// Cross-version promotion.
pub mod migrate;
/// Typed record bridge.
pub mod record;
/// Schema model, reflection and the registry.
pub mod schema;
/// Field values.
pub mod value;
/// Values bound to a schema version.
pub mod versioned;

pub use codec::{ByteSink, ByteSource, Decoded, IoSink, IoSource, SliceSource};
pub use config::{EnumEvolution, RegistryConfig, RegistryConfigBuilder};
pub use error::{ConfigError, Error, ReadError, RegistryError, Result, ValueError, WriteError};
pub use record::{SaveEnum, SaveField, SaveRecord};
pub use schema::{
    EnumBuilder, EnumDescriptor, EnumVariant, FieldDescriptor, FieldType, PrimitiveKind,
    ReflectedEnum, ReflectedField, ReflectedStruct, ReflectedType, ReflectionProvider,
    SchemaChain, SchemaRegistry, SchemaVersion, StructBuilder, TypeCatalog, TypeTag,
};
pub use value::{FromValue, IntoValue, Value};
pub use versioned::VersionedValue;

pub use savepipe_derive::{SaveEnum, SaveRecord}; // Derive macros (for #[derive(savepipe::SaveRecord)])
