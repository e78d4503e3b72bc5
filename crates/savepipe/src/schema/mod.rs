// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema model, reflection and the version-chain registry.
//!
//! # Example
//!
//! ```
//! use savepipe::{PrimitiveKind, SchemaRegistry, StructBuilder, TypeCatalog};
//!
//! let catalog = TypeCatalog::new()
//!     .with_struct(StructBuilder::new("SaveV1").field("hp", PrimitiveKind::U16).build())
//!     .with_struct(
//!         StructBuilder::new("Save")
//!             .base("SaveV1")
//!             .field("hp", PrimitiveKind::U16)
//!             .string_field("name")
//!             .build(),
//!     );
//!
//! let registry = SchemaRegistry::build(&catalog).unwrap();
//! assert_eq!(registry.resolve("Save").unwrap().len(), 2);
//! ```

pub mod catalog;
mod extract;
pub mod reflect;
pub mod registry;
pub mod types;

pub use catalog::{EnumBuilder, StructBuilder, TypeCatalog};
pub use reflect::{
    ReflectedEnum, ReflectedField, ReflectedStruct, ReflectedType, ReflectionProvider,
};
pub use registry::{SchemaChain, SchemaRegistry};
pub use types::{
    EnumDescriptor, EnumVariant, FieldDescriptor, FieldType, PrimitiveKind, SchemaVersion,
    TypeTag,
};
