// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use savepipe::{EnumBuilder, PrimitiveKind, SchemaRegistry, StructBuilder, TypeCatalog};
use std::sync::OnceLock;

fn registry() -> &'static SchemaRegistry {
    static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let catalog = TypeCatalog::new()
            .with_enum(
                EnumBuilder::new("Mode")
                    .variant("Normal")
                    .variant("Hard")
                    .underlying(PrimitiveKind::U8)
                    .build(),
            )
            .with_struct(
                StructBuilder::new("PosV1")
                    .field("x", PrimitiveKind::F32)
                    .field("y", PrimitiveKind::F32)
                    .build(),
            )
            .with_struct(
                StructBuilder::new("SaveV1")
                    .field("count", PrimitiveKind::I32)
                    .string_field("name")
                    .struct_field("pos", "PosV1")
                    .build(),
            )
            .with_struct(
                StructBuilder::new("Save")
                    .base("SaveV1")
                    .field("count", PrimitiveKind::I32)
                    .bounded_string_field("name", 16)
                    .enum_field("mode", "Mode")
                    .fixed_string_field("slot", 8)
                    .struct_field("pos", "PosV1")
                    .build(),
            );
        match SchemaRegistry::build(&catalog) {
            Ok(registry) => registry,
            Err(err) => panic!("fuzz registry: {}", err),
        }
    })
}

fuzz_target!(|data: &[u8]| {
    // Fuzz the reader and migration at the latest version
    let _ = registry().read("Save", data);

    // Fuzz a read that must reject newer versions
    let _ = registry().read("SaveV1", data);
});
