// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Save-game scenarios: a three-version chain whose latest version adds a
// field and an enum variant. Byte layouts are asserted exactly.

#![allow(clippy::float_cmp)]
#![allow(clippy::unreadable_literal)]

use savepipe::{
    EnumBuilder, PrimitiveKind, ReadError, SchemaRegistry, StructBuilder, TypeCatalog,
    VersionedValue,
};

const APP_NAME: &str = "テストアプリケーション";

fn catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with_enum(
            EnumBuilder::new("FlagOld")
                .variant("HogeHoge")
                .variant("Foo")
                .variant("Piyo")
                .underlying(PrimitiveKind::U8)
                .build(),
        )
        .with_enum(
            EnumBuilder::new("Flag")
                .variant("HogeHoge")
                .variant("Foo")
                .variant("Piyo")
                .variant("Pool")
                .underlying(PrimitiveKind::U8)
                .build(),
        )
        .with_struct(
            StructBuilder::new("SaveOldVersion1")
                .enum_field("Flag", "FlagOld")
                .field("Count", PrimitiveKind::I32)
                .build(),
        )
        .with_struct(
            StructBuilder::new("SaveOldVersion2")
                .base("SaveOldVersion1")
                .enum_field("Flag", "FlagOld")
                .field("Count", PrimitiveKind::I32)
                .string_field("HogeHoge")
                .build(),
        )
        .with_struct(
            StructBuilder::new("SaveVersionLatest")
                .base("SaveOldVersion2")
                .enum_field("Flag", "Flag")
                .field("Count", PrimitiveKind::I32)
                .string_field("HogeHoge")
                .field("Time", PrimitiveKind::F32)
                .build(),
        )
}

fn registry() -> SchemaRegistry {
    SchemaRegistry::build(&catalog()).expect("valid catalog")
}

fn fill(value: &mut VersionedValue) {
    value.set_enum("Flag", 0).unwrap();
    value.set("Count", 12345i32).unwrap();
    if value.schema().field("HogeHoge").is_some() {
        value.set("HogeHoge", APP_NAME).unwrap();
    }
    if value.schema().field("Time").is_some() {
        value.set("Time", 3.1415f32).unwrap();
    }
}

fn expected_latest_bytes() -> Vec<u8> {
    let mut bytes = vec![2, 0, 0, 0]; // version index
    bytes.push(0); // Flag = HogeHoge
    bytes.extend_from_slice(&[0x39, 0x30, 0x00, 0x00]); // Count = 12345
    bytes.extend_from_slice(&[33, 0, 0, 0]); // HogeHoge length
    bytes.extend_from_slice(APP_NAME.as_bytes());
    bytes.extend_from_slice(&[0x56, 0x0e, 0x49, 0x40]); // Time = 3.1415
    bytes
}

#[test]
fn scenario_a_latest_round_trip() {
    let reg = registry();
    let mut save = reg.new_value("SaveVersionLatest").unwrap();
    fill(&mut save);

    let bytes = reg.write(&save).unwrap();
    assert_eq!(bytes, expected_latest_bytes());

    let decoded = reg.read_detailed("SaveVersionLatest", &bytes).unwrap();
    assert_eq!(decoded.source_version, 2);
    assert_eq!(decoded.steps, 0);
    assert_eq!(decoded.value, save);
    assert_eq!(decoded.value.get_enum("Flag").unwrap(), 0);
    assert_eq!(decoded.value.get::<i32>("Count").unwrap(), 12345);
    assert_eq!(decoded.value.get::<String>("HogeHoge").unwrap(), APP_NAME);
    assert_eq!(decoded.value.get::<f32>("Time").unwrap(), 3.1415);
}

#[test]
fn scenario_b_old_blob_read_as_latest() {
    let reg = registry();
    let mut old = reg.new_value("SaveOldVersion2").unwrap();
    fill(&mut old);

    let bytes = reg.write(&old).unwrap();
    assert_eq!(&bytes[..4], &[1, 0, 0, 0]);
    assert_eq!(bytes.len(), 4 + 1 + 4 + 4 + APP_NAME.len());

    let decoded = reg.read_detailed("SaveVersionLatest", &bytes).unwrap();
    assert_eq!(decoded.source_version, 1);
    assert_eq!(decoded.steps, 1);

    let latest = decoded.value;
    assert_eq!(latest.type_name(), "SaveVersionLatest");
    assert_eq!(latest.get_enum("Flag").unwrap(), 0);
    assert_eq!(latest.get::<i32>("Count").unwrap(), 12345);
    assert_eq!(latest.get::<String>("HogeHoge").unwrap(), APP_NAME);
    assert_eq!(latest.get::<f32>("Time").unwrap(), 0.0);
}

#[test]
fn root_blob_walks_the_whole_chain() {
    let reg = registry();
    let mut root = reg.new_value("SaveOldVersion1").unwrap();
    fill(&mut root);
    root.set_enum("Flag", 2).unwrap();

    let bytes = reg.write(&root).unwrap();
    assert_eq!(bytes, vec![0, 0, 0, 0, 2, 0x39, 0x30, 0, 0]);

    let decoded = reg.read_detailed("SaveVersionLatest", &bytes).unwrap();
    assert_eq!(decoded.steps, 2);
    assert_eq!(decoded.value.get_enum("Flag").unwrap(), 2);
    assert_eq!(decoded.value.get::<i32>("Count").unwrap(), 12345);
    assert_eq!(decoded.value.get::<String>("HogeHoge").unwrap(), "");
}

#[test]
fn old_type_name_reads_only_its_own_history() {
    let reg = registry();
    let mut latest = reg.new_value("SaveVersionLatest").unwrap();
    fill(&mut latest);
    let bytes = reg.write(&latest).unwrap();

    // SaveOldVersion2's chain has no version 2
    assert!(matches!(
        reg.read("SaveOldVersion2", &bytes),
        Err(ReadError::UnknownVersion {
            index: 2,
            latest: 1,
            ..
        })
    ));
}

#[test]
fn latest_read_is_idempotent() {
    let reg = registry();
    let mut old = reg.new_value("SaveOldVersion2").unwrap();
    fill(&mut old);

    let once = reg
        .read("SaveVersionLatest", &reg.write(&old).unwrap())
        .unwrap();
    let twice = reg
        .read("SaveVersionLatest", &reg.write(&once).unwrap())
        .unwrap();
    assert_eq!(once, twice);
    assert_eq!(reg.write(&once).unwrap(), reg.write(&twice).unwrap());
}
