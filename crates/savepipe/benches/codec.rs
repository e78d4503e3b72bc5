// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec Benchmark
//!
//! Measures:
//! - write of the latest version with growing string payloads
//! - read at the latest version (identity)
//! - read of a root-version blob promoted through the whole chain

#![allow(clippy::uninlined_format_args)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use savepipe::{SaveEnum, SaveRecord, SchemaRegistry, TypeCatalog};
use std::hint::black_box as bb;

#[derive(Debug, Clone, Copy, PartialEq, SaveEnum)]
#[repr(u8)]
enum Mode {
    Normal,
    Hard,
}

#[derive(Debug, Clone, SaveRecord)]
struct Vec3 {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Clone, SaveRecord)]
struct BenchSaveV1 {
    seq: u64,
    name: String,
}

#[derive(Debug, Clone, SaveRecord)]
#[save(base = BenchSaveV1)]
struct BenchSaveV2 {
    seq: u64,
    name: String,
    mode: Mode,
}

#[derive(Debug, Clone, SaveRecord)]
#[save(base = BenchSaveV2)]
struct BenchSave {
    seq: u64,
    name: String,
    mode: Mode,
    #[save(fixed = 16)]
    slot: String,
    position: Vec3,
}

fn registry() -> SchemaRegistry {
    let mut catalog = TypeCatalog::new();
    catalog.register::<BenchSave>();
    SchemaRegistry::build(&catalog).expect("registry build")
}

fn bench_save(size: usize) -> BenchSave {
    BenchSave {
        seq: 42,
        name: "x".repeat(size),
        mode: Mode::Hard,
        slot: "slot-0".into(),
        position: Vec3 {
            x: 1.0,
            y: 2.0,
            z: 3.0,
        },
    }
}

/// Benchmark write with different string sizes
fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_by_size");
    let registry = registry();

    for size in [0, 64, 1024, 16384] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let save = bench_save(size);
            b.iter(|| registry.write_record(bb(&save)).expect("write"));
        });
    }

    group.finish();
}

/// Benchmark read at the latest version vs a migrated root blob
fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");
    let registry = registry();

    let latest = registry.write_record(&bench_save(64)).expect("write");
    group.bench_function("latest", |b| {
        b.iter(|| registry.read("BenchSave", bb(&latest)).expect("read"));
    });

    let root = registry
        .write_record(&BenchSaveV1 {
            seq: 42,
            name: "x".repeat(64),
        })
        .expect("write");
    group.bench_function("migrated_from_root", |b| {
        b.iter(|| registry.read("BenchSave", bb(&root)).expect("read"));
    });

    group.finish();
}

criterion_group!(benches, bench_write, bench_read);
criterion_main!(benches);
