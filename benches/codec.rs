//! Codec benchmark suite.
//!
//! Benchmarks the hot paths of inbound decoding:
//! - Compact integers in each mode
//! - Lists of fixed-width integers
//! - JSON envelope classification
//!
//! Run with: cargo bench --bench codec
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dotwire::codec::{
    ListReader, ListWriter, ScaleCodecReader, ScaleCodecWriter, UInt32Reader, UInt32Writer,
};
use dotwire::protocol::Envelope;

// ============================================================================
// Benchmark Parameters
// ============================================================================

/// One value per compact mode.
const COMPACT_VALUES: &[(&str, u128)] = &[
    ("single", 42),
    ("two", 16_000),
    ("four", 1_000_000_000),
    ("big", u64::MAX as u128),
];

const LIST_LENGTHS: &[usize] = &[16, 1024];

// ============================================================================
// Benchmark: Compact Integers
// ============================================================================

fn bench_compact(c: &mut Criterion) {
    let mut group = c.benchmark_group("compact");

    for &(mode, value) in COMPACT_VALUES {
        group.bench_with_input(BenchmarkId::new("encode", mode), &value, |b, &value| {
            b.iter(|| {
                let mut wrt = ScaleCodecWriter::with_capacity(17);
                wrt.write_compact(black_box(value));
                wrt.into_bytes()
            });
        });

        let mut wrt = ScaleCodecWriter::new();
        wrt.write_compact(value);
        let encoded = wrt.into_bytes();

        group.bench_with_input(BenchmarkId::new("decode", mode), &encoded, |b, encoded| {
            b.iter(|| ScaleCodecReader::new(black_box(encoded)).read_compact());
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Lists
// ============================================================================

fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_u32");

    for &len in LIST_LENGTHS {
        let values: Vec<u32> = (0..len as u32).collect();
        let mut wrt = ScaleCodecWriter::new();
        wrt.write(&ListWriter::new(UInt32Writer), &values)
            .expect("encode list");
        let encoded = wrt.into_bytes();

        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::new("decode", len), &encoded, |b, encoded| {
            let reader = ListReader::new(UInt32Reader);
            b.iter(|| ScaleCodecReader::new(black_box(encoded)).read::<Vec<u32>, _>(&reader));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Envelope Classification
// ============================================================================

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope");

    let response = r#"{"jsonrpc":"2.0","id":17,"result":"0xd4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b0c1d2e3f4a5b6c7d8e9f0a1b2c3d4e5"}"#;
    let notification = r#"{"jsonrpc":"2.0","method":"chain_newHead","params":{"subscription":"dx3kXBrn","result":{"number":"0x1b4","parentHash":"0x00"}}}"#;

    group.bench_function("response", |b| {
        b.iter(|| Envelope::parse(black_box(response)).map(|_| ()));
    });
    group.bench_function("notification", |b| {
        b.iter(|| Envelope::parse(black_box(notification)).map(|_| ()));
    });

    group.finish();
}

// ============================================================================
// Main
// ============================================================================

criterion_group!(benches, bench_compact, bench_list, bench_envelope);
criterion_main!(benches);
