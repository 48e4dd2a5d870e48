//! Wire codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use worldsync_bench::{batch_text, generate_batch};
use worldsync_protocol::{decode_batch_str, encode_snapshot, EntitySnapshot, Position};

/// Benchmark decoding inbound batches of increasing size.
fn bench_decode_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_batch");

    for count in [1usize, 16, 128, 1024] {
        let text = batch_text(&generate_batch(count, count));
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &text, |b, text| {
            b.iter(|| {
                let batch = decode_batch_str(black_box(text)).unwrap();
                black_box(batch);
            });
        });
    }

    group.finish();
}

/// Benchmark encoding the outbound position message.
fn bench_encode_position(c: &mut Criterion) {
    let snapshot = EntitySnapshot::new("local-player", Position::new(12.5, 0.0, -3.25));

    c.bench_function("encode_position", |b| {
        b.iter(|| {
            let message = encode_snapshot(black_box(&snapshot)).unwrap();
            black_box(message);
        });
    });
}

criterion_group!(benches, bench_decode_batch, bench_encode_position);
criterion_main!(benches);
