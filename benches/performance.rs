#![allow(missing_docs)]

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tagcode::{Tagcode, WireEntity};

#[derive(Clone, Debug, WireEntity)]
struct BenchItem {
    #[wire(index = 0)]
    id: u64,
    #[wire(index = 1)]
    name: Option<String>,
    #[wire(index = 2)]
    payload: Vec<u64>,
}

#[derive(Clone, Debug, WireEntity)]
struct BenchCollection {
    #[wire(index = 0)]
    data: Vec<BenchItem>,
}

fn generate_items(count: usize) -> Vec<BenchItem> {
    (0..count)
        .map(|i| BenchItem {
            id: i as u64,
            name: (i % 3 == 0).then(|| format!("item-{i}")),
            payload: vec![i as u64; 128],
        })
        .collect()
}

fn codec() -> Tagcode {
    let mut codec = Tagcode::new();
    codec
        .register::<BenchCollection>()
        .expect("Failed to register schema");
    codec
}

// --- BENCHMARKS ---

fn bench_single(c: &mut Criterion) {
    let codec = codec();
    let data = BenchCollection {
        data: generate_items(10_000),
    };
    let bytes = codec.to_bytes(&data).expect("Failed to encode");

    let mut group = c.benchmark_group("Single Entity");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("to_bytes", |b| {
        b.iter(|| codec.to_bytes(black_box(&data)).expect("Failed to encode"));
    });

    group.bench_function("from_bytes", |b| {
        b.iter(|| {
            codec
                .from_bytes::<BenchCollection>(black_box(&bytes))
                .expect("Failed to decode")
        });
    });

    let schema = codec.schema("BenchCollection").expect("schema");
    group.bench_function("inspect", |b| {
        b.iter(|| codec.inspect(black_box(&bytes), schema).expect("Failed to inspect"));
    });

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let codec = codec();
    let items = generate_items(20_000);
    let encoded = codec.to_bytes_batch(&items).expect("Failed to encode");

    let mut group = c.benchmark_group("Batch");
    group.throughput(Throughput::Elements(items.len() as u64));

    group.bench_function("sequential_encode", |b| {
        b.iter(|| {
            items
                .iter()
                .map(|item| codec.to_bytes(item).expect("Failed to encode"))
                .collect::<Vec<_>>()
        });
    });

    group.bench_function("parallel_encode", |b| {
        b.iter(|| codec.to_bytes_batch(black_box(&items)).expect("Failed to encode"));
    });

    group.bench_function("parallel_decode", |b| {
        b.iter(|| {
            codec
                .from_bytes_batch::<BenchItem, _>(black_box(&encoded))
                .expect("Failed to decode")
        });
    });

    group.finish();
}

criterion_group!(benches, bench_single, bench_batch);
criterion_main!(benches);
