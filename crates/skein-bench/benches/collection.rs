//! Collection benchmarks.
//!
//! Benchmarks for:
//! - Positional push and seek
//! - Named-child overwrite
//! - Fuzzy name lookup at varying history sizes

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skein_client::Collection;
use skein_driver::Value;

fn filled(len: usize) -> Collection {
    let mut c = Collection::new("bench");
    for i in 0..len {
        let mut child = Collection::new(format!("query_result_{}", i));
        child.push(Value::Integer(i as i64));
        c.push(child);
    }
    c
}

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection/push");
    for size in [16usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut collection = Collection::new("bench");
                for i in 0..size {
                    collection.push(Value::Integer(i as i64));
                }
                black_box(collection.len())
            });
        });
    }
    group.finish();
}

fn bench_seek(c: &mut Criterion) {
    let collection = filled(4096);
    c.bench_function("collection/seek", |b| {
        b.iter(|| {
            black_box(collection.seek(black_box(2048)).unwrap());
            black_box(collection.seek(black_box(-1)).unwrap());
        });
    });
}

fn bench_named_overwrite(c: &mut Criterion) {
    c.bench_function("collection/named_overwrite", |b| {
        b.iter(|| {
            let mut collection = Collection::new("bench");
            for _ in 0..64 {
                collection.push(Collection::new("same_name"));
            }
            black_box(collection.len())
        });
    });
}

fn bench_fuzzy_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection/get_queue_like");
    for size in [16usize, 256, 1024] {
        let collection = filled(size);
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &collection,
            |b, collection| {
                b.iter(|| black_box(collection.get_queue_like("query_resalt_7")));
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_push,
    bench_seek,
    bench_named_overwrite,
    bench_fuzzy_lookup
);
criterion_main!(benches);
