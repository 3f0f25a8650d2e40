//! End-to-end session benchmarks.
//!
//! Benchmarks for:
//! - Synchronous query plus drain
//! - Prepared-statement execution
//! - Async wave submission and drain

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skein_bench::utils::seeded_session;
use tokio::runtime::Runtime;

fn bench_sync_query(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut session = rt.block_on(seeded_session(128));

    c.bench_function("session/sync_query", |b| {
        b.iter(|| {
            rt.block_on(async {
                session.query("SELECT * FROM users WHERE id = 64").await.unwrap();
                black_box(session.data(None).await.unwrap())
            })
        });
    });
}

fn bench_prepared_statement(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut session = rt.block_on(seeded_session(128));

    c.bench_function("session/prepared", |b| {
        b.iter(|| {
            rt.block_on(async {
                session
                    .bind("SELECT * FROM users WHERE id = ?", vec![64.into()])
                    .await
                    .unwrap();
                black_box(session.data(None).await.unwrap())
            })
        });
    });
}

fn bench_async_wave(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut session = rt.block_on(seeded_session(128));

    c.bench_function("session/async_wave", |b| {
        b.iter(|| {
            rt.block_on(async {
                session
                    .submit_batch(vec![
                        ("a".to_string(), "SELECT * FROM users WHERE id = 1".to_string()),
                        ("b".to_string(), "SELECT * FROM users WHERE id = 2".to_string()),
                        ("c".to_string(), "SELECT * FROM users WHERE id = 3".to_string()),
                    ])
                    .await
                    .unwrap();
                black_box(session.data(None).await.unwrap())
            })
        });
    });
}

criterion_group!(benches, bench_sync_query, bench_prepared_statement, bench_async_wave);
criterion_main!(benches);
