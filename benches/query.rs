//! Query latency across the three backends on a synthetic shingle corpus.
//!
//! Build cost is paid outside the measured loop; only the per-query path is
//! timed. For corpus-scale sweeps use the in-crate harness
//! (`ricercar::benchmark::harness`).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ricercar::benchmark::datasets::{clustered_corpus, uniform_queries};
use ricercar::{Backend, BackendKind, IndexConfig, NearestNeighbors};

fn bench_backends(c: &mut Criterion) {
    let dimension = 30;
    let corpus = clustered_corpus(2000, dimension, 16, 0.05, 42).expect("corpus");
    let queries = uniform_queries(16, dimension, 7);
    let config = IndexConfig::default();

    let mut group = c.benchmark_group("query_k10");
    for kind in BackendKind::ALL {
        let backend = Backend::build(kind, &corpus, &config, 42).expect("build");
        group.bench_with_input(
            BenchmarkId::from_parameter(kind.name()),
            &backend,
            |b, backend| {
                let mut next = 0;
                b.iter(|| {
                    let query = &queries[next % queries.len()];
                    next += 1;
                    black_box(backend.search(black_box(query), 10).expect("search"))
                });
            },
        );
    }
    group.finish();
}

fn bench_hnsw_ef_sweep(c: &mut Criterion) {
    let dimension = 30;
    let corpus = clustered_corpus(2000, dimension, 16, 0.05, 42).expect("corpus");
    let queries = uniform_queries(16, dimension, 11);
    let config = IndexConfig::default();
    let Backend::Hnsw(index) = Backend::build(BackendKind::Hnsw, &corpus, &config, 42).expect("build")
    else {
        unreachable!("hnsw kind builds an hnsw index");
    };

    let mut group = c.benchmark_group("hnsw_ef");
    for ef in [16, 50, 150, 400] {
        group.bench_with_input(BenchmarkId::from_parameter(ef), &ef, |b, &ef| {
            let mut next = 0;
            b.iter(|| {
                let query = &queries[next % queries.len()];
                next += 1;
                black_box(index.search_with_ef(black_box(query), 10, ef).expect("search"))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_backends, bench_hnsw_ef_sweep);
criterion_main!(benches);
