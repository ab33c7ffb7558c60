//! Query latency measurement across backends.
//!
//! The harness issues identical queries against already-built backends and
//! reports wall-clock statistics per backend. Build cost never leaks into
//! per-query timings: [`compare_backends`] times build and query phases
//! separately.

use std::time::Instant;

use crate::backend::{Backend, BackendKind, NearestNeighbors};
use crate::config::IndexConfig;
use crate::corpus::Corpus;
use crate::error::Result;

/// Wall-clock statistics over a set of query latency samples, in
/// microseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyStats {
    pub n_queries: usize,
    pub mean_us: f64,
    pub std_us: f64,
    pub min_us: f64,
    pub max_us: f64,
}

impl LatencyStats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self {
                n_queries: 0,
                mean_us: 0.0,
                std_us: 0.0,
                min_us: 0.0,
                max_us: 0.0,
            };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64;
        Self {
            n_queries: n,
            mean_us: mean,
            std_us: variance.sqrt(),
            min_us: samples.iter().copied().fold(f64::INFINITY, f64::min),
            max_us: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Time `rounds` passes of the query set against one built backend.
pub fn time_queries(
    backend: &Backend,
    queries: &[Vec<f32>],
    k: usize,
    rounds: usize,
) -> Result<LatencyStats> {
    let mut samples = Vec::with_capacity(queries.len() * rounds);
    for _ in 0..rounds {
        for query in queries {
            let started = Instant::now();
            let hits = backend.search(query, k)?;
            samples.push(started.elapsed().as_secs_f64() * 1e6);
            std::hint::black_box(hits);
        }
    }
    Ok(LatencyStats::from_samples(&samples))
}

/// Timing results for one backend: one-time build cost plus per-query
/// statistics.
#[derive(Debug, Clone)]
pub struct BackendReport {
    pub kind: BackendKind,
    pub build_us: f64,
    pub query: LatencyStats,
}

/// Side-by-side timing of all backends over one corpus and query set.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub k: usize,
    pub reports: Vec<BackendReport>,
}

impl Comparison {
    pub fn report(&self, kind: BackendKind) -> Option<&BackendReport> {
        self.reports.iter().find(|r| r.kind == kind)
    }
}

/// Build every backend over `corpus` and time the same `queries` against
/// each, `rounds` passes per backend. The result-set size is
/// `config.n_neighbors`.
pub fn compare_backends(
    corpus: &Corpus,
    config: &IndexConfig,
    seed: u64,
    queries: &[Vec<f32>],
    rounds: usize,
) -> Result<Comparison> {
    let mut reports = Vec::with_capacity(BackendKind::ALL.len());
    for kind in BackendKind::ALL {
        let started = Instant::now();
        let backend = Backend::build(kind, corpus, config, seed)?;
        let build_us = started.elapsed().as_secs_f64() * 1e6;
        let query = time_queries(&backend, queries, config.n_neighbors, rounds)?;
        reports.push(BackendReport {
            kind,
            build_us,
            query,
        });
    }
    Ok(Comparison {
        k: config.n_neighbors,
        reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::datasets::{uniform_corpus, uniform_queries};

    #[test]
    fn latency_stats_of_constant_samples() {
        let stats = LatencyStats::from_samples(&[2.0, 2.0, 2.0, 2.0]);
        assert_eq!(stats.n_queries, 4);
        assert!((stats.mean_us - 2.0).abs() < 1e-9);
        assert!(stats.std_us.abs() < 1e-9);
        assert_eq!(stats.min_us, 2.0);
        assert_eq!(stats.max_us, 2.0);
    }

    #[test]
    fn latency_stats_of_nothing() {
        let stats = LatencyStats::from_samples(&[]);
        assert_eq!(stats.n_queries, 0);
        assert_eq!(stats.mean_us, 0.0);
    }

    #[test]
    fn comparison_covers_all_backends() {
        let corpus = uniform_corpus(60, 6, 42).expect("corpus");
        let queries = uniform_queries(4, 6, 7);
        let config = IndexConfig {
            n_neighbors: 5,
            ef_construction: 32,
            ef: 16,
            ..Default::default()
        };
        let comparison = compare_backends(&corpus, &config, 42, &queries, 2).expect("compare");
        assert_eq!(comparison.reports.len(), 3);
        for kind in BackendKind::ALL {
            let report = comparison.report(kind).expect("report per backend");
            assert_eq!(report.query.n_queries, 8);
            assert!(report.build_us >= 0.0);
        }
    }
}
