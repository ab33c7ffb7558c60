//! Benchmarking utilities: retrieval quality metrics, synthetic corpora,
//! and the latency harness comparing the three backends over identical
//! corpora and queries.

pub mod datasets;
pub mod harness;
pub mod metrics;

pub use datasets::{clustered_corpus, uniform_corpus, uniform_queries};
pub use harness::{compare_backends, time_queries, BackendReport, Comparison, LatencyStats};
pub use metrics::{mean_recall, recall_at_k};
