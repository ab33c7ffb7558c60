//! Backend dispatch: one query interface over the three index types.
//!
//! Runtime backend selection is a closed set of variants, not open-ended
//! plugin dispatch: [`BackendKind`] names a backend, [`Backend`] holds the
//! built index, and [`NearestNeighbors`] is the single query interface all
//! three share.

use serde::{Deserialize, Serialize};

use crate::config::IndexConfig;
use crate::corpus::Corpus;
use crate::error::{IndexError, Result};
use crate::exact::ExactIndex;
use crate::hnsw::{HnswIndex, HnswParams};
use crate::kdtree::KdTreeIndex;

/// Unified query interface of all built indices.
pub trait NearestNeighbors {
    /// The k nearest items to `query`, ascending by distance. `k` beyond the
    /// corpus size is clamped; `k = 0` and dimension mismatches are errors.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>>;

    fn dimension(&self) -> usize;

    fn num_items(&self) -> usize;
}

impl NearestNeighbors for ExactIndex {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>> {
        ExactIndex::search(self, query, k)
    }

    fn dimension(&self) -> usize {
        ExactIndex::dimension(self)
    }

    fn num_items(&self) -> usize {
        ExactIndex::num_items(self)
    }
}

impl NearestNeighbors for KdTreeIndex {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>> {
        KdTreeIndex::search(self, query, k)
    }

    fn dimension(&self) -> usize {
        KdTreeIndex::dimension(self)
    }

    fn num_items(&self) -> usize {
        KdTreeIndex::num_items(self)
    }
}

impl NearestNeighbors for HnswIndex {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>> {
        HnswIndex::search(self, query, k)
    }

    fn dimension(&self) -> usize {
        HnswIndex::dimension(self)
    }

    fn num_items(&self) -> usize {
        HnswIndex::num_items(self)
    }
}

/// Name of a search backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Exact,
    KdTree,
    Hnsw,
}

impl BackendKind {
    /// All backends, in oracle-first order.
    pub const ALL: [BackendKind; 3] = [BackendKind::Exact, BackendKind::KdTree, BackendKind::Hnsw];

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Exact => "exact",
            BackendKind::KdTree => "kdtree",
            BackendKind::Hnsw => "hnsw",
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exact" => Ok(BackendKind::Exact),
            "kd" | "kdtree" => Ok(BackendKind::KdTree),
            "hnsw" => Ok(BackendKind::Hnsw),
            other => Err(IndexError::InvalidParameter(format!(
                "unknown backend '{other}' (expected exact, kdtree, or hnsw)"
            ))),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A built index of any backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Backend {
    Exact(ExactIndex),
    KdTree(KdTreeIndex),
    Hnsw(HnswIndex),
}

impl Backend {
    /// Build the named backend over `corpus`. `seed` feeds HNSW level
    /// assignment and is ignored by the exact backends.
    pub fn build(kind: BackendKind, corpus: &Corpus, config: &IndexConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        match kind {
            BackendKind::Exact => Ok(Backend::Exact(ExactIndex::build(corpus)?)),
            BackendKind::KdTree => Ok(Backend::KdTree(KdTreeIndex::build(
                corpus,
                config.kd_leaf_size,
            )?)),
            BackendKind::Hnsw => Ok(Backend::Hnsw(HnswIndex::build(
                corpus,
                HnswParams::from_config(config, seed),
            )?)),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Exact(_) => BackendKind::Exact,
            Backend::KdTree(_) => BackendKind::KdTree,
            Backend::Hnsw(_) => BackendKind::Hnsw,
        }
    }
}

impl NearestNeighbors for Backend {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>> {
        match self {
            Backend::Exact(index) => index.search(query, k),
            Backend::KdTree(index) => index.search(query, k),
            Backend::Hnsw(index) => index.search(query, k),
        }
    }

    fn dimension(&self) -> usize {
        match self {
            Backend::Exact(index) => index.dimension(),
            Backend::KdTree(index) => index.dimension(),
            Backend::Hnsw(index) => index.dimension(),
        }
    }

    fn num_items(&self) -> usize {
        match self {
            Backend::Exact(index) => index.num_items(),
            Backend::KdTree(index) => index.num_items(),
            Backend::Hnsw(index) => index.num_items(),
        }
    }
}
