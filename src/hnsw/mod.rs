//! Hierarchical Navigable Small World (HNSW) approximate nearest-neighbor
//! index.
//!
//! Multi-layer proximity graph (Malkov & Yashunin, 2018): sparse upper
//! layers provide long-range navigation, the dense base layer provides
//! precision. Every item lives at layer 0 and, with exponentially decreasing
//! probability, at higher layers; the layer-ℓ vertex set is always a subset
//! of layer-(ℓ-1)'s. A single entry point — the highest-level item inserted
//! so far — anchors every search.
//!
//! Search is approximate: recall depends on `m`, `ef_construction` and the
//! per-query `ef`, improving monotonically as any of them grows, and reaches
//! the exact result when `ef` covers the whole corpus. Level assignment
//! draws from a generator seeded per index instance, so two builds with the
//! same seed and insertion order produce identical graphs.

mod construction;
mod search;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::IndexConfig;
use crate::corpus::Corpus;
use crate::error::{IndexError, Result};
use crate::exact::check_query;
use search::search_layer;

/// Hard cap on assigned levels; the exponential distribution makes anything
/// near this unreachable for realistic corpora.
const MAX_LEVEL: usize = 16;

/// HNSW tuning parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HnswParams {
    /// Max neighbors per node per layer above 0.
    pub m: usize,
    /// Max neighbors per node at layer 0 (typically `2 * m`).
    pub m_max0: usize,
    /// Candidate-list size while inserting.
    pub ef_construction: usize,
    /// Candidate-list size while searching (used by the trait-level
    /// `search`; `search_with_ef` overrides it per call).
    pub ef_search: usize,
    /// Seed for the index-owned level-assignment generator.
    pub seed: u64,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: 16,
            m_max0: 32,
            ef_construction: 200,
            ef_search: 50,
            seed: 42,
        }
    }
}

impl HnswParams {
    /// Derive parameters from the shared config surface.
    pub fn from_config(config: &IndexConfig, seed: u64) -> Self {
        Self {
            m: config.m,
            m_max0: config.m * 2,
            ef_construction: config.ef_construction,
            ef_search: config.ef,
            seed,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.m < 2 {
            return Err(IndexError::InvalidParameter(
                "m must be at least 2".to_string(),
            ));
        }
        if self.m_max0 < self.m {
            return Err(IndexError::InvalidParameter(
                "m_max0 must be at least m".to_string(),
            ));
        }
        if self.ef_construction == 0 {
            return Err(IndexError::InvalidParameter(
                "ef_construction must be at least 1".to_string(),
            ));
        }
        if self.ef_search == 0 {
            return Err(IndexError::InvalidParameter(
                "ef must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Adjacency lists for one layer, indexed by node id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Layer {
    lists: Vec<SmallVec<[u32; 16]>>,
}

impl Layer {
    pub(crate) fn new(num_items: usize) -> Self {
        Self {
            lists: vec![SmallVec::new(); num_items],
        }
    }

    pub(crate) fn neighbors(&self, id: u32) -> &[u32] {
        &self.lists[id as usize]
    }

    pub(crate) fn list_mut(&mut self, id: u32) -> &mut SmallVec<[u32; 16]> {
        &mut self.lists[id as usize]
    }

    /// Add the bidirectional edge a <-> b, skipping duplicates.
    pub(crate) fn connect(&mut self, a: u32, b: u32) {
        if !self.lists[a as usize].contains(&b) {
            self.lists[a as usize].push(b);
        }
        if !self.lists[b as usize].contains(&a) {
            self.lists[b as usize].push(a);
        }
    }
}

fn unseeded_rng() -> StdRng {
    StdRng::seed_from_u64(0)
}

/// Approximate graph index. Built by repeated single-item insertion in
/// corpus order; read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HnswIndex {
    pub(crate) params: HnswParams,
    pub(crate) vectors: Vec<f32>,
    pub(crate) dimension: usize,
    pub(crate) num_items: usize,
    pub(crate) layers: Vec<Layer>,
    node_levels: Vec<u8>,
    pub(crate) entry_point: Option<u32>,
    pub(crate) max_level: usize,
    // The generator is only consumed during build; a reloaded index never
    // draws from it again.
    #[serde(skip, default = "unseeded_rng")]
    rng: StdRng,
}

impl HnswIndex {
    /// Build the graph over `corpus`, inserting items one at a time in
    /// corpus order.
    pub fn build(corpus: &Corpus, params: HnswParams) -> Result<Self> {
        params.validate()?;
        if corpus.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }

        let num_items = corpus.len();
        let mut index = Self {
            rng: StdRng::seed_from_u64(params.seed),
            params,
            vectors: corpus.as_slice().to_vec(),
            dimension: corpus.dimension(),
            num_items,
            layers: vec![Layer::new(num_items)],
            node_levels: Vec::with_capacity(num_items),
            entry_point: None,
            max_level: 0,
        };

        for id in 0..num_items {
            let level = index.sample_level();
            index.node_levels.push(level as u8);
            index.insert_item(id as u32, level);
        }
        Ok(index)
    }

    /// Draw an assigned top layer from the exponential distribution with
    /// multiplier `1 / ln(m)`.
    fn sample_level(&mut self) -> usize {
        let multiplier = 1.0 / (self.params.m as f64).ln();
        let r: f64 = self.rng.random();
        ((-r.ln() * multiplier).floor() as usize).min(MAX_LEVEL)
    }

    /// Search with the index's configured `ef_search`.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>> {
        self.search_with_ef(query, k, self.params.ef_search)
    }

    /// Search with an explicit candidate-list size. `ef` below `k` is
    /// raised to `k`; `k` beyond the corpus is clamped.
    ///
    /// Results are ascending by distance but only approximately the true
    /// k nearest; see the module docs for the recall contract.
    pub fn search_with_ef(&self, query: &[f32], k: usize, ef: usize) -> Result<Vec<(u32, f32)>> {
        check_query(query.len(), self.dimension, k)?;
        let k = k.min(self.num_items);
        let ef = ef.max(k);

        let Some(entry) = self.entry_point else {
            return Err(IndexError::EmptyCorpus);
        };

        // Greedy descent to layer 1: one best candidate per layer.
        let mut entries: Vec<u32> = vec![entry];
        for layer_idx in (1..=self.max_level).rev() {
            let found = search_layer(
                query,
                &entries,
                &self.layers[layer_idx],
                &self.vectors,
                self.dimension,
                1,
            );
            if let Some(&(best, _)) = found.first() {
                entries = vec![best];
            }
        }

        // Full best-first search on the base layer.
        let mut results = search_layer(
            query,
            &entries,
            &self.layers[0],
            &self.vectors,
            self.dimension,
            ef,
        );
        results.truncate(k);
        Ok(results
            .into_iter()
            .map(|(id, dist_sq)| (id, dist_sq.sqrt()))
            .collect())
    }

    fn layer_cap(&self, layer_idx: usize) -> usize {
        if layer_idx == 0 {
            self.params.m_max0
        } else {
            self.params.m
        }
    }

    pub fn params(&self) -> &HnswParams {
        &self.params
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Number of graph layers (highest assigned level plus one).
    pub fn num_levels(&self) -> usize {
        self.max_level + 1
    }

    /// Assigned top layer of item `id`.
    pub fn level_of(&self, id: u32) -> usize {
        self.node_levels[id as usize] as usize
    }

    /// The item anchoring every search.
    pub fn entry_point(&self) -> Option<u32> {
        self.entry_point
    }

    /// Adjacency list of `id` at `level`. Empty above the item's assigned
    /// level.
    pub fn neighbors_of(&self, id: u32, level: usize) -> &[u32] {
        match self.layers.get(level) {
            Some(layer) => layer.neighbors(id),
            None => &[],
        }
    }
}
