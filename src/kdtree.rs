//! Exact KD-tree nearest-neighbor index.
//!
//! Binary space partitioning over corpus positions. Nodes live in an
//! index-addressed arena with children referenced by array position, so the
//! tree has no nested ownership. Search is depth-first with a bounded
//! best-k heap and hyperplane pruning, and returns exactly the brute-force
//! result set for any query.

use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::distance::{euclidean_sq, get_vector};
use crate::error::{IndexError, Result};
use crate::exact::check_query;

/// Arena node. `Internal` children are arena positions, `Leaf` holds a range
/// into the permuted `order` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum KdNode {
    Internal {
        axis: usize,
        value: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        start: usize,
        end: usize,
    },
}

/// Exact pruning-based spatial index. Read-only after build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KdTreeIndex {
    vectors: Vec<f32>,
    dimension: usize,
    num_items: usize,
    leaf_size: usize,
    nodes: Vec<KdNode>,
    /// Corpus positions, permuted so each subtree owns a contiguous range.
    order: Vec<u32>,
    root: usize,
}

/// Max-heap entry over squared distance; on distance ties the larger item
/// index is considered worse, matching the brute-force tie-break.
#[derive(PartialEq)]
struct WorstFirst {
    dist_sq: f32,
    idx: u32,
}

impl Eq for WorstFirst {}

impl Ord for WorstFirst {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.dist_sq
            .total_cmp(&other.dist_sq)
            .then(self.idx.cmp(&other.idx))
    }
}

impl PartialOrd for WorstFirst {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl KdTreeIndex {
    pub fn build(corpus: &Corpus, leaf_size: usize) -> Result<Self> {
        if leaf_size == 0 {
            return Err(IndexError::InvalidParameter(
                "kd_leaf_size must be at least 1".to_string(),
            ));
        }
        if corpus.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }

        let num_items = corpus.len();
        let mut index = Self {
            vectors: corpus.as_slice().to_vec(),
            dimension: corpus.dimension(),
            num_items,
            leaf_size,
            nodes: Vec::new(),
            order: (0..num_items as u32).collect(),
            root: 0,
        };
        index.root = index.build_node(0, num_items, 0);
        Ok(index)
    }

    /// Recursively partition `order[start..end]`, returning the arena
    /// position of the subtree root.
    fn build_node(&mut self, start: usize, end: usize, depth: usize) -> usize {
        if end - start <= self.leaf_size {
            self.nodes.push(KdNode::Leaf { start, end });
            return self.nodes.len() - 1;
        }

        let axis = self.split_axis(start, end, depth);
        let mid = start + (end - start) / 2;
        let dim = self.dimension;
        {
            let vectors = &self.vectors;
            let order = &mut self.order;
            order[start..end].select_nth_unstable_by(mid - start, |&a, &b| {
                let va = vectors[a as usize * dim + axis];
                let vb = vectors[b as usize * dim + axis];
                va.total_cmp(&vb)
            });
        }
        let value = self.vectors[self.order[mid] as usize * dim + axis];

        let left = self.build_node(start, mid, depth + 1);
        let right = self.build_node(mid, end, depth + 1);
        self.nodes.push(KdNode::Internal {
            axis,
            value,
            left,
            right,
        });
        self.nodes.len() - 1
    }

    /// Dimension of maximum variance among the node's points. When all
    /// variances tie (duplicate points, zero-variance slices) this falls
    /// back to round-robin on depth.
    fn split_axis(&self, start: usize, end: usize, depth: usize) -> usize {
        let n = (end - start) as f32;
        let mut best_axis = depth % self.dimension;
        let mut best_var = 0.0_f32;
        for axis in 0..self.dimension {
            let mut mean = 0.0_f32;
            for &idx in &self.order[start..end] {
                mean += self.vectors[idx as usize * self.dimension + axis];
            }
            mean /= n;
            let mut var = 0.0_f32;
            for &idx in &self.order[start..end] {
                let d = self.vectors[idx as usize * self.dimension + axis] - mean;
                var += d * d;
            }
            if var > best_var {
                best_var = var;
                best_axis = axis;
            }
        }
        best_axis
    }

    /// The k nearest items to `query`. Identical result set to
    /// [`crate::ExactIndex::search`] for the same corpus and query,
    /// including the ascending-index tie-break.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>> {
        check_query(query.len(), self.dimension, k)?;
        let k = k.min(self.num_items);

        let mut best: BinaryHeap<WorstFirst> = BinaryHeap::with_capacity(k + 1);
        self.search_node(self.root, query, k, &mut best);

        let mut results: Vec<(u32, f32)> = best
            .into_iter()
            .map(|e| (e.idx, e.dist_sq.sqrt()))
            .collect();
        results.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        Ok(results)
    }

    fn search_node(&self, node: usize, query: &[f32], k: usize, best: &mut BinaryHeap<WorstFirst>) {
        match self.nodes[node] {
            KdNode::Leaf { start, end } => {
                for &idx in &self.order[start..end] {
                    let item = get_vector(&self.vectors, self.dimension, idx as usize);
                    let dist_sq = euclidean_sq(query, item);
                    if best.len() < k {
                        best.push(WorstFirst { dist_sq, idx });
                    } else if let Some(worst) = best.peek() {
                        let better = dist_sq < worst.dist_sq
                            || (dist_sq == worst.dist_sq && idx < worst.idx);
                        if better {
                            best.pop();
                            best.push(WorstFirst { dist_sq, idx });
                        }
                    }
                }
            }
            KdNode::Internal {
                axis,
                value,
                left,
                right,
            } => {
                let delta = query[axis] - value;
                let (near, far) = if delta <= 0.0 {
                    (left, right)
                } else {
                    (right, left)
                };
                self.search_node(near, query, k, best);

                // The sibling can only hold an improvement if the hyperplane
                // is closer than the current k-th best. <= keeps equal-distance
                // ties reachable so the index tie-break stays exact.
                let worst = if best.len() < k {
                    f32::INFINITY
                } else {
                    best.peek().map_or(f32::INFINITY, |e| e.dist_sq)
                };
                if delta * delta <= worst {
                    self.search_node(far, query, k, best);
                }
            }
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Number of arena nodes (leaves plus internals).
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }
}
