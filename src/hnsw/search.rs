//! Layer search primitives for the HNSW graph.
//!
//! One best-first routine serves both build and query: a min-heap of
//! candidates to explore (closest first) against a bounded max-heap of the
//! `ef` best results found (worst on top, for cheap pruning). Search stops
//! when the best unexplored candidate cannot improve the worst retained
//! result.

use std::collections::{BinaryHeap, HashSet};

use crate::distance::{euclidean_sq, get_vector};
use crate::hnsw::Layer;

/// Min-heap candidate: smaller distance pops first.
#[derive(PartialEq)]
struct MinCandidate {
    id: u32,
    dist_sq: f32,
}

impl Eq for MinCandidate {}

impl Ord for MinCandidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.dist_sq.total_cmp(&self.dist_sq)
    }
}

impl PartialOrd for MinCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Max-heap result: larger distance pops first.
#[derive(PartialEq)]
struct MaxResult {
    id: u32,
    dist_sq: f32,
}

impl Eq for MaxResult {}

impl Ord for MaxResult {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.dist_sq.total_cmp(&other.dist_sq)
    }
}

impl PartialOrd for MaxResult {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first search within one layer, seeded from `entries`.
///
/// Returns up to `ef` (id, squared distance) pairs sorted ascending by
/// distance, ties by ascending id. With `ef = 1` this degenerates into the
/// greedy walk used for descending through the upper layers.
pub(crate) fn search_layer(
    query: &[f32],
    entries: &[u32],
    layer: &Layer,
    vectors: &[f32],
    dimension: usize,
    ef: usize,
) -> Vec<(u32, f32)> {
    let mut candidates: BinaryHeap<MinCandidate> = BinaryHeap::with_capacity(ef * 2);
    let mut results: BinaryHeap<MaxResult> = BinaryHeap::with_capacity(ef + 1);
    let mut visited: HashSet<u32> = HashSet::with_capacity(ef * 2);

    for &entry in entries {
        if visited.insert(entry) {
            let dist_sq = euclidean_sq(query, get_vector(vectors, dimension, entry as usize));
            candidates.push(MinCandidate { id: entry, dist_sq });
            results.push(MaxResult { id: entry, dist_sq });
        }
    }
    while results.len() > ef {
        results.pop();
    }

    while let Some(candidate) = candidates.pop() {
        let worst = results.peek().map_or(f32::INFINITY, |r| r.dist_sq);
        if candidate.dist_sq > worst && results.len() >= ef {
            break;
        }

        for &neighbor in layer.neighbors(candidate.id) {
            if visited.insert(neighbor) {
                let dist_sq =
                    euclidean_sq(query, get_vector(vectors, dimension, neighbor as usize));
                let worst = results.peek().map_or(f32::INFINITY, |r| r.dist_sq);
                if results.len() < ef || dist_sq < worst {
                    candidates.push(MinCandidate {
                        id: neighbor,
                        dist_sq,
                    });
                    results.push(MaxResult {
                        id: neighbor,
                        dist_sq,
                    });
                    if results.len() > ef {
                        results.pop();
                    }
                }
            }
        }
    }

    let mut output: Vec<(u32, f32)> = results.into_iter().map(|r| (r.id, r.dist_sq)).collect();
    output.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    output
}
