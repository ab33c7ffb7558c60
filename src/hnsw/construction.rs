//! HNSW insertion and diversity-aware neighbor selection.

use crate::distance::{euclidean_sq, get_vector};
use crate::hnsw::search::search_layer;
use crate::hnsw::{HnswIndex, Layer};

/// Select up to `m` diverse neighbors from `candidates`.
///
/// Relative-neighborhood criterion: the closest candidate is always kept; a
/// further candidate is kept only if it is closer to the subject than to
/// every already-kept neighbor, which stops all links from clustering in one
/// direction. Remaining slots are backfilled closest-first.
///
/// `candidates` pairs are (id, squared distance to the subject).
pub(crate) fn select_neighbors(
    candidates: &[(u32, f32)],
    m: usize,
    vectors: &[f32],
    dimension: usize,
) -> Vec<u32> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<(u32, f32)> = candidates.to_vec();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    let mut selected: Vec<u32> = Vec::with_capacity(m.min(sorted.len()));
    if let Some(&(closest, _)) = sorted.first() {
        selected.push(closest);
    }

    for &(candidate, dist_to_subject) in sorted.iter().skip(1) {
        if selected.len() >= m {
            break;
        }
        let candidate_vec = get_vector(vectors, dimension, candidate as usize);
        let dominated = selected.iter().any(|&kept| {
            let kept_vec = get_vector(vectors, dimension, kept as usize);
            dist_to_subject >= euclidean_sq(kept_vec, candidate_vec)
        });
        if !dominated {
            selected.push(candidate);
        }
    }

    // Backfill with the closest skipped candidates.
    for &(candidate, _) in &sorted {
        if selected.len() >= m {
            break;
        }
        if !selected.contains(&candidate) {
            selected.push(candidate);
        }
    }

    selected
}

impl HnswIndex {
    /// Insert item `id` with pre-drawn top layer `level`.
    ///
    /// Standard descent: refine the entry point with a greedy walk through
    /// the layers above `level`, then on each layer from
    /// `min(level, max_level)` down to 0 run an `ef_construction` search,
    /// link bidirectionally to the selected neighbors, and prune any
    /// adjacency list that overflows its layer cap. Each layer's candidate
    /// set seeds the search on the next layer down.
    pub(crate) fn insert_item(&mut self, id: u32, level: usize) {
        while self.layers.len() <= level {
            self.layers.push(Layer::new(self.num_items));
        }

        let Some(entry) = self.entry_point else {
            // First item anchors the graph.
            self.entry_point = Some(id);
            self.max_level = level;
            return;
        };

        let query = get_vector(&self.vectors, self.dimension, id as usize).to_vec();
        let mut entries: Vec<u32> = vec![entry];

        // Greedy descent above the insertion level: single best candidate,
        // no edges added.
        if self.max_level > level {
            for layer_idx in ((level + 1)..=self.max_level).rev() {
                let found = search_layer(
                    &query,
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
        }

        for layer_idx in (0..=level.min(self.max_level)).rev() {
            let candidates = search_layer(
                &query,
                &entries,
                &self.layers[layer_idx],
                &self.vectors,
                self.dimension,
                self.params.ef_construction,
            );

            let selected =
                select_neighbors(&candidates, self.params.m, &self.vectors, self.dimension);

            let cap = self.layer_cap(layer_idx);
            for &neighbor in &selected {
                self.layers[layer_idx].connect(id, neighbor);
            }
            for &neighbor in &selected {
                self.prune_overflow(layer_idx, neighbor, cap);
            }

            entries = candidates.iter().map(|&(cid, _)| cid).collect();
        }

        if level > self.max_level {
            self.max_level = level;
            self.entry_point = Some(id);
        }
    }

    /// Re-select a node's adjacency list with the diversity heuristic when
    /// it exceeds the layer cap. Never surfaces as an error.
    fn prune_overflow(&mut self, layer_idx: usize, id: u32, cap: usize) {
        if self.layers[layer_idx].neighbors(id).len() <= cap {
            return;
        }
        let subject = get_vector(&self.vectors, self.dimension, id as usize);
        let candidates: Vec<(u32, f32)> = self.layers[layer_idx]
            .neighbors(id)
            .iter()
            .map(|&nid| {
                let neighbor = get_vector(&self.vectors, self.dimension, nid as usize);
                (nid, euclidean_sq(subject, neighbor))
            })
            .collect();
        let kept = select_neighbors(&candidates, cap, &self.vectors, self.dimension);

        let list = self.layers[layer_idx].list_mut(id);
        list.clear();
        list.extend(kept);
    }
}
