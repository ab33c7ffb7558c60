//! Corpus plumbing: feature sequences, shingles, and the indexed item set.
//!
//! A recording arrives as a [`FeatureSequence`] of D-dimensional frames
//! (D = 12 chroma bins in the reference configuration). Sliding a window of
//! `w` frames with hop 1 over a sequence yields its shingles, each a flat
//! `w * D` vector. All shingles of a collection land in a [`ShingleCollection`]
//! together with a parallel provenance array mapping every shingle back to
//! its source recording id. After the (external) dimensionality reduction the
//! projected vectors form the [`Corpus`] the search backends operate on.
//!
//! All three types are built once per corpus load and never mutated after
//! construction.

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

/// Chroma feature dimensionality of the reference configuration.
pub const CHROMA_DIMS: usize = 12;

/// Default shingle window length, in frames.
pub const DEFAULT_WINDOW: usize = 20;

/// Ordered sequence of D-dimensional frames for one recording.
///
/// Frames are stored frame-major in a flat arena. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSequence {
    data: Vec<f32>,
    dimension: usize,
}

impl FeatureSequence {
    /// Build a sequence from per-frame rows. Every frame must have
    /// `dimension` entries; an empty frame list is valid (a recording too
    /// short to analyze contributes nothing downstream).
    pub fn from_frames(dimension: usize, frames: &[Vec<f32>]) -> Result<Self> {
        if dimension == 0 {
            return Err(IndexError::InvalidParameter(
                "frame dimension must be at least 1".to_string(),
            ));
        }
        let mut data = Vec::with_capacity(frames.len() * dimension);
        for frame in frames {
            if frame.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    query: frame.len(),
                    item: dimension,
                });
            }
            data.extend_from_slice(frame);
        }
        Ok(Self { data, dimension })
    }

    /// Build a sequence from an already-flat frame-major buffer.
    pub fn from_flat(dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 {
            return Err(IndexError::InvalidParameter(
                "frame dimension must be at least 1".to_string(),
            ));
        }
        if data.len() % dimension != 0 {
            return Err(IndexError::InvalidParameter(format!(
                "flat buffer of {} values is not a multiple of dimension {}",
                data.len(),
                dimension
            )));
        }
        Ok(Self { data, dimension })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn num_frames(&self) -> usize {
        self.data.len() / self.dimension
    }

    /// Frame `t` as a slice of `dimension` values.
    pub fn frame(&self, t: usize) -> &[f32] {
        let start = t * self.dimension;
        &self.data[start..start + self.dimension]
    }
}

/// All shingles of a corpus, plus per-shingle provenance.
///
/// Append-only during corpus load via [`ShingleCollection::push_sequence`],
/// never mutated afterwards. The provenance array holds the source recording
/// id of every shingle (a back-reference, not ownership).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShingleCollection {
    data: Vec<f32>,
    dimension: usize,
    sources: Vec<u32>,
}

impl ShingleCollection {
    /// Create an empty collection for shingles of `dimension` values
    /// (window length times frame dimension).
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(IndexError::InvalidParameter(
                "shingle dimension must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            data: Vec::new(),
            dimension,
            sources: Vec::new(),
        })
    }

    /// Slide a window of `window` frames (hop 1) over `sequence`, appending
    /// one shingle per position, each tagged with `recording_id`.
    ///
    /// A sequence of T frames yields `max(T - window + 1, 0)` shingles;
    /// sequences shorter than the window contribute nothing and are not an
    /// error. Returns the number of shingles appended.
    pub fn push_sequence(
        &mut self,
        sequence: &FeatureSequence,
        window: usize,
        recording_id: u32,
    ) -> Result<usize> {
        if window == 0 {
            return Err(IndexError::InvalidParameter(
                "shingle window must be at least 1 frame".to_string(),
            ));
        }
        let expected = sequence.dimension() * window;
        if expected != self.dimension {
            return Err(IndexError::DimensionMismatch {
                query: expected,
                item: self.dimension,
            });
        }

        let frames = sequence.num_frames();
        if frames < window {
            return Ok(0);
        }
        let count = frames - window + 1;
        self.data.reserve(count * self.dimension);
        self.sources.reserve(count);
        for t in 0..count {
            for offset in 0..window {
                self.data.extend_from_slice(sequence.frame(t + offset));
            }
            self.sources.push(recording_id);
        }
        Ok(count)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Shingle `idx` as a flat slice.
    pub fn shingle(&self, idx: usize) -> &[f32] {
        let start = idx * self.dimension;
        &self.data[start..start + self.dimension]
    }

    /// Source recording id of shingle `idx`.
    pub fn source(&self, idx: usize) -> u32 {
        self.sources[idx]
    }

    /// Per-shingle source recording ids, parallel to the shingle order.
    pub fn sources(&self) -> &[u32] {
        &self.sources
    }
}

/// The fixed, ordered collection of N items every backend indexes.
///
/// Items are identified solely by their `u32` position. Read-only after
/// construction; there is no insert or delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    data: Vec<f32>,
    dimension: usize,
}

impl Corpus {
    /// Build a corpus from per-item rows (the usual path: shingles after
    /// projection to K dimensions). All rows must agree on dimension.
    pub fn from_items(items: &[Vec<f32>]) -> Result<Self> {
        let Some(first) = items.first() else {
            return Err(IndexError::EmptyCorpus);
        };
        let dimension = first.len();
        if dimension == 0 {
            return Err(IndexError::InvalidParameter(
                "item dimension must be at least 1".to_string(),
            ));
        }
        let mut data = Vec::with_capacity(items.len() * dimension);
        for item in items {
            if item.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    query: item.len(),
                    item: dimension,
                });
            }
            data.extend_from_slice(item);
        }
        Ok(Self { data, dimension })
    }

    /// Build a corpus from an already-flat row-major buffer.
    pub fn from_flat(dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 {
            return Err(IndexError::InvalidParameter(
                "item dimension must be at least 1".to_string(),
            ));
        }
        if data.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }
        if data.len() % dimension != 0 {
            return Err(IndexError::InvalidParameter(format!(
                "flat buffer of {} values is not a multiple of dimension {}",
                data.len(),
                dimension
            )));
        }
        Ok(Self { data, dimension })
    }

    /// Identity-projection path: index the raw shingles directly (K equals
    /// the shingle dimension when no reduction is applied).
    pub fn from_shingles(shingles: &ShingleCollection) -> Result<Self> {
        if shingles.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }
        Ok(Self {
            data: shingles.data.clone(),
            dimension: shingles.dimension,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Item `idx` as a flat slice.
    pub fn item(&self, idx: usize) -> &[f32] {
        let start = idx * self.dimension;
        &self.data[start..start + self.dimension]
    }

    /// The whole row-major arena. Backends copy this at build time so a
    /// serialized index is self-contained.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
