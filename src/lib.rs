//! ricercar: nearest-neighbor retrieval of audio shingles.
//!
//! Retrieves, for a query vector derived from a music recording, the most
//! similar fixed-length segments ("shingles") from a large precomputed
//! corpus, under Euclidean distance. Aimed at cross-version music retrieval,
//! where a corpus holds millions of chroma-shingle vectors from many
//! recordings.
//!
//! The pipeline: per-recording feature sequences are shingled with a sliding
//! window ([`corpus::ShingleCollection`], which also tracks per-shingle
//! provenance), an external projection reduces each shingle to a K-dim item,
//! and the resulting [`Corpus`] is indexed by one of three backends:
//!
//! - [`ExactIndex`]: brute force, O(N·K) per query — the correctness oracle.
//! - [`KdTreeIndex`]: exact pruning-based spatial index.
//! - [`HnswIndex`]: approximate layered proximity graph, fastest at scale
//!   with a recall/speed trade-off controlled by `m`, `ef_construction`
//!   and `ef`.
//!
//! Feature extraction, dimensionality reduction, metadata storage and any
//! presentation layer are collaborators, not part of this crate.
//!
//! All indices are built once over an immutable corpus and are safe for
//! unsynchronized concurrent read-only queries afterwards; nothing here
//! mutates post-build or suspends on I/O.
//!
//! ```
//! use ricercar::{Corpus, ExactIndex};
//!
//! # fn main() -> ricercar::Result<()> {
//! let corpus = Corpus::from_items(&[vec![0.0, 0.0], vec![1.0, 0.0], vec![5.0, 5.0]])?;
//! let index = ExactIndex::build(&corpus)?;
//! let hits = index.search(&[0.0, 0.0], 2)?;
//! assert_eq!(hits[0], (0, 0.0));
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod benchmark;
pub mod config;
pub mod corpus;
pub mod distance;
pub mod error;
pub mod exact;
pub mod hnsw;
pub mod kdtree;

pub use backend::{Backend, BackendKind, NearestNeighbors};
pub use config::IndexConfig;
pub use corpus::{Corpus, FeatureSequence, ShingleCollection};
pub use error::{IndexError, Result};
pub use exact::ExactIndex;
pub use hnsw::{HnswIndex, HnswParams};
pub use kdtree::KdTreeIndex;
