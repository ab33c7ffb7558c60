//! Error types for ricercar.

use thiserror::Error;

/// Errors that can occur while building an index or running a query.
///
/// Build errors (`EmptyCorpus`, `InvalidParameter`) are fatal: the failing
/// build returns `Err` and no partially-built index is ever observable.
/// `DimensionMismatch` is local to the offending query; the index stays
/// valid for subsequent calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// Query dimension disagrees with the corpus item dimension.
    #[error("dimension mismatch: query has {query} dimensions, items have {item}")]
    DimensionMismatch { query: usize, item: usize },

    /// Build attempted over zero items.
    #[error("corpus is empty")]
    EmptyCorpus,

    /// Parameter rejected before build or query.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;
