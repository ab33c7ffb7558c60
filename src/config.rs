//! Runtime configuration surface.
//!
//! [`IndexConfig`] carries the recognized tuning options for corpus
//! projection and all three backends. Unknown keys in a config document are
//! ignored; missing keys fall back to the defaults of the reference
//! configuration.

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

/// Tuning options for corpus construction and the search backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Target item dimensionality K after projection.
    #[serde(alias = "K")]
    pub item_dim: usize,

    /// Result-set size k per query.
    #[serde(alias = "k")]
    pub n_neighbors: usize,

    /// HNSW max graph degree per node per layer (layer 0 allows `2 * m`).
    #[serde(alias = "M")]
    pub m: usize,

    /// HNSW candidate-list size while inserting.
    #[serde(alias = "efConstruction")]
    pub ef_construction: usize,

    /// HNSW candidate-list size while searching.
    pub ef: usize,

    /// KD-tree leaf bucket threshold.
    pub kd_leaf_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            item_dim: 30,
            n_neighbors: 10,
            m: 16,
            ef_construction: 200,
            ef: 50,
            kd_leaf_size: 10,
        }
    }
}

impl IndexConfig {
    /// Parse a JSON config document, applying defaults for missing keys.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| IndexError::InvalidParameter(format!("config: {e}")))
    }

    /// Reject out-of-range parameters before any build or query sees them.
    pub fn validate(&self) -> Result<()> {
        if self.item_dim == 0 {
            return Err(IndexError::InvalidParameter(
                "item_dim must be at least 1".to_string(),
            ));
        }
        if self.n_neighbors == 0 {
            return Err(IndexError::InvalidParameter(
                "n_neighbors must be at least 1".to_string(),
            ));
        }
        // m = 1 would make the level multiplier 1/ln(m) blow up.
        if self.m < 2 {
            return Err(IndexError::InvalidParameter(
                "m must be at least 2".to_string(),
            ));
        }
        if self.ef_construction == 0 {
            return Err(IndexError::InvalidParameter(
                "ef_construction must be at least 1".to_string(),
            ));
        }
        if self.ef == 0 {
            return Err(IndexError::InvalidParameter(
                "ef must be at least 1".to_string(),
            ));
        }
        if self.kd_leaf_size == 0 {
            return Err(IndexError::InvalidParameter(
                "kd_leaf_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
