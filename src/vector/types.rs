//! Type-safe wrappers for vector search configuration.
//!
//! Newtypes here prevent primitive obsession at the seams where a bare
//! `usize` or `&str` would let incompatible values slip through: a query
//! vector must never be compared against a matrix of a different width.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};

/// Type-safe wrapper for vector dimensions.
///
/// Ensures runtime validation of vector dimensions to prevent dimension
/// mismatches during similarity scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorDimension(usize);

impl VectorDimension {
    /// Creates a new `VectorDimension` with validation.
    ///
    /// Returns an error if the dimension is zero.
    pub fn new(dim: usize) -> Result<Self, SearchError> {
        if dim == 0 {
            return Err(SearchError::Config {
                reason: "vector dimension cannot be zero".to_string(),
            });
        }
        Ok(Self(dim))
    }

    /// Returns the underlying dimension value.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }

    /// Checks whether a vector has this dimension.
    #[must_use]
    pub fn matches(&self, vector: &[f32]) -> bool {
        vector.len() == self.0
    }
}

impl std::fmt::Display for VectorDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rule for combining chunk-level similarities into one document score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// Maximum chunk similarity. Favors documents with one strongly
    /// matching passage.
    #[default]
    Max,
    /// Arithmetic mean across chunks. Favors uniformly relevant documents.
    Mean,
    /// Chunk *i* weighted by `1/(i+1)` in original chunk order, weights
    /// normalized to sum 1. Privileges early (definitional) chunks.
    WeightedMean,
}

impl std::fmt::Display for AggregationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Max => "max",
            Self::Mean => "mean",
            Self::WeightedMean => "weighted_mean",
        };
        write!(f, "{name}")
    }
}
