//! Core vector types and similarity math.
//!
//! This module holds the dimension-safe wrappers and the chunk-score
//! aggregation policies used by the ranking pipeline. All scoring is plain
//! cosine similarity over dense `f32` vectors; there is no approximate
//! index, the corpus is small enough for an exact scan.

mod similarity;
mod types;

pub use similarity::{aggregate_scores, cosine_similarity};
pub use types::{AggregationPolicy, VectorDimension};
