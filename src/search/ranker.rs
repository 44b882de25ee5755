//! Per-artifact similarity scoring.
//!
//! Each artifact scores independently, so the scan parallelizes across
//! artifacts with rayon. Output order still matches enumeration order
//! (indexed parallel collect preserves it), which keeps downstream
//! tie-breaking deterministic.

use rayon::prelude::*;
use tracing::debug;

use crate::search::RankedResult;
use crate::store::EmbeddingArtifact;
use crate::vector::{AggregationPolicy, aggregate_scores, cosine_similarity};

/// Scored artifacts plus the skip accounting the orchestrator needs to
/// tell a dimension mismatch apart from an empty corpus.
#[derive(Debug)]
pub struct RankingOutput {
    /// One result per scored artifact, in enumeration order, unsorted.
    pub results: Vec<RankedResult>,
    /// Artifacts excluded because their dimensionality differs from the
    /// query's.
    pub dimension_skipped: usize,
    /// Dimensionality sampled from the first incompatible artifact.
    pub sample_stored_dim: Option<usize>,
}

/// Scores every dimension-compatible artifact against a query vector.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityRanker {
    policy: AggregationPolicy,
}

impl SimilarityRanker {
    #[must_use]
    pub fn new(policy: AggregationPolicy) -> Self {
        Self { policy }
    }

    /// Scores all artifacts. Zero-chunk artifacts and artifacts of a
    /// different dimensionality are skipped, never errors.
    #[must_use]
    pub fn rank(&self, query: &[f32], artifacts: &[EmbeddingArtifact]) -> RankingOutput {
        let scored: Vec<Option<RankedResult>> = artifacts
            .par_iter()
            .map(|artifact| self.score_artifact(query, artifact))
            .collect();

        let mut results = Vec::new();
        let mut dimension_skipped = 0;
        let mut sample_stored_dim = None;
        for (artifact, scored) in artifacts.iter().zip(scored) {
            match scored {
                Some(result) => results.push(result),
                None if artifact.chunk_count() == 0 => {
                    debug!(
                        source = %artifact.source_file,
                        "skipping artifact with zero chunks"
                    );
                }
                None => {
                    dimension_skipped += 1;
                    if sample_stored_dim.is_none() {
                        sample_stored_dim = artifact.dimension().map(|d| d.get());
                    }
                }
            }
        }

        RankingOutput {
            results,
            dimension_skipped,
            sample_stored_dim,
        }
    }

    /// Scores one artifact, or `None` when it has zero chunks or an
    /// incompatible dimensionality.
    fn score_artifact(
        &self,
        query: &[f32],
        artifact: &EmbeddingArtifact,
    ) -> Option<RankedResult> {
        if artifact.chunk_count() == 0 {
            return None;
        }
        let dim = artifact.dimension()?;
        if !dim.matches(query) {
            return None;
        }

        let per_chunk_scores: Vec<f32> = artifact
            .chunk_vectors
            .iter()
            .map(|chunk| cosine_similarity(query, chunk))
            .collect();

        // First chunk wins ties.
        let mut best_chunk_index = 0;
        for (i, score) in per_chunk_scores.iter().enumerate() {
            if *score > per_chunk_scores[best_chunk_index] {
                best_chunk_index = i;
            }
        }

        let aggregate_score = aggregate_scores(&per_chunk_scores, self.policy)?;

        Some(RankedResult {
            source_file: artifact.source_file.clone(),
            display_name: artifact.display_name(),
            location: artifact.hierarchy_location.clone(),
            aggregate_score,
            chunk_count: artifact.chunk_count(),
            best_chunk_index,
            best_chunk_text: artifact.chunk_previews[best_chunk_index].clone(),
            per_chunk_scores,
            html_reference: artifact.html_reference.clone(),
        })
    }
}
