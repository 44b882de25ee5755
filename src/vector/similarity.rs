//! Cosine similarity and chunk-score aggregation.
//!
//! `sim = dot(q, c) / (||q|| * ||c||)`, range [-1, 1]. Normalized text
//! embeddings keep scores in [0, 1] in practice, which is what the
//! confidence thresholds downstream assume.

use crate::vector::AggregationPolicy;

/// Calculate cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero magnitude, so degenerate
/// all-zero chunks score as unrelated instead of producing NaN.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

/// Aggregate a chunk similarity sequence into one document score.
///
/// Scores must be in original chunk order: `WeightedMean` weights chunk
/// *i* by `1/(i+1)` before normalizing, so reordering changes the result.
///
/// Returns `None` for an empty sequence (a zero-chunk artifact yields no
/// similarity values and must not reach aggregation arithmetic).
#[must_use]
pub fn aggregate_scores(similarities: &[f32], policy: AggregationPolicy) -> Option<f32> {
    if similarities.is_empty() {
        return None;
    }

    let score = match policy {
        AggregationPolicy::Max => similarities.iter().copied().fold(f32::MIN, f32::max),
        AggregationPolicy::Mean => {
            similarities.iter().sum::<f32>() / similarities.len() as f32
        }
        AggregationPolicy::WeightedMean => {
            let weights: Vec<f32> = (0..similarities.len())
                .map(|i| 1.0 / (i as f32 + 1.0))
                .collect();
            let total: f32 = weights.iter().sum();
            similarities
                .iter()
                .zip(weights.iter())
                .map(|(s, w)| s * w / total)
                .sum()
        }
    };

    Some(score)
}
