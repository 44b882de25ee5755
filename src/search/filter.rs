//! Result ordering, truncation, and confidence banding.

use std::cmp::Ordering;

use crate::search::{ConfidenceBand, DiagnosticSummary, RankedResult};

/// Minimum top-result score for a result set to count as an adequate
/// match, on the [0, 1] normalized scale.
pub const MIN_CONFIDENCE: f32 = 0.60;

/// Score percentage at or above which the confidence band is `high`.
const HIGH_BAND_PERCENT: f32 = 75.0;

/// Filtered result set, or the typed no-match signal under the strict
/// threshold policy. Callers can distinguish "found weak matches" from
/// "found nothing" from "found strong matches".
#[derive(Debug)]
pub enum FilterOutcome {
    /// Strict policy only: nothing scored at or above [`MIN_CONFIDENCE`].
    NoMatch { best_score_percent: f32 },
    Matched {
        results: Vec<RankedResult>,
        diagnostic: DiagnosticSummary,
    },
}

/// Sorts, truncates, and quality-gates scored results.
#[derive(Debug, Clone, Copy)]
pub struct ResultFilter {
    top_k: usize,
    strict: bool,
}

impl ResultFilter {
    #[must_use]
    pub fn new(top_k: usize, strict: bool) -> Self {
        Self { top_k, strict }
    }

    /// Orders results descending by aggregate score (stable, so ties keep
    /// enumeration order), truncates to top-k, and applies the threshold
    /// policy.
    #[must_use]
    pub fn filter(&self, mut results: Vec<RankedResult>) -> FilterOutcome {
        results.sort_by(|a, b| {
            b.aggregate_score
                .partial_cmp(&a.aggregate_score)
                .unwrap_or(Ordering::Equal)
        });
        results.truncate(self.top_k);

        let best_score_percent = results
            .first()
            .map(|r| r.aggregate_score * 100.0)
            .unwrap_or(0.0);

        if self.strict && (results.is_empty() || best_score_percent < MIN_CONFIDENCE * 100.0) {
            return FilterOutcome::NoMatch { best_score_percent };
        }

        let diagnostic = diagnose(results.first());
        FilterOutcome::Matched {
            results,
            diagnostic,
        }
    }
}

/// Builds the diagnostic summary describing the top result.
fn diagnose(top: Option<&RankedResult>) -> DiagnosticSummary {
    let Some(top) = top else {
        return DiagnosticSummary {
            label: None,
            confidence_percent: 0.0,
            confidence_band: ConfidenceBand::None,
            message: "No matching documents".to_string(),
        };
    };

    let confidence_percent = top.aggregate_score * 100.0;
    let (confidence_band, message) = if confidence_percent >= HIGH_BAND_PERCENT {
        (ConfidenceBand::High, "Strong diagnostic match")
    } else if confidence_percent >= MIN_CONFIDENCE * 100.0 {
        (
            ConfidenceBand::Moderate,
            "Moderate match - consider a differential diagnosis",
        )
    } else {
        (
            ConfidenceBand::Low,
            "Low confidence - additional clinical information needed",
        )
    };

    DiagnosticSummary {
        label: Some(pathology_label(&top.display_name)),
        confidence_percent,
        confidence_band,
        message: message.to_string(),
    }
}

/// Derives a human-readable pathology label from a source file name.
fn pathology_label(display_name: &str) -> String {
    display_name
        .trim_end_matches(".txt")
        .replace('_', " ")
}
