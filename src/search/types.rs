//! Request and response types for the search pipeline.

use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;

use crate::vector::AggregationPolicy;

/// Default number of results returned by a search.
pub const DEFAULT_TOP_K: usize = 5;

/// One search call's worth of input.
///
/// A request is a plain value: the pipeline holds no state across calls,
/// so everything a search needs travels in here.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Free-text clinical description.
    pub query: String,
    /// Maximum number of results to return.
    pub top_k: usize,
    /// Chunk-score aggregation policy.
    pub aggregation: AggregationPolicy,
    /// Root directory of the embedding corpus.
    pub corpus_root: PathBuf,
    /// Reject the result set when the top score is below the confidence
    /// threshold, instead of returning it with a low band.
    pub strict_threshold: bool,
    /// Optional wall-clock deadline for the whole call.
    pub deadline: Option<Instant>,
}

impl SearchRequest {
    /// Creates a request with default top-k, aggregation, and threshold
    /// policy.
    pub fn new(query: impl Into<String>, corpus_root: impl Into<PathBuf>) -> Self {
        Self {
            query: query.into(),
            top_k: DEFAULT_TOP_K,
            aggregation: AggregationPolicy::default(),
            corpus_root: corpus_root.into(),
            strict_threshold: true,
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[must_use]
    pub fn with_aggregation(mut self, aggregation: AggregationPolicy) -> Self {
        self.aggregation = aggregation;
        self
    }

    #[must_use]
    pub fn with_strict_threshold(mut self, strict: bool) -> Self {
        self.strict_threshold = strict;
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// One matching document with its score and provenance.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    /// Identifier of the original text document.
    pub source_file: String,
    /// File name of the source document.
    pub display_name: String,
    /// Human-readable breadcrumb for the document.
    pub location: String,
    /// Document-level score under the requested aggregation policy.
    pub aggregate_score: f32,
    /// Number of chunks scored.
    pub chunk_count: usize,
    /// Index of the best-matching chunk.
    pub best_chunk_index: usize,
    /// Text excerpt of the best-matching chunk.
    pub best_chunk_text: String,
    /// Per-chunk similarities, index-aligned with the artifact's chunks.
    pub per_chunk_scores: Vec<f32>,
    /// Optional path to an HTML rendering of the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_reference: Option<String>,
}

/// Coarse categorical confidence derived from the top match's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Moderate,
    Low,
    None,
}

impl std::fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Low => "low",
            Self::None => "none",
        };
        write!(f, "{name}")
    }
}

/// Diagnostic reading of the top result.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticSummary {
    /// Suspected pathology label, derived from the top source file name.
    pub label: Option<String>,
    /// Top score as a percentage.
    pub confidence_percent: f32,
    pub confidence_band: ConfidenceBand,
    /// Short guidance sentence for the clinician.
    pub message: String,
}

/// Terminal outcome of one orchestrated search call.
///
/// Every way a search can end is a typed variant; nothing surfaces to the
/// caller as an unstructured error.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// The validation collaborator rejected the query text.
    InvalidQuery { reason: String },
    /// No usable artifacts at the corpus root.
    EmptyCorpus,
    /// Provider and corpus disagree on embedding dimensionality.
    DimensionMismatch {
        query_dim: usize,
        stored_dim: usize,
        provider: String,
    },
    /// The embedding or validation collaborator failed.
    ProviderError { detail: String },
    /// Strict threshold policy: everything scored below the confidence
    /// minimum.
    NoMatch { best_score_percent: f32 },
    /// The caller-supplied deadline expired mid-call.
    DeadlineExceeded,
    Ok {
        results: Vec<RankedResult>,
        diagnostic: DiagnosticSummary,
        /// Number of artifacts actually scored.
        scanned_count: usize,
    },
}

impl SearchOutcome {
    /// Whether this outcome carries results.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}
