//! Error types for the clinical search pipeline.
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for search operations.
///
/// Every variant except [`SearchError::MalformedArtifact`] terminates the
/// search call; malformed artifacts are logged and skipped during the
/// corpus scan.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Query rejected: {reason}\nSuggestion: Rephrase the query as a clinical description")]
    InvalidQuery { reason: String },

    #[error(
        "No embedding artifacts found under '{root}'\nSuggestion: Check that the corpus root points at a directory of .npy/.json artifact pairs"
    )]
    EmptyCorpus { root: PathBuf },

    #[error(
        "Embedding dimension mismatch: query has {query_dim}, corpus has {stored_dim} (provider '{provider}')\nSuggestion: Configure the provider whose model produced the corpus embeddings"
    )]
    DimensionMismatch {
        query_dim: usize,
        stored_dim: usize,
        provider: String,
    },

    #[error("Embedding provider failed: {detail}\nSuggestion: The failure may be transient, retry the request")]
    Provider { detail: String },

    #[error("Malformed artifact '{path}': {reason}")]
    MalformedArtifact { path: PathBuf, reason: String },

    #[error(
        "No adequate match: best score {best_score_percent:.1}% is below the confidence threshold\nSuggestion: Provide a more complete and precise clinical description"
    )]
    NoAdequateMatch { best_score_percent: f32 },

    #[error("Search deadline exceeded\nSuggestion: Raise the timeout or reduce the corpus size")]
    DeadlineExceeded,

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SearchError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::InvalidQuery { .. } => "INVALID_QUERY",
            Self::EmptyCorpus { .. } => "EMPTY_CORPUS",
            Self::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            Self::Provider { .. } => "PROVIDER_ERROR",
            Self::MalformedArtifact { .. } => "MALFORMED_ARTIFACT",
            Self::NoAdequateMatch { .. } => "NO_ADEQUATE_MATCH",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::Config { .. } => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the search loop recovers from this error by skipping the
    /// offending artifact instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedArtifact { .. })
    }
}

/// Result type alias for search operations
pub type SearchResult<T> = Result<T, SearchError>;
