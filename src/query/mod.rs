//! Query validation ahead of embedding.
//!
//! The production system delegates validation to an LLM collaborator that
//! classifies a query as a real clinical description or noise. That
//! collaborator lives behind [`QueryValidator`]; [`HeuristicValidator`]
//! is the local deterministic implementation of the same acceptance rules,
//! used by the CLI and in tests.

use crate::error::SearchError;

/// Verdict returned by a query validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationVerdict {
    pub is_valid: bool,
    /// Rejection reason; `None` when the query is valid.
    pub reason: Option<String>,
}

impl ValidationVerdict {
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            reason: None,
        }
    }

    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// External collaborator that decides whether a query is a usable clinical
/// description.
///
/// A network-backed implementation may fail; that failure is a
/// [`SearchError::Provider`], distinct from a rejection verdict.
pub trait QueryValidator: Send + Sync {
    fn validate(&self, query: &str) -> Result<ValidationVerdict, SearchError>;
}

/// Deterministic local validator.
///
/// Accepts anything that looks like natural language and rejects the two
/// noise shapes the production validator was instructed to reject:
/// repeated-token strings ("test test test") and symbol-only input
/// ("????", ".....").
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicValidator;

impl QueryValidator for HeuristicValidator {
    fn validate(&self, query: &str) -> Result<ValidationVerdict, SearchError> {
        let trimmed = query.trim();

        if !trimmed.chars().any(char::is_alphanumeric) {
            return Ok(ValidationVerdict::rejected(
                "query contains no words, only symbols",
            ));
        }

        let tokens: Vec<String> = trimmed
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        if tokens.len() >= 2 && tokens.iter().all(|t| *t == tokens[0]) {
            return Ok(ValidationVerdict::rejected(
                "query is a single token repeated, not a clinical description",
            ));
        }

        Ok(ValidationVerdict::valid())
    }
}

/// Validator that accepts every query, for callers that validate upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllValidator;

impl QueryValidator for AcceptAllValidator {
    fn validate(&self, _query: &str) -> Result<ValidationVerdict, SearchError> {
        Ok(ValidationVerdict::valid())
    }
}
