//! The orchestrated search pipeline.
//!
//! One call runs: validate -> embed -> load inventory -> dimension check
//! -> rank -> filter -> assemble. The orchestrator is a pure function of
//! the request, the collaborators, and the read-only corpus; nothing
//! persists between calls.

use std::time::Instant;

use tracing::{debug, info};

use crate::embedding::EmbeddingProvider;
use crate::error::SearchError;
use crate::query::QueryValidator;
use crate::search::filter::{FilterOutcome, ResultFilter};
use crate::search::ranker::SimilarityRanker;
use crate::search::{SearchOutcome, SearchRequest};
use crate::store::VectorStore;

/// Wires the search collaborators into one pipeline.
///
/// The provider choice (and with it the expected embedding dimensionality)
/// is fixed at construction; a dimension mismatch against the corpus is
/// surfaced to the caller, never papered over by re-embedding with a
/// different provider.
pub struct SearchOrchestrator<'a> {
    provider: &'a dyn EmbeddingProvider,
    validator: &'a dyn QueryValidator,
}

impl<'a> SearchOrchestrator<'a> {
    #[must_use]
    pub fn new(provider: &'a dyn EmbeddingProvider, validator: &'a dyn QueryValidator) -> Self {
        Self {
            provider,
            validator,
        }
    }

    /// Runs one search call to a terminal [`SearchOutcome`].
    ///
    /// Every failure mode maps to a typed outcome; this function never
    /// returns an error.
    #[must_use]
    pub fn search(&self, request: &SearchRequest) -> SearchOutcome {
        match self.run(request) {
            Ok(outcome) => outcome,
            Err(e) => outcome_from_error(e),
        }
    }

    fn run(&self, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
        // 1. Validate before touching the store: a rejected query must not
        //    cost an embedding call or a corpus scan.
        let query = request.query.trim();
        if query.is_empty() {
            return Ok(SearchOutcome::InvalidQuery {
                reason: "query is empty".to_string(),
            });
        }
        let verdict = self.validator.validate(query)?;
        if !verdict.is_valid {
            let reason = verdict
                .reason
                .unwrap_or_else(|| "query rejected by validator".to_string());
            info!(%reason, "query rejected");
            return Ok(SearchOutcome::InvalidQuery { reason });
        }
        self.check_deadline(request.deadline)?;

        // 2. Embed.
        let query_vector = self.provider.embed(query)?;
        debug!(
            provider = self.provider.id(),
            dim = query_vector.len(),
            "query embedded"
        );
        self.check_deadline(request.deadline)?;

        // 3. Load inventory.
        let store = VectorStore::new(&request.corpus_root);
        let artifacts = store.load_artifacts(request.deadline)?;

        // 4/5. Rank all dimension-compatible artifacts.
        let ranker = SimilarityRanker::new(request.aggregation);
        let ranking = ranker.rank(&query_vector, &artifacts);
        let scanned_count = ranking.results.len();

        // A non-empty corpus where nothing was dimension-compatible is a
        // provider/corpus pairing error, not an empty corpus.
        if scanned_count == 0 && ranking.dimension_skipped > 0 {
            let stored_dim = ranking.sample_stored_dim.unwrap_or(0);
            return Ok(SearchOutcome::DimensionMismatch {
                query_dim: query_vector.len(),
                stored_dim,
                provider: self.provider.id().to_string(),
            });
        }
        self.check_deadline(request.deadline)?;

        // 6/7. Filter, band, assemble.
        let filter = ResultFilter::new(request.top_k, request.strict_threshold);
        let outcome = match filter.filter(ranking.results) {
            FilterOutcome::NoMatch { best_score_percent } => {
                info!(%best_score_percent, "no adequate match");
                SearchOutcome::NoMatch { best_score_percent }
            }
            FilterOutcome::Matched {
                results,
                diagnostic,
            } => {
                info!(
                    returned = results.len(),
                    scanned = scanned_count,
                    band = %diagnostic.confidence_band,
                    "search complete"
                );
                SearchOutcome::Ok {
                    results,
                    diagnostic,
                    scanned_count,
                }
            }
        };
        Ok(outcome)
    }

    fn check_deadline(&self, deadline: Option<Instant>) -> Result<(), SearchError> {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(SearchError::DeadlineExceeded);
        }
        Ok(())
    }
}

fn outcome_from_error(error: SearchError) -> SearchOutcome {
    match error {
        SearchError::InvalidQuery { reason } => SearchOutcome::InvalidQuery { reason },
        SearchError::EmptyCorpus { .. } => SearchOutcome::EmptyCorpus,
        SearchError::DimensionMismatch {
            query_dim,
            stored_dim,
            provider,
        } => SearchOutcome::DimensionMismatch {
            query_dim,
            stored_dim,
            provider,
        },
        SearchError::NoAdequateMatch { best_score_percent } => {
            SearchOutcome::NoMatch { best_score_percent }
        }
        SearchError::DeadlineExceeded => SearchOutcome::DeadlineExceeded,
        other => SearchOutcome::ProviderError {
            detail: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{HeuristicValidator, ValidationVerdict};
    use crate::vector::VectorDimension;

    /// Provider returning one fixed vector, for pipeline tests.
    struct FixedProvider {
        vector: Vec<f32>,
        id: String,
    }

    impl FixedProvider {
        fn new(vector: Vec<f32>) -> Self {
            Self {
                vector,
                id: "fixed-test-provider".to_string(),
            }
        }
    }

    impl EmbeddingProvider for FixedProvider {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, SearchError> {
            Ok(self.vector.clone())
        }

        fn dimension(&self) -> VectorDimension {
            VectorDimension::new(self.vector.len()).expect("test vector is non-empty")
        }

        fn id(&self) -> &str {
            &self.id
        }
    }

    struct FailingProvider;

    impl EmbeddingProvider for FailingProvider {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, SearchError> {
            Err(SearchError::Provider {
                detail: "connection refused".to_string(),
            })
        }

        fn dimension(&self) -> VectorDimension {
            VectorDimension::new(2).expect("nonzero")
        }

        fn id(&self) -> &str {
            "failing-test-provider"
        }
    }

    struct RejectingValidator;

    impl QueryValidator for RejectingValidator {
        fn validate(&self, _query: &str) -> Result<ValidationVerdict, SearchError> {
            Ok(ValidationVerdict::rejected("nonsense input"))
        }
    }

    #[test]
    fn test_invalid_query_short_circuits_before_store() {
        let provider = FixedProvider::new(vec![1.0, 0.0]);
        let validator = RejectingValidator;
        let orchestrator = SearchOrchestrator::new(&provider, &validator);

        // Corpus root does not exist; an InvalidQuery outcome proves the
        // store was never consulted.
        let request = SearchRequest::new("blah blah", "/nonexistent");
        let outcome = orchestrator.search(&request);
        assert!(matches!(
            outcome,
            SearchOutcome::InvalidQuery { reason } if reason == "nonsense input"
        ));
    }

    #[test]
    fn test_empty_query_rejected_without_validator() {
        let provider = FixedProvider::new(vec![1.0, 0.0]);
        let validator = RejectingValidator;
        let orchestrator = SearchOrchestrator::new(&provider, &validator);

        let request = SearchRequest::new("   ", "/nonexistent");
        let outcome = orchestrator.search(&request);
        assert!(matches!(outcome, SearchOutcome::InvalidQuery { .. }));
    }

    #[test]
    fn test_provider_failure_is_typed_outcome() {
        let validator = HeuristicValidator;
        let orchestrator = SearchOrchestrator::new(&FailingProvider, &validator);

        let request = SearchRequest::new("anxious patient", "/nonexistent");
        let outcome = orchestrator.search(&request);
        assert!(matches!(
            outcome,
            SearchOutcome::ProviderError { detail } if detail.contains("connection refused")
        ));
    }

    #[test]
    fn test_missing_corpus_is_empty_corpus() {
        let provider = FixedProvider::new(vec![1.0, 0.0]);
        let validator = HeuristicValidator;
        let orchestrator = SearchOrchestrator::new(&provider, &validator);

        let request = SearchRequest::new("anxious patient", "/nonexistent/corpus");
        let outcome = orchestrator.search(&request);
        assert!(matches!(outcome, SearchOutcome::EmptyCorpus));
    }

    #[test]
    fn test_expired_deadline_is_typed_outcome() {
        let provider = FixedProvider::new(vec![1.0, 0.0]);
        let validator = HeuristicValidator;
        let orchestrator = SearchOrchestrator::new(&provider, &validator);

        let expired = Instant::now() - std::time::Duration::from_secs(1);
        let request =
            SearchRequest::new("anxious patient", "/nonexistent").with_deadline(expired);
        let outcome = orchestrator.search(&request);
        assert!(matches!(outcome, SearchOutcome::DeadlineExceeded));
    }
}
