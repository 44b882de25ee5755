//! Stable process exit codes for shell scripting.

use crate::search::SearchOutcome;

/// Exit codes reported by the CLI.
///
/// Codes are part of the CLI contract: scripts branch on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Search completed with results.
    Success = 0,
    /// Unexpected failure (configuration, provider, IO).
    Error = 1,
    /// The query was rejected by validation.
    InvalidQuery = 2,
    /// Search ran but found no adequate match.
    NotFound = 3,
}

impl ExitCode {
    /// Maps a terminal search outcome onto the exit code contract.
    #[must_use]
    pub fn from_outcome(outcome: &SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Ok { .. } => Self::Success,
            SearchOutcome::InvalidQuery { .. } => Self::InvalidQuery,
            SearchOutcome::NoMatch { .. } => Self::NotFound,
            SearchOutcome::EmptyCorpus
            | SearchOutcome::DimensionMismatch { .. }
            | SearchOutcome::ProviderError { .. }
            | SearchOutcome::DeadlineExceeded => Self::Error,
        }
    }

    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_mapping() {
        let outcome = SearchOutcome::NoMatch {
            best_score_percent: 42.0,
        };
        assert_eq!(ExitCode::from_outcome(&outcome), ExitCode::NotFound);
        assert_eq!(ExitCode::NotFound.code(), 3);

        let outcome = SearchOutcome::EmptyCorpus;
        assert_eq!(ExitCode::from_outcome(&outcome), ExitCode::Error);
    }
}
