//! The search pipeline: ranking, filtering, and orchestration.
//!
//! Control flow for one call: validate query -> embed -> load inventory
//! -> dimension check -> rank -> filter -> assemble response. Each call
//! is stateless and reads only the on-disk corpus.

mod filter;
mod orchestrator;
mod ranker;
mod types;

pub use filter::{FilterOutcome, MIN_CONFIDENCE, ResultFilter};
pub use orchestrator::SearchOrchestrator;
pub use ranker::{RankingOutput, SimilarityRanker};
pub use types::{
    ConfidenceBand, DEFAULT_TOP_K, DiagnosticSummary, RankedResult, SearchOutcome, SearchRequest,
};
