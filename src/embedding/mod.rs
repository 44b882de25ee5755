//! Embedding generation for query text.
//!
//! The provider is part of the search configuration: it declares which
//! model produced its vectors and what dimensionality they have. The
//! orchestrator never autodetects a provider from the text, and never
//! substitutes one on a dimension mismatch.

mod provider;

pub use provider::{EmbeddingProvider, FastEmbedProvider, parse_embedding_model};
