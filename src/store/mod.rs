//! On-disk corpus access.
//!
//! A corpus is a directory tree of precomputed embedding artifacts: one
//! NumPy `.npy` matrix (rows = chunks, columns = embedding dimension) plus
//! one `.json` metadata sidecar per source document. Artifacts are written
//! by an external ingestion pipeline and are strictly read-only here.

mod artifact;
pub mod npy;
mod scan;

pub use artifact::EmbeddingArtifact;
pub use npy::{NpyError, NpyMatrix};
pub use scan::VectorStore;
