//! Embedding artifact loading and sidecar metadata parsing.
//!
//! One artifact per source document: a `.npy` matrix of chunk embeddings
//! next to a `.json` sidecar describing where the chunks came from. The
//! sidecar is parsed in a single typed step with defaulted optional fields;
//! scoring code never touches raw JSON.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SearchError;
use crate::store::npy;
use crate::vector::VectorDimension;

/// Separator used when deriving a hierarchy location from the artifact path.
const LOCATION_SEPARATOR: &str = " > ";

/// Sidecar metadata as written by the ingestion pipeline.
///
/// Only `source_file` is required; everything else is optional and
/// defaulted, matching the loosest sidecars observed in real corpora.
#[derive(Debug, Deserialize)]
struct Sidecar {
    source_file: String,
    #[serde(default)]
    hierarchy: Option<SidecarHierarchy>,
    #[serde(default)]
    html_page: Option<String>,
    #[serde(default)]
    chunks: Vec<SidecarChunk>,
}

#[derive(Debug, Deserialize)]
struct SidecarHierarchy {
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SidecarChunk {
    #[serde(default)]
    text_preview: String,
}

/// One source document's precomputed chunk embeddings plus provenance.
///
/// Created offline by the ingestion pipeline, read-only at query time.
/// Invariant: `chunk_vectors.len() == chunk_previews.len()` and every
/// vector shares the same dimensionality (`dim`).
#[derive(Debug, Clone)]
pub struct EmbeddingArtifact {
    /// Path of the `.npy` matrix this artifact was loaded from.
    pub matrix_path: PathBuf,
    /// Identifier of the original text document.
    pub source_file: String,
    /// Chunk embeddings in original chunk order.
    pub chunk_vectors: Vec<Vec<f32>>,
    /// Short text excerpts, index-aligned with `chunk_vectors`.
    pub chunk_previews: Vec<String>,
    /// Human-readable breadcrumb for the document.
    pub hierarchy_location: String,
    /// Optional path to an HTML rendering of the document.
    pub html_reference: Option<String>,
    /// Embedding dimensionality of every chunk vector.
    dim: usize,
}

impl EmbeddingArtifact {
    /// Loads the matrix at `npy_path` and its `.json` sidecar.
    ///
    /// Any structural problem with either file maps to
    /// [`SearchError::MalformedArtifact`] so the corpus scan can skip the
    /// artifact and keep going.
    pub fn load(npy_path: &Path, corpus_root: &Path) -> Result<Self, SearchError> {
        let malformed = |reason: String| SearchError::MalformedArtifact {
            path: npy_path.to_path_buf(),
            reason,
        };

        let matrix = npy::read_matrix(npy_path).map_err(|e| malformed(e.to_string()))?;

        let sidecar_path = npy_path.with_extension("json");
        let raw = std::fs::read_to_string(&sidecar_path)
            .map_err(|e| malformed(format!("cannot read sidecar: {e}")))?;
        let sidecar: Sidecar =
            serde_json::from_str(&raw).map_err(|e| malformed(format!("invalid sidecar: {e}")))?;

        // Index-align previews with matrix rows; a sidecar listing fewer
        // chunks than the matrix has rows pads with empty previews.
        let mut chunk_previews: Vec<String> = sidecar
            .chunks
            .into_iter()
            .take(matrix.rows)
            .map(|c| c.text_preview)
            .collect();
        chunk_previews.resize(matrix.rows, String::new());

        let hierarchy_location = sidecar
            .hierarchy
            .and_then(|h| h.location)
            .unwrap_or_else(|| derive_location(npy_path, corpus_root));

        Ok(Self {
            matrix_path: npy_path.to_path_buf(),
            source_file: sidecar.source_file,
            chunk_previews,
            hierarchy_location,
            html_reference: sidecar.html_page,
            dim: matrix.cols,
            chunk_vectors: matrix.data,
        })
    }

    /// Number of embedded chunks.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunk_vectors.len()
    }

    /// Embedding dimensionality of this artifact's vectors.
    ///
    /// Known even for a zero-chunk artifact (the matrix header carries the
    /// column count), but a zero dimension is unrepresentable.
    #[must_use]
    pub fn dimension(&self) -> Option<VectorDimension> {
        VectorDimension::new(self.dim).ok()
    }

    /// In-memory constructor for scoring tests that need no real files.
    #[cfg(test)]
    pub(crate) fn for_tests(
        matrix_path: PathBuf,
        source_file: String,
        chunk_vectors: Vec<Vec<f32>>,
        chunk_previews: Vec<String>,
        dim: usize,
    ) -> Self {
        assert_eq!(chunk_vectors.len(), chunk_previews.len());
        Self {
            matrix_path,
            hierarchy_location: source_file.clone(),
            source_file,
            chunk_vectors,
            chunk_previews,
            html_reference: None,
            dim,
        }
    }

    /// File name of the source document, extension included.
    #[must_use]
    pub fn display_name(&self) -> String {
        Path::new(&self.source_file)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_file.clone())
    }
}

/// Deterministic fallback when the sidecar carries no hierarchy location:
/// directory segments relative to the corpus root joined with a separator,
/// then the file stem.
fn derive_location(npy_path: &Path, corpus_root: &Path) -> String {
    let relative = npy_path.strip_prefix(corpus_root).unwrap_or(npy_path);
    let mut segments: Vec<String> = relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    if let Some(stem) = relative.file_stem() {
        segments.push(stem.to_string_lossy().into_owned());
    }
    segments.join(LOCATION_SEPARATOR)
}
