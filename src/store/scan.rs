//! Corpus enumeration over a directory of embedding artifacts.
//!
//! The corpus is a read-only directory tree updated by an external
//! ingestion pipeline; concurrent searches over it are safe because the
//! search path never mutates it.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::SearchError;
use crate::store::EmbeddingArtifact;

/// Read-only view over a directory tree of embedding artifacts.
#[derive(Debug, Clone)]
pub struct VectorStore {
    root: PathBuf,
}

impl VectorStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Corpus root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerates every artifact under the corpus root.
    ///
    /// Returns [`SearchError::EmptyCorpus`] when the root is missing,
    /// contains no `.npy` files, or none of them could be loaded. A single
    /// malformed artifact is logged and skipped; it never aborts the scan.
    ///
    /// An optional `deadline` is checked between artifact reads, since a
    /// scan over a large corpus is otherwise unbounded.
    pub fn load_artifacts(
        &self,
        deadline: Option<Instant>,
    ) -> Result<Vec<EmbeddingArtifact>, SearchError> {
        if !self.root.is_dir() {
            return Err(SearchError::EmptyCorpus {
                root: self.root.clone(),
            });
        }

        // Sorted traversal keeps enumeration order (and therefore ranking
        // tie-breaks) deterministic across platforms.
        let mut matrix_paths: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("skipping unreadable directory entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "npy"))
            .collect();
        matrix_paths.sort();

        if matrix_paths.is_empty() {
            return Err(SearchError::EmptyCorpus {
                root: self.root.clone(),
            });
        }

        let mut artifacts = Vec::with_capacity(matrix_paths.len());
        for path in &matrix_paths {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(SearchError::DeadlineExceeded);
            }
            match EmbeddingArtifact::load(path, &self.root) {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) if e.is_recoverable() => {
                    warn!("{e}");
                }
                Err(e) => return Err(e),
            }
        }

        if artifacts.is_empty() {
            // Matrix files existed but none produced a usable artifact.
            return Err(SearchError::EmptyCorpus {
                root: self.root.clone(),
            });
        }

        debug!(
            count = artifacts.len(),
            root = %self.root.display(),
            "corpus inventory loaded"
        );
        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::npy::tests::npy_bytes_f32;
    use std::time::Duration;

    fn write_artifact(root: &Path, rel: &str, rows: &[Vec<f32>], cols: usize, source: &str) {
        let npy_path = root.join(rel);
        std::fs::create_dir_all(npy_path.parent().unwrap()).unwrap();
        std::fs::write(&npy_path, npy_bytes_f32(rows, cols)).unwrap();
        std::fs::write(
            npy_path.with_extension("json"),
            format!(r#"{{"source_file": "{source}"}}"#),
        )
        .unwrap();
    }

    #[test]
    fn test_missing_root_is_empty_corpus() {
        let store = VectorStore::new("/nonexistent/corpus/root");
        let err = store.load_artifacts(None).unwrap_err();
        assert!(matches!(err, SearchError::EmptyCorpus { .. }));
    }

    #[test]
    fn test_directory_without_matrices_is_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not an artifact").unwrap();

        let store = VectorStore::new(dir.path());
        let err = store.load_artifacts(None).unwrap_err();
        assert!(matches!(err, SearchError::EmptyCorpus { .. }));
    }

    #[test]
    fn test_nested_artifacts_enumerated_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "b/second.npy", &[vec![0.0, 1.0]], 2, "b.txt");
        write_artifact(dir.path(), "a/first.npy", &[vec![1.0, 0.0]], 2, "a.txt");

        let store = VectorStore::new(dir.path());
        let artifacts = store.load_artifacts(None).unwrap();
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].source_file, "a.txt");
        assert_eq!(artifacts[1].source_file, "b.txt");
    }

    #[test]
    fn test_malformed_artifact_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "good.npy", &[vec![1.0, 0.0]], 2, "good.txt");
        // Matrix without a sidecar.
        std::fs::write(dir.path().join("bad.npy"), npy_bytes_f32(&[vec![1.0f32]], 1)).unwrap();

        let store = VectorStore::new(dir.path());
        let artifacts = store.load_artifacts(None).unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].source_file, "good.txt");
    }

    #[test]
    fn test_all_malformed_is_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.npy"), b"not numpy").unwrap();

        let store = VectorStore::new(dir.path());
        let err = store.load_artifacts(None).unwrap_err();
        assert!(matches!(err, SearchError::EmptyCorpus { .. }));
    }

    #[test]
    fn test_expired_deadline_aborts_scan() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "doc.npy", &[vec![1.0, 0.0]], 2, "doc.txt");

        let store = VectorStore::new(dir.path());
        let expired = Instant::now() - Duration::from_secs(1);
        let err = store.load_artifacts(Some(expired)).unwrap_err();
        assert!(matches!(err, SearchError::DeadlineExceeded));
    }
}
