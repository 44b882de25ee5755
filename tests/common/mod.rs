//! Shared helpers for integration tests: on-disk corpus construction and
//! a deterministic embedding provider.

use std::path::Path;

use clinsearch::{EmbeddingProvider, SearchError, VectorDimension};

/// Builds v1.0 `.npy` bytes for a row-major f32 matrix, mirroring what
/// `np.save` produces for the real corpus.
pub fn npy_bytes(rows: &[Vec<f32>], cols: usize) -> Vec<u8> {
    let shape = format!("({}, {})", rows.len(), cols);
    let mut header = format!("{{'descr': '<f4', 'fortran_order': False, 'shape': {shape}, }}");
    let unpadded = 10 + header.len() + 1;
    header.push_str(&" ".repeat(unpadded.next_multiple_of(64) - unpadded));
    header.push('\n');

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"\x93NUMPY");
    bytes.extend_from_slice(&[1, 0]);
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    for row in rows {
        assert_eq!(row.len(), cols, "all rows must share the matrix width");
        for value in row {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }
    bytes
}

/// Writes one artifact (matrix + sidecar) under the corpus root.
pub fn write_artifact(root: &Path, rel: &str, rows: &[Vec<f32>], cols: usize, sidecar: &str) {
    let npy_path = root.join(rel);
    if let Some(parent) = npy_path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&npy_path, npy_bytes(rows, cols)).unwrap();
    std::fs::write(npy_path.with_extension("json"), sidecar).unwrap();
}

/// Builds a sidecar JSON document.
pub fn sidecar(source_file: &str, location: Option<&str>, previews: &[&str]) -> String {
    let chunks: Vec<serde_json::Value> = previews
        .iter()
        .map(|p| serde_json::json!({"text_preview": p}))
        .collect();
    let mut doc = serde_json::json!({
        "source_file": source_file,
        "chunks": chunks,
    });
    if let Some(location) = location {
        doc["hierarchy"] = serde_json::json!({"location": location});
    }
    doc.to_string()
}

/// Provider that returns one fixed vector for every query.
pub struct FixedVectorProvider {
    vector: Vec<f32>,
    id: String,
}

impl FixedVectorProvider {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            id: "fixed-test-provider".to_string(),
        }
    }
}

impl EmbeddingProvider for FixedVectorProvider {
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

/// A unit vector whose cosine similarity against `[1, 0]` is exactly `sim`.
pub fn chunk_with_similarity(sim: f32) -> Vec<f32> {
    vec![sim, (1.0 - sim * sim).sqrt()]
}
