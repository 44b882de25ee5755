//! Embedding provider trait and the fastembed-backed implementation.

use std::path::PathBuf;
use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::error::SearchError;
use crate::vector::VectorDimension;

/// Trait for turning query text into a fixed-length embedding vector.
///
/// Implementations must be thread-safe; one provider instance is shared
/// across concurrent searches.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text, returning a vector of exactly
    /// [`EmbeddingProvider::dimension`] elements.
    fn embed(&self, text: &str) -> Result<Vec<f32>, SearchError>;

    /// The fixed dimensionality this provider's model produces.
    #[must_use]
    fn dimension(&self) -> VectorDimension;

    /// Stable identifier of the provider/model pairing, used in
    /// dimension-mismatch reporting.
    #[must_use]
    fn id(&self) -> &str;
}

/// Maps a model identifier to a fastembed model and its dimensionality.
///
/// Returns `None` for unknown identifiers; the caller reports the
/// supported set.
#[must_use]
pub fn parse_embedding_model(id: &str) -> Option<(EmbeddingModel, usize)> {
    match id {
        "all-minilm-l6-v2" => Some((EmbeddingModel::AllMiniLML6V2, 384)),
        "bge-small-en-v1.5" => Some((EmbeddingModel::BGESmallENV15, 384)),
        "bge-base-en-v1.5" => Some((EmbeddingModel::BGEBaseENV15, 768)),
        "bge-large-en-v1.5" => Some((EmbeddingModel::BGELargeENV15, 1024)),
        "nomic-embed-text-v1.5" => Some((EmbeddingModel::NomicEmbedTextV15, 768)),
        "multilingual-e5-small" => Some((EmbeddingModel::MultilingualE5Small, 384)),
        _ => None,
    }
}

/// Model identifiers accepted by [`FastEmbedProvider::new`].
pub const SUPPORTED_MODELS: &[&str] = &[
    "all-minilm-l6-v2",
    "bge-small-en-v1.5",
    "bge-base-en-v1.5",
    "bge-large-en-v1.5",
    "nomic-embed-text-v1.5",
    "multilingual-e5-small",
];

/// Local embedding provider backed by fastembed.
///
/// The underlying model is wrapped in a `Mutex` because fastembed's embed
/// call needs `&mut self`.
pub struct FastEmbedProvider {
    model: Mutex<TextEmbedding>,
    dimension: VectorDimension,
    id: String,
}

impl std::fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedProvider")
            .field("id", &self.id)
            .field("dimension", &self.dimension)
            .field("model", &"<TextEmbedding>")
            .finish()
    }
}

impl FastEmbedProvider {
    /// Create a provider for the given model identifier.
    ///
    /// # Errors
    /// Returns an error for an unknown identifier, or if the model fails
    /// to initialize or download.
    pub fn new(model_id: &str) -> Result<Self, SearchError> {
        let (model, dim) = parse_embedding_model(model_id).ok_or_else(|| SearchError::Config {
            reason: format!(
                "unknown embedding model '{model_id}' (supported: {})",
                SUPPORTED_MODELS.join(", ")
            ),
        })?;

        let text_model = TextEmbedding::try_new(
            InitOptions::new(model)
                .with_cache_dir(models_dir())
                .with_show_download_progress(false),
        )
        .map_err(|e| SearchError::Provider {
            detail: format!(
                "failed to initialize embedding model '{model_id}': {e}. First-time use downloads the model and needs network access"
            ),
        })?;

        Ok(Self {
            model: Mutex::new(text_model),
            dimension: VectorDimension::new(dim)?,
            id: model_id.to_string(),
        })
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, SearchError> {
        // Newlines degrade embedding quality for short clinical queries;
        // flatten them the way the corpus ingestion did.
        let flattened = text.replace('\n', " ");

        let embeddings = self
            .model
            .lock()
            .map_err(|_| SearchError::Provider {
                detail: "embedding model lock poisoned".to_string(),
            })?
            .embed(vec![flattened], None)
            .map_err(|e| SearchError::Provider {
                detail: format!("embedding generation failed: {e}"),
            })?;

        let embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::Provider {
                detail: "embedding model returned no vector".to_string(),
            })?;

        if !self.dimension.matches(&embedding) {
            return Err(SearchError::Provider {
                detail: format!(
                    "model '{}' returned dimension {} instead of the declared {}",
                    self.id,
                    embedding.len(),
                    self.dimension
                ),
            });
        }

        Ok(embedding)
    }

    fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Cache directory for downloaded embedding models.
fn models_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clinsearch")
        .join("models")
}
