//! Configuration module for the clinical search system.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`clinsearch.toml`)
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `CLINSEARCH_` and use double
//! underscores to separate nested levels:
//! - `CLINSEARCH_TOP_K=10` sets `top_k`
//! - `CLINSEARCH_PROVIDER__MODEL=bge-small-en-v1.5` sets `provider.model`

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::vector::AggregationPolicy;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "clinsearch.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Root directory of the embedding corpus
    #[serde(default = "default_corpus_root")]
    pub corpus_root: PathBuf,

    /// Number of results to return
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Chunk-score aggregation policy
    #[serde(default)]
    pub aggregation: AggregationPolicy,

    /// Reject result sets whose top score is below the confidence
    /// threshold instead of returning them with a low band
    #[serde(default = "default_true")]
    pub strict_threshold: bool,

    /// Embedding provider settings
    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    /// Embedding model identifier
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            corpus_root: default_corpus_root(),
            top_k: default_top_k(),
            aggregation: AggregationPolicy::default(),
            strict_threshold: true,
            provider: ProviderConfig::default(),
        }
    }
}

impl Settings {
    /// Loads settings: defaults, then `clinsearch.toml` (or an explicit
    /// file), then `CLINSEARCH_`-prefixed environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self, SearchError> {
        let toml_path = config_file.unwrap_or(Path::new(CONFIG_FILE));
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(toml_path))
            .merge(Env::prefixed("CLINSEARCH_").split("__"))
            .extract()
            .map_err(|e| SearchError::Config {
                reason: e.to_string(),
            })
    }
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_corpus_root() -> PathBuf {
    PathBuf::from("corpus/embeddings")
}
fn default_top_k() -> usize {
    crate::search::DEFAULT_TOP_K
}
fn default_true() -> bool {
    true
}
fn default_model() -> String {
    "all-minilm-l6-v2".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.top_k, 5);
        assert_eq!(settings.aggregation, AggregationPolicy::Max);
        assert!(settings.strict_threshold);
        assert_eq!(settings.provider.model, "all-minilm-l6-v2");
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinsearch.toml");
        std::fs::write(
            &path,
            r#"
top_k = 3
aggregation = "weighted_mean"
strict_threshold = false

[provider]
model = "bge-base-en-v1.5"
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.top_k, 3);
        assert_eq!(settings.aggregation, AggregationPolicy::WeightedMean);
        assert!(!settings.strict_threshold);
        assert_eq!(settings.provider.model, "bge-base-en-v1.5");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = Settings::load(Some(Path::new("/nonexistent/clinsearch.toml"))).unwrap();
        assert_eq!(settings.top_k, 5);
    }
}
