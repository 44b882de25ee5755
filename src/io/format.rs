//! Output rendering for CLI commands.
//!
//! Text mode renders a result table for humans; JSON mode serializes the
//! typed outcome verbatim for tool integration.

use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};

use crate::search::SearchOutcome;
use crate::store::EmbeddingArtifact;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// JSON for tool integration
    Json,
}

impl OutputFormat {
    /// Create format from JSON flag.
    #[must_use]
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }

    /// Check if format is JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Renders a terminal search outcome in the requested format.
#[must_use]
pub fn render_outcome(outcome: &SearchOutcome, format: OutputFormat) -> String {
    if format.is_json() {
        return serde_json::to_string_pretty(outcome)
            .unwrap_or_else(|e| format!("{{\"outcome\":\"serialization_error\",\"detail\":\"{e}\"}}"));
    }

    match outcome {
        SearchOutcome::InvalidQuery { reason } => {
            format!("Query rejected: {reason}\nRephrase the query as a clinical description.")
        }
        SearchOutcome::EmptyCorpus => {
            "No embedding artifacts found at the configured corpus root.".to_string()
        }
        SearchOutcome::DimensionMismatch {
            query_dim,
            stored_dim,
            provider,
        } => format!(
            "Dimension mismatch: provider '{provider}' produces {query_dim}-dimensional vectors, \
             but the corpus holds {stored_dim}-dimensional vectors.\n\
             Configure the provider whose model produced the corpus embeddings."
        ),
        SearchOutcome::ProviderError { detail } => {
            format!("Embedding provider failed: {detail}")
        }
        SearchOutcome::NoMatch { best_score_percent } => format!(
            "No adequate match (best score {best_score_percent:.1}%).\n\
             Provide a more complete and precise clinical description."
        ),
        SearchOutcome::DeadlineExceeded => "Search timed out.".to_string(),
        SearchOutcome::Ok {
            results,
            diagnostic,
            scanned_count,
        } => {
            let mut out = String::new();
            if let Some(label) = &diagnostic.label {
                out.push_str(&format!(
                    "Suspected pathology: {label} ({:.1}%, confidence: {})\n{}\n\n",
                    diagnostic.confidence_percent, diagnostic.confidence_band, diagnostic.message
                ));
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL_CONDENSED)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(["#", "Document", "Score", "Chunks", "Location"]);
            for (i, result) in results.iter().enumerate() {
                table.add_row([
                    Cell::new(i + 1),
                    Cell::new(&result.display_name),
                    Cell::new(format!("{:.1}%", result.aggregate_score * 100.0)),
                    Cell::new(result.chunk_count),
                    Cell::new(&result.location),
                ]);
            }
            out.push_str(&table.to_string());
            out.push_str(&format!("\n\nScanned {scanned_count} documents."));
            out
        }
    }
}

/// Renders a corpus inventory listing.
#[must_use]
pub fn render_corpus(artifacts: &[EmbeddingArtifact], format: OutputFormat) -> String {
    if format.is_json() {
        let listing: Vec<serde_json::Value> = artifacts
            .iter()
            .map(|a| {
                serde_json::json!({
                    "source_file": a.source_file,
                    "chunks": a.chunk_count(),
                    "dimension": a.dimension().map(|d| d.get()),
                    "location": a.hierarchy_location,
                    "html_reference": a.html_reference,
                })
            })
            .collect();
        return serde_json::to_string_pretty(&listing).unwrap_or_default();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Document", "Chunks", "Dim", "Location"]);
    for artifact in artifacts {
        table.add_row([
            Cell::new(artifact.display_name()),
            Cell::new(artifact.chunk_count()),
            Cell::new(
                artifact
                    .dimension()
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(&artifact.hierarchy_location),
        ]);
    }
    format!("{table}\n{} documents.", artifacts.len())
}
