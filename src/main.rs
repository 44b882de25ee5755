//! CLI entry point for the clinical similarity search system.
//!
//! Provides commands for searching a corpus of precomputed embeddings,
//! inspecting the corpus inventory, and printing the active settings.

use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use clinsearch::io::{ExitCode, OutputFormat, render_corpus, render_outcome};
use clinsearch::query::AcceptAllValidator;
use clinsearch::{
    AggregationPolicy, FastEmbedProvider, HeuristicValidator, QueryValidator, SearchOrchestrator,
    SearchRequest, Settings, VectorStore,
};

/// Clinical similarity search over precomputed document embeddings
#[derive(Parser)]
#[command(
    name = "clinsearch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Clinical similarity search over precomputed document embeddings",
    long_about = "Rank clinical documents against a free-text description using \
                  cosine similarity over precomputed chunk embeddings."
)]
struct Cli {
    /// Path to a custom clinsearch.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the corpus with a clinical description
    Search {
        /// Free-text clinical description
        query: String,

        /// Number of results to return
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Chunk-score aggregation policy
        #[arg(short, long, value_enum)]
        aggregation: Option<AggregationPolicy>,

        /// Corpus root directory (overrides configuration)
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Embedding model identifier (overrides configuration)
        #[arg(long)]
        model: Option<String>,

        /// Return weak matches with a confidence band instead of
        /// rejecting them
        #[arg(long)]
        lenient: bool,

        /// Skip query validation
        #[arg(long)]
        no_validate: bool,

        /// Abort the search after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the embedding artifacts in the corpus
    Corpus {
        /// Corpus root directory (overrides configuration)
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display active settings
    Config,
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => process::exit(i32::from(code.code())),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(i32::from(ExitCode::Error.code()));
        }
    }
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("clinsearch=warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;

    match cli.command {
        Commands::Search {
            query,
            top_k,
            aggregation,
            corpus,
            model,
            lenient,
            no_validate,
            timeout_secs,
            json,
        } => {
            let model_id = model.unwrap_or(settings.provider.model);
            let provider = FastEmbedProvider::new(&model_id)
                .with_context(|| format!("cannot initialize embedding model '{model_id}'"))?;

            let validator: Box<dyn QueryValidator> = if no_validate {
                Box::new(AcceptAllValidator)
            } else {
                Box::new(HeuristicValidator)
            };

            let mut request = SearchRequest::new(query, corpus.unwrap_or(settings.corpus_root))
                .with_top_k(top_k.unwrap_or(settings.top_k))
                .with_aggregation(aggregation.unwrap_or(settings.aggregation))
                .with_strict_threshold(!lenient && settings.strict_threshold);
            if let Some(secs) = timeout_secs {
                request = request.with_deadline(Instant::now() + Duration::from_secs(secs));
            }

            let orchestrator = SearchOrchestrator::new(&provider, validator.as_ref());
            let outcome = orchestrator.search(&request);

            println!(
                "{}",
                render_outcome(&outcome, OutputFormat::from_json_flag(json))
            );
            Ok(ExitCode::from_outcome(&outcome))
        }

        Commands::Corpus { corpus, json } => {
            let root = corpus.unwrap_or(settings.corpus_root);
            let store = VectorStore::new(&root);
            let artifacts = store
                .load_artifacts(None)
                .with_context(|| format!("cannot load corpus at '{}'", root.display()))?;

            println!(
                "{}",
                render_corpus(&artifacts, OutputFormat::from_json_flag(json))
            );
            Ok(ExitCode::Success)
        }

        Commands::Config => {
            let rendered =
                toml::to_string_pretty(&settings).context("failed to serialize settings")?;
            println!("{rendered}");
            Ok(ExitCode::Success)
        }
    }
}
