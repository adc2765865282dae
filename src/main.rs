//! # Corpus Pack CLI (`cpack`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cpack init` | Create the SQLite database and run schema migrations |
//! | `cpack ingest <file.jsonl>` | Chunk and store source documents |
//! | `cpack retrieve --subject S --topic T` | Print the packed knowledge block |
//! | `cpack stats` | Corpus totals and per subject/topic breakdown |
//!
//! ## Examples
//!
//! ```bash
//! cpack init --config ./config/cpack.toml
//! cpack ingest ./corpus/math.jsonl --config ./config/cpack.toml
//! cpack retrieve --subject math --topic fractions --cycle c3 --max-tokens 2000
//! cpack retrieve --subject math --topic fractions --format json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use corpus_pack::retrieve::{OutputFormat, RetrieveArgs};
use corpus_pack::{config, ingest, migrate, retrieve, stats};

/// Corpus Pack CLI — budgeted knowledge retrieval over a pre-chunked corpus.
#[derive(Parser)]
#[command(
    name = "cpack",
    about = "Corpus Pack — budgeted knowledge retrieval over a pre-chunked reference corpus",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/cpack.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Chunk and store documents from a JSONL file.
    ///
    /// Each line is a document with `source_path`, `subject_key`,
    /// `topic_key`, optional `cycle_keys`, `micro_targets`,
    /// `evaluation_focus`, and `body`. Unchanged documents are skipped.
    Ingest {
        /// JSONL input file.
        input: PathBuf,

        /// Rewrite every document even if its content hash is unchanged.
        #[arg(long)]
        full: bool,

        /// Dry run — show document and chunk counts without writing.
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of documents to process.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Retrieve, rank, and pack knowledge for a subject/topic.
    Retrieve {
        /// Subject key (exact match).
        #[arg(long)]
        subject: String,

        /// Topic key (exact match).
        #[arg(long)]
        topic: String,

        /// Cycle key; repeat for several (OR-matched).
        #[arg(long = "cycle")]
        cycles: Vec<String>,

        /// Token budget; defaults to `retrieval.max_tokens`.
        #[arg(long)]
        max_tokens: Option<usize>,

        /// Drop chunks scoring below this before packing.
        #[arg(long)]
        min_score: Option<i64>,

        /// Output format.
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show corpus statistics.
    Stats,
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    init_tracing(&cfg.logging.level);

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest {
            input,
            full,
            dry_run,
            limit,
        } => {
            ingest::run_ingest(&cfg, &input, full, dry_run, limit).await?;
        }
        Commands::Retrieve {
            subject,
            topic,
            cycles,
            max_tokens,
            min_score,
            format,
        } => {
            let args = RetrieveArgs {
                subject,
                topic,
                cycles,
                max_tokens,
                min_score,
            };
            retrieve::run_retrieve(&cfg, args, format).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}
