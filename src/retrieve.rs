//! Retrieval entry point and the `cpack retrieve` command.
//!
//! Each call opens its own read-only store handle, runs the core pipeline,
//! and closes the handle before returning, on the error path as well.

use anyhow::{Context, Result};
use tracing::warn;

use corpus_pack_core::error::RetrievalError;
use corpus_pack_core::models::{RetrievalFilter, RetrievedKnowledge};
use corpus_pack_core::tokens::CharRatioEstimator;
use corpus_pack_core::{format_knowledge_context, retrieve};

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteCorpus;

/// Run one retrieval call against the configured corpus.
///
/// Store failures surface as [`RetrievalError`]; nothing is retried here.
pub async fn retrieve_knowledge(
    config: &Config,
    filter: &RetrievalFilter,
) -> Result<RetrievedKnowledge, RetrievalError> {
    let pool = db::connect_read_only(config)
        .await
        .map_err(|e| RetrievalError::StoreUnavailable(e.to_string()))?;
    let corpus = SqliteCorpus::new(pool);

    let estimator = CharRatioEstimator::default();
    let result = retrieve(&corpus, filter, &estimator).await;

    corpus.close().await;
    result
}

/// Output format for `cpack retrieve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// The prompt-ready knowledge block.
    Text,
    /// The full `RetrievedKnowledge` value, including scores.
    Json,
}

/// CLI arguments for a retrieval, before config defaults are applied.
#[derive(Debug, Clone)]
pub struct RetrieveArgs {
    pub subject: String,
    pub topic: String,
    pub cycles: Vec<String>,
    pub max_tokens: Option<usize>,
    pub min_score: Option<i64>,
}

impl RetrieveArgs {
    pub fn into_filter(self, config: &Config) -> RetrievalFilter {
        RetrievalFilter::new(self.subject, self.topic)
            .with_cycles(self.cycles)
            .with_max_tokens(self.max_tokens.unwrap_or(config.retrieval.max_tokens))
            .with_min_relevance_score(
                self.min_score
                    .or_else(|| config.retrieval.default_min_relevance()),
            )
    }
}

/// CLI entry point: retrieve and print to stdout.
pub async fn run_retrieve(config: &Config, args: RetrieveArgs, format: OutputFormat) -> Result<()> {
    let filter = args.into_filter(config);
    let knowledge = retrieve_knowledge(config, &filter)
        .await
        .with_context(|| {
            format!(
                "retrieval failed for {}/{}",
                filter.subject_key, filter.topic_key
            )
        })?;

    if knowledge.is_empty() {
        warn!(
            subject = %filter.subject_key,
            topic = %filter.topic_key,
            "no chunks selected"
        );
    }

    match format {
        OutputFormat::Text => print!("{}", format_knowledge_context(&knowledge)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&knowledge)?),
    }

    Ok(())
}
