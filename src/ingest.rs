//! Corpus ingestion: JSONL documents → chunk rows → SQLite.
//!
//! Each non-empty line of the input is one [`SourceDocument`]. Documents
//! whose content hash matches what is already stored are skipped unless
//! `full` is set; changed documents have all their rows replaced in a
//! single transaction.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use corpus_pack_core::chunk::{chunk_document, SourceDocument};

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteCorpus;

/// Counts reported by an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub documents_read: usize,
    pub documents_written: usize,
    pub documents_unchanged: usize,
    pub chunks_written: usize,
}

/// Parse a JSONL file of source documents.
pub fn read_documents(path: &Path) -> Result<Vec<SourceDocument>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<SourceDocument>(line)
                .with_context(|| format!("{}:{}: invalid document", path.display(), i + 1))
        })
        .collect()
}

/// Chunk and store `documents`, returning what was done.
pub async fn ingest_documents(
    corpus: &SqliteCorpus,
    documents: &[SourceDocument],
    chunk_tokens: usize,
    full: bool,
) -> Result<IngestReport> {
    let mut report = IngestReport {
        documents_read: documents.len(),
        ..Default::default()
    };

    for doc in documents {
        let hash = doc.content_hash();
        if !full && corpus.source_hash(&doc.source_path).await?.as_deref() == Some(hash.as_str()) {
            debug!(source = %doc.source_path, "unchanged, skipping");
            report.documents_unchanged += 1;
            continue;
        }

        let rows = chunk_document(doc, chunk_tokens);
        corpus
            .replace_source(&doc.source_path, &rows, &hash)
            .await
            .with_context(|| format!("Failed to store chunks for {}", doc.source_path))?;

        debug!(source = %doc.source_path, chunks = rows.len(), "document stored");
        report.documents_written += 1;
        report.chunks_written += rows.len();
    }

    info!(
        written = report.documents_written,
        unchanged = report.documents_unchanged,
        chunks = report.chunks_written,
        "ingest complete"
    );
    Ok(report)
}

/// CLI entry point for `cpack ingest`.
pub async fn run_ingest(
    config: &Config,
    input: &Path,
    full: bool,
    dry_run: bool,
    limit: Option<usize>,
) -> Result<()> {
    let mut documents = read_documents(input)?;
    if let Some(lim) = limit {
        documents.truncate(lim);
    }

    if dry_run {
        println!("ingest {} (dry-run)", input.display());
        println!("  documents found: {}", documents.len());
        let total_chunks: usize = documents
            .iter()
            .map(|doc| chunk_document(doc, config.chunking.max_tokens).len())
            .sum();
        println!("  estimated chunks: {}", total_chunks);
        return Ok(());
    }

    let corpus = SqliteCorpus::new(db::connect(config).await?);
    let result = ingest_documents(&corpus, &documents, config.chunking.max_tokens, full).await;
    corpus.close().await;
    let report = result?;

    println!("ingest {}", input.display());
    println!("  documents read: {}", report.documents_read);
    println!("  documents written: {}", report.documents_written);
    println!("  documents unchanged: {}", report.documents_unchanged);
    println!("  chunks written: {}", report.chunks_written);
    println!("ok");

    Ok(())
}
