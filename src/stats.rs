//! Corpus statistics.
//!
//! A quick summary of what is indexed: chunk, source, and token totals plus
//! a per subject/topic breakdown. Used by `cpack stats` to confirm an
//! ingest landed where expected.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;

/// Per subject/topic breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicStats {
    pub subject_key: String,
    pub topic_key: String,
    pub source_count: i64,
    pub chunk_count: i64,
    pub token_total: i64,
}

/// Corpus-wide totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusStats {
    pub total_chunks: i64,
    pub total_sources: i64,
    pub total_tokens: i64,
    pub last_ingested_at: Option<i64>,
    pub topics: Vec<TopicStats>,
}

pub async fn collect_stats(pool: &SqlitePool) -> Result<CorpusStats> {
    let totals = sqlx::query(
        r#"
        SELECT COUNT(*) AS chunks,
               COUNT(DISTINCT source_path) AS sources,
               COALESCE(SUM(token_count), 0) AS tokens,
               MAX(ingested_at) AS last_ingested
        FROM knowledge_chunks
        "#,
    )
    .fetch_one(pool)
    .await?;

    let topic_rows = sqlx::query(
        r#"
        SELECT subject_key, topic_key,
               COUNT(DISTINCT source_path) AS sources,
               COUNT(*) AS chunks,
               COALESCE(SUM(token_count), 0) AS tokens
        FROM knowledge_chunks
        GROUP BY subject_key, topic_key
        ORDER BY subject_key ASC, topic_key ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let topics = topic_rows
        .iter()
        .map(|row| TopicStats {
            subject_key: row.get("subject_key"),
            topic_key: row.get("topic_key"),
            source_count: row.get("sources"),
            chunk_count: row.get("chunks"),
            token_total: row.get("tokens"),
        })
        .collect();

    Ok(CorpusStats {
        total_chunks: totals.get("chunks"),
        total_sources: totals.get("sources"),
        total_tokens: totals.get("tokens"),
        last_ingested_at: totals.get("last_ingested"),
        topics,
    })
}

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let result = collect_stats(&pool).await;
    pool.close().await;
    let stats = result?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Corpus Pack — Corpus Stats");
    println!("==========================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Sources:     {}", stats.total_sources);
    println!("  Chunks:      {}", stats.total_chunks);
    println!("  Tokens:      {}", stats.total_tokens);
    println!(
        "  Last ingest: {}",
        stats
            .last_ingested_at
            .map(format_ts)
            .unwrap_or_else(|| "never".to_string())
    );

    if !stats.topics.is_empty() {
        println!();
        println!("  By subject/topic:");
        println!(
            "  {:<32} {:>8} {:>8} {:>10}",
            "SUBJECT/TOPIC", "SOURCES", "CHUNKS", "TOKENS"
        );
        println!("  {}", "-".repeat(62));
        for t in &stats.topics {
            println!(
                "  {:<32} {:>8} {:>8} {:>10}",
                format!("{}/{}", t.subject_key, t.topic_key),
                t.source_count,
                t.chunk_count,
                t.token_total
            );
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

fn format_ts(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_format_ts() {
        assert_eq!(format_ts(0), "1970-01-01 00:00");
    }
}
