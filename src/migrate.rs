//! Schema migrations (idempotent).

use anyhow::Result;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    // List-valued fields are stored as JSON text and decoded at query time.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS knowledge_chunks (
            id TEXT PRIMARY KEY,
            source_path TEXT NOT NULL,
            subject_key TEXT NOT NULL,
            topic_key TEXT NOT NULL,
            cycle_keys_json TEXT NOT NULL DEFAULT '[]',
            micro_targets_json TEXT NOT NULL DEFAULT '[]',
            evaluation_focus_json TEXT NOT NULL DEFAULT '[]',
            text TEXT NOT NULL,
            token_count INTEGER NOT NULL,
            chunk_index INTEGER NOT NULL,
            total_chunks INTEGER NOT NULL,
            source_hash TEXT NOT NULL,
            ingested_at INTEGER NOT NULL,
            UNIQUE(source_path, chunk_index)
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_chunks_subject_topic \
         ON knowledge_chunks(subject_key, topic_key)",
    )
    .execute(&pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_source ON knowledge_chunks(source_path)")
        .execute(&pool)
        .await?;

    pool.close().await;
    Ok(())
}
