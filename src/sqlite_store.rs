//! SQLite-backed [`CorpusStore`] implementation.
//!
//! Reads go through [`CorpusStore::query_chunks`]; the write helpers are
//! used only by ingestion and never by a retrieval call.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use corpus_pack_core::error::RetrievalError;
use corpus_pack_core::models::{KnowledgeChunk, RetrievalFilter};
use corpus_pack_core::store::{ChunkRow, CorpusStore};

const SELECT_CHUNKS: &str = r#"
    SELECT id, source_path, subject_key, topic_key,
           cycle_keys_json, micro_targets_json, evaluation_focus_json,
           text, token_count, chunk_index, total_chunks
    FROM knowledge_chunks
    WHERE subject_key = ? AND topic_key = ?
"#;

/// SQLite implementation of [`CorpusStore`] over the `knowledge_chunks` table.
pub struct SqliteCorpus {
    pool: SqlitePool,
}

impl SqliteCorpus {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Release every connection held by this corpus.
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// The stored content hash for a source, if it has been ingested.
    pub async fn source_hash(&self, source_path: &str) -> Result<Option<String>> {
        let hash: Option<String> = sqlx::query_scalar(
            "SELECT source_hash FROM knowledge_chunks WHERE source_path = ? LIMIT 1",
        )
        .bind(source_path)
        .fetch_optional(&self.pool)
        .await?;
        Ok(hash)
    }

    /// Replace all rows for `source_path` in one transaction.
    pub async fn replace_source(
        &self,
        source_path: &str,
        rows: &[ChunkRow],
        source_hash: &str,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM knowledge_chunks WHERE source_path = ?")
            .bind(source_path)
            .execute(&mut *tx)
            .await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO knowledge_chunks (id, source_path, subject_key, topic_key,
                                              cycle_keys_json, micro_targets_json,
                                              evaluation_focus_json, text, token_count,
                                              chunk_index, total_chunks, source_hash, ingested_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&row.id)
            .bind(&row.source_path)
            .bind(&row.subject_key)
            .bind(&row.topic_key)
            .bind(&row.cycle_keys_json)
            .bind(&row.micro_targets_json)
            .bind(&row.evaluation_focus_json)
            .bind(&row.text)
            .bind(row.token_count)
            .bind(row.chunk_index)
            .bind(row.total_chunks)
            .bind(source_hash)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Build the query with one `instr` clause per cycle key, OR-ed together.
///
/// `instr` is a case-sensitive substring test on the serialized list, which
/// is exactly the matching rule the pipeline promises.
fn build_query(cycle_count: usize) -> String {
    let mut sql = SELECT_CHUNKS.to_string();
    if cycle_count > 0 {
        let clauses = vec!["instr(cycle_keys_json, ?) > 0"; cycle_count].join(" OR ");
        sql.push_str(&format!("      AND ({})\n", clauses));
    }
    sql.push_str("    ORDER BY source_path ASC, chunk_index ASC");
    sql
}

fn read_row(row: &SqliteRow) -> Result<ChunkRow, RetrievalError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| RetrievalError::malformed("<unknown>", "id", e))?;

    macro_rules! field {
        ($name:literal) => {
            row.try_get($name)
                .map_err(|e| RetrievalError::malformed(id.clone(), $name, e))?
        };
    }

    Ok(ChunkRow {
        source_path: field!("source_path"),
        subject_key: field!("subject_key"),
        topic_key: field!("topic_key"),
        cycle_keys_json: field!("cycle_keys_json"),
        micro_targets_json: field!("micro_targets_json"),
        evaluation_focus_json: field!("evaluation_focus_json"),
        text: field!("text"),
        token_count: field!("token_count"),
        chunk_index: field!("chunk_index"),
        total_chunks: field!("total_chunks"),
        id,
    })
}

#[async_trait]
impl CorpusStore for SqliteCorpus {
    async fn query_chunks(
        &self,
        filter: &RetrievalFilter,
    ) -> Result<Vec<KnowledgeChunk>, RetrievalError> {
        let sql = build_query(filter.cycle_keys.len());
        let mut query = sqlx::query(&sql)
            .bind(&filter.subject_key)
            .bind(&filter.topic_key);
        for key in &filter.cycle_keys {
            query = query.bind(key);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RetrievalError::StoreUnavailable(e.to_string()))?;

        rows.iter()
            .map(|row| read_row(row).and_then(ChunkRow::decode))
            .collect()
    }
}
