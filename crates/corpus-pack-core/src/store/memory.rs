//! In-memory [`CorpusStore`] implementation for tests and embedding hosts.
//!
//! Holds raw [`ChunkRow`]s behind `std::sync::RwLock` and applies the same
//! filter, ordering, and decode rules as the SQLite backend.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::RetrievalError;
use crate::models::{KnowledgeChunk, RetrievalFilter};

use super::{cycle_filter_matches, ChunkRow, CorpusStore};

/// In-memory corpus of chunk rows.
pub struct InMemoryCorpus {
    rows: RwLock<Vec<ChunkRow>>,
}

impl InMemoryCorpus {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn from_rows(rows: Vec<ChunkRow>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Replace every row belonging to `source_path`.
    pub fn replace_source(
        &self,
        source_path: &str,
        rows: Vec<ChunkRow>,
    ) -> Result<(), RetrievalError> {
        let mut stored = self
            .rows
            .write()
            .map_err(|e| RetrievalError::StoreUnavailable(e.to_string()))?;
        stored.retain(|r| r.source_path != source_path);
        stored.extend(rows);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryCorpus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CorpusStore for InMemoryCorpus {
    async fn query_chunks(
        &self,
        filter: &RetrievalFilter,
    ) -> Result<Vec<KnowledgeChunk>, RetrievalError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| RetrievalError::StoreUnavailable(e.to_string()))?;

        let mut matching: Vec<ChunkRow> = rows
            .iter()
            .filter(|r| r.subject_key == filter.subject_key && r.topic_key == filter.topic_key)
            .filter(|r| cycle_filter_matches(&r.cycle_keys_json, &filter.cycle_keys))
            .cloned()
            .collect();
        drop(rows);

        matching.sort_by(|a, b| {
            a.source_path
                .cmp(&b.source_path)
                .then(a.chunk_index.cmp(&b.chunk_index))
        });

        matching.into_iter().map(ChunkRow::decode).collect()
    }
}
