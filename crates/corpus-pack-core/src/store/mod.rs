//! Corpus storage abstraction.
//!
//! The [`CorpusStore`] trait is the only point where the pipeline touches
//! external data. Backends return raw [`ChunkRow`]s decoded through
//! [`ChunkRow::decode`], so every backend rejects malformed list fields the
//! same way.
//!
//! # Cycle matching
//!
//! Cycle keys are matched against the *serialized* cycle list, not the
//! decoded set: a row matches when its `cycle_keys_json` text contains any
//! of the filter's keys as a substring. `"c1"` therefore also matches a row
//! tagged `"c10"`. Backends must reproduce this exactly; see
//! [`cycle_filter_matches`].

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;
use crate::models::{KnowledgeChunk, RetrievalFilter};

/// A chunk row as it is persisted, with list fields still encoded as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRow {
    pub id: String,
    pub source_path: String,
    pub subject_key: String,
    pub topic_key: String,
    pub cycle_keys_json: String,
    pub micro_targets_json: String,
    pub evaluation_focus_json: String,
    pub text: String,
    pub token_count: i64,
    pub chunk_index: i64,
    pub total_chunks: i64,
}

impl ChunkRow {
    /// Decode the serialized list fields and validate positional data.
    pub fn decode(self) -> Result<KnowledgeChunk, RetrievalError> {
        let cycle_keys = decode_list(&self.id, "cycle_keys", &self.cycle_keys_json)?;
        let micro_targets = decode_list(&self.id, "micro_targets", &self.micro_targets_json)?;
        let evaluation_focus =
            decode_list(&self.id, "evaluation_focus", &self.evaluation_focus_json)?;

        let token_count = non_negative(&self.id, "token_count", self.token_count)?;
        let chunk_index = non_negative(&self.id, "chunk_index", self.chunk_index)?;
        let total_chunks = non_negative(&self.id, "total_chunks", self.total_chunks)?;
        if chunk_index >= total_chunks {
            return Err(RetrievalError::malformed(
                self.id,
                "chunk_index",
                format!("index {} out of range for {} chunks", chunk_index, total_chunks),
            ));
        }

        Ok(KnowledgeChunk {
            id: self.id,
            source_path: self.source_path,
            subject_key: self.subject_key,
            topic_key: self.topic_key,
            cycle_keys,
            micro_targets,
            evaluation_focus,
            text: self.text,
            token_count,
            chunk_index,
            total_chunks,
            relevance_score: 0,
            truncated: false,
        })
    }
}

fn decode_list(id: &str, field: &'static str, raw: &str) -> Result<Vec<String>, RetrievalError> {
    serde_json::from_str::<Vec<String>>(raw).map_err(|e| RetrievalError::malformed(id, field, e))
}

fn non_negative(id: &str, field: &'static str, value: i64) -> Result<usize, RetrievalError> {
    usize::try_from(value)
        .map_err(|_| RetrievalError::malformed(id, field, format!("negative value {}", value)))
}

/// Serialized-substring cycle match. An empty filter list always matches.
pub fn cycle_filter_matches(cycle_keys_json: &str, filter_cycles: &[String]) -> bool {
    filter_cycles.is_empty()
        || filter_cycles
            .iter()
            .any(|key| cycle_keys_json.contains(key.as_str()))
}

/// Read-only source of pre-chunked corpus records.
///
/// Implementations return every chunk whose subject and topic equal the
/// filter's exactly and whose serialized cycle list passes
/// [`cycle_filter_matches`], ordered by `source_path` then `chunk_index`.
/// Any row that fails [`ChunkRow::decode`] fails the whole call.
#[async_trait]
pub trait CorpusStore: Send + Sync {
    async fn query_chunks(
        &self,
        filter: &RetrievalFilter,
    ) -> Result<Vec<KnowledgeChunk>, RetrievalError>;
}
