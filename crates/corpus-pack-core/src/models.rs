//! Core data models for a single retrieval call.
//!
//! Every value here is created fresh per call and dropped once the
//! serialized context block has been produced. Nothing is cached.

use serde::{Deserialize, Serialize};

/// Default token budget when the caller does not supply one.
pub const DEFAULT_MAX_TOKENS: usize = 4000;

/// A pre-chunked unit of reference text with its classification and
/// coverage metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    pub id: String,
    /// Originating document, used for coverage reporting.
    pub source_path: String,
    pub subject_key: String,
    pub topic_key: String,
    pub cycle_keys: Vec<String>,
    pub micro_targets: Vec<String>,
    pub evaluation_focus: Vec<String>,
    pub text: String,
    pub token_count: usize,
    /// 0-based position within the source document.
    pub chunk_index: usize,
    pub total_chunks: usize,
    /// Attached by the scorer; never persisted.
    #[serde(default)]
    pub relevance_score: i64,
    /// Set when the packer shrank this chunk to fit the budget boundary.
    #[serde(default)]
    pub truncated: bool,
}

/// Input to a single retrieval call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalFilter {
    pub subject_key: String,
    pub topic_key: String,
    /// OR-matched; an empty list applies no cycle constraint.
    #[serde(default)]
    pub cycle_keys: Vec<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// When set, chunks scoring below this are dropped before packing.
    #[serde(default)]
    pub min_relevance_score: Option<i64>,
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

impl RetrievalFilter {
    pub fn new(subject_key: impl Into<String>, topic_key: impl Into<String>) -> Self {
        Self {
            subject_key: subject_key.into(),
            topic_key: topic_key.into(),
            cycle_keys: Vec::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            min_relevance_score: None,
        }
    }

    pub fn with_cycles<I, S>(mut self, cycles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cycle_keys = cycles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_min_relevance_score(mut self, min: Option<i64>) -> Self {
        self.min_relevance_score = min;
        self
    }
}

/// Summary of what the final selection covers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageStats {
    pub sources_represented: usize,
    /// Union in first-seen order, no duplicates.
    pub micro_targets: Vec<String>,
    /// Union in first-seen order, no duplicates.
    pub evaluation_focus: Vec<String>,
}

/// Output of a retrieval call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievedKnowledge {
    /// Selection order, i.e. descending relevance.
    pub chunks: Vec<KnowledgeChunk>,
    pub total_tokens: usize,
    /// `selected / all_matching`, or `0.0` when nothing matched.
    pub compression_ratio: f64,
    pub coverage_stats: CoverageStats,
}

impl RetrievedKnowledge {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
