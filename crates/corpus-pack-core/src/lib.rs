//! # Corpus Pack Core
//!
//! Pure retrieval-and-compression pipeline for Corpus Pack: chunk models,
//! token estimation, relevance scoring, budget packing with a single
//! boundary truncation, coverage aggregation, and context serialization.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. The only stage
//! that touches storage goes through the [`store::CorpusStore`] trait, so
//! the pipeline runs unchanged against SQLite or the in-memory backend.
//!
//! ```text
//! query ──▶ score ──▶ pack (──▶ truncate) ──▶ coverage ──▶ serialize
//! ```

pub mod chunk;
pub mod coverage;
pub mod error;
pub mod models;
pub mod pack;
pub mod retrieve;
pub mod score;
pub mod serialize;
pub mod store;
pub mod tokens;
pub mod truncate;

pub use error::RetrievalError;
pub use models::{CoverageStats, KnowledgeChunk, RetrievalFilter, RetrievedKnowledge};
pub use retrieve::retrieve;
pub use serialize::format_knowledge_context;
pub use tokens::{estimate_tokens, CharRatioEstimator, TokenEstimator};
