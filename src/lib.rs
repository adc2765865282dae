//! # Corpus Pack
//!
//! **Budgeted knowledge retrieval over a pre-chunked reference corpus.**
//!
//! Given a subject/topic filter, Corpus Pack selects matching chunks from a
//! SQLite corpus, ranks them with a deterministic relevance score, packs
//! them into a hard token budget (truncating one boundary chunk when it is
//! worth it), and renders the selection as a single text block ready to be
//! embedded in a generation prompt.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌────────────────────────────────┐
//! │  JSONL     │──▶│   Ingest     │──▶│  SQLite  knowledge_chunks      │
//! │  documents │   │ chunk+hash   │   └───────────────┬────────────────┘
//! └────────────┘   └──────────────┘                   │ read-only, per call
//!                                                     ▼
//!              query ─▶ score ─▶ pack (─▶ truncate) ─▶ coverage ─▶ serialize
//! ```
//!
//! The pipeline itself lives in [`corpus_pack_core`]; this crate supplies the
//! SQLite backend, configuration, ingestion, and the `cpack` CLI.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connections (writable pool, read-only per-call handle) |
//! | [`migrate`] | Idempotent schema migrations |
//! | [`sqlite_store`] | SQLite `CorpusStore` backend and ingest writes |
//! | [`ingest`] | JSONL documents → chunk rows → SQLite |
//! | [`retrieve`] | Scoped retrieval entry point and `cpack retrieve` |
//! | [`stats`] | Corpus totals and per subject/topic breakdown |

pub mod config;
pub mod db;
pub mod ingest;
pub mod migrate;
pub mod retrieve;
pub mod sqlite_store;
pub mod stats;

pub use corpus_pack_core::{
    format_knowledge_context, KnowledgeChunk, RetrievalError, RetrievalFilter, RetrievedKnowledge,
};
pub use retrieve::retrieve_knowledge;
