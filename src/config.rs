//! TOML configuration.
//!
//! ```toml
//! [db]
//! path = "./data/corpus.sqlite"
//!
//! [retrieval]
//! max_tokens = 4000
//! enforce_min_relevance = false
//! min_relevance_score = 15
//!
//! [chunking]
//! max_tokens = 700
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use corpus_pack_core::models::DEFAULT_MAX_TOKENS;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Budget used when a request does not name one.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Apply `min_relevance_score` to every request by default.
    #[serde(default)]
    pub enforce_min_relevance: bool,
    #[serde(default)]
    pub min_relevance_score: Option<i64>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            enforce_min_relevance: false,
            min_relevance_score: None,
        }
    }
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_tokens")]
    pub max_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_chunk_tokens(),
        }
    }
}

fn default_chunk_tokens() -> usize {
    700
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing` filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl RetrievalConfig {
    /// The relevance floor a request gets when it does not pass its own.
    pub fn default_min_relevance(&self) -> Option<i64> {
        if self.enforce_min_relevance {
            self.min_relevance_score
        } else {
            None
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.retrieval.max_tokens == 0 {
        anyhow::bail!("retrieval.max_tokens must be > 0");
    }

    if config.chunking.max_tokens == 0 {
        anyhow::bail!("chunking.max_tokens must be > 0");
    }

    if config.retrieval.enforce_min_relevance && config.retrieval.min_relevance_score.is_none() {
        anyhow::bail!(
            "retrieval.min_relevance_score must be set when enforce_min_relevance is true"
        );
    }

    Ok(config)
}
