//! Greedy token-budget packing.
//!
//! # Algorithm
//!
//! 1. Walk chunks in ranked order, keeping a running token total.
//! 2. Include a chunk whole while `total + chunk.token_count <= max_tokens`.
//! 3. At the first chunk that does not fit, stop. Before stopping, if more
//!    than 100 tokens remain, try [`truncate_chunk`] on that one chunk and
//!    append the result when it succeeds.
//!
//! At most one chunk is ever truncated per call, and nothing after the
//! boundary chunk is considered.

use tracing::{debug, warn};

use crate::models::KnowledgeChunk;
use crate::tokens::TokenEstimator;
use crate::truncate::truncate_chunk;

/// Truncation is only attempted when more than this many tokens remain.
pub const MIN_TRUNCATION_BUDGET: usize = 100;

/// Result of packing: the selection and its token total.
#[derive(Debug, Clone, Default)]
pub struct PackOutcome {
    pub selected: Vec<KnowledgeChunk>,
    pub total_tokens: usize,
}

/// Select chunks from `ranked` until `max_tokens` is exhausted.
///
/// `ranked` must already be in descending relevance order; selection order
/// is preserved in the output.
pub fn pack_chunks(
    ranked: Vec<KnowledgeChunk>,
    max_tokens: usize,
    estimator: &dyn TokenEstimator,
) -> PackOutcome {
    let mut outcome = PackOutcome::default();

    for chunk in ranked {
        if outcome.total_tokens + chunk.token_count <= max_tokens {
            outcome.total_tokens += chunk.token_count;
            outcome.selected.push(chunk);
            continue;
        }

        let remaining = max_tokens - outcome.total_tokens;
        if remaining > MIN_TRUNCATION_BUDGET {
            match truncate_chunk(&chunk, remaining, estimator) {
                Some(truncated) => {
                    debug!(
                        chunk_id = %chunk.id,
                        original_tokens = chunk.token_count,
                        truncated_tokens = truncated.token_count,
                        "boundary chunk truncated"
                    );
                    outcome.total_tokens += truncated.token_count;
                    outcome.selected.push(truncated);
                }
                None => {
                    warn!(chunk_id = %chunk.id, remaining, "boundary truncation rejected");
                }
            }
        }
        break;
    }

    outcome
}
