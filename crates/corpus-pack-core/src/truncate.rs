//! Line-granular truncation of the boundary chunk.
//!
//! Lines are kept from the top while their summed estimates stay within
//! `remaining - 50` (the 50 tokens are reserved for the marker). A line is
//! never split. If what survives is shorter than 30% of the original text
//! (in characters), the chunk is rejected and `None` is returned.

use crate::models::KnowledgeChunk;
use crate::tokens::TokenEstimator;

/// Appended to every truncated chunk.
pub const TRUNCATION_MARKER: &str = "\n\n[... truncated ...]";

const MARKER_RESERVE_TOKENS: usize = 50;
const MARKER_TOKEN_BUFFER: usize = 10;
const MIN_KEPT_FRACTION: f64 = 0.3;

/// Shrink `chunk` to fit within `remaining` tokens.
///
/// Returns `None` when the kept prefix would be uselessly small. On success
/// the returned chunk has the marker appended, `truncated` set, and
/// `token_count = estimate(kept) + 10`.
pub fn truncate_chunk(
    chunk: &KnowledgeChunk,
    remaining: usize,
    estimator: &dyn TokenEstimator,
) -> Option<KnowledgeChunk> {
    let line_budget = remaining.saturating_sub(MARKER_RESERVE_TOKENS);

    let mut kept: Vec<&str> = Vec::new();
    let mut accumulated = 0usize;
    for line in chunk.text.split('\n') {
        let line_tokens = estimator.estimate(line);
        if accumulated + line_tokens > line_budget {
            break;
        }
        kept.push(line);
        accumulated += line_tokens;
    }

    // Joining re-adds newlines the per-line estimates never saw.
    let mut kept_text = kept.join("\n");
    while !kept.is_empty() && estimator.estimate(&kept_text) + MARKER_TOKEN_BUFFER > remaining {
        kept.pop();
        kept_text = kept.join("\n");
    }

    if kept_text.trim().is_empty() {
        return None;
    }

    let original_len = chunk.text.chars().count();
    let kept_len = kept_text.chars().count();
    if (kept_len as f64) < original_len as f64 * MIN_KEPT_FRACTION {
        return None;
    }

    let token_count = estimator.estimate(&kept_text) + MARKER_TOKEN_BUFFER;
    let mut truncated = chunk.clone();
    truncated.text = kept_text + TRUNCATION_MARKER;
    truncated.token_count = token_count;
    truncated.truncated = true;
    Some(truncated)
}
