//! Deterministic relevance scoring.
//!
//! # Formula
//!
//! | Component | Value |
//! |-----------|-------|
//! | Base (subject/topic already matched) | `10` |
//! | Cycle overlap | `5 × |chunk.cycles ∩ filter.cycles|` |
//! | Micro-target breadth | `min(2 × |micro_targets|, 10)` |
//! | Evaluation breadth | `min(2 × |evaluation_focus|, 8)` |
//! | Oversized chunk (`token_count > 1000`) | `-3` |
//! | Lead chunk (`chunk_index == 0`) | `+2` |

use std::collections::HashSet;

use crate::models::{KnowledgeChunk, RetrievalFilter};

const BASE_SCORE: i64 = 10;
const CYCLE_OVERLAP_BONUS: i64 = 5;
const MICRO_TARGET_CAP: i64 = 10;
const EVALUATION_FOCUS_CAP: i64 = 8;
const LARGE_CHUNK_TOKENS: usize = 1000;
const LARGE_CHUNK_PENALTY: i64 = 3;
const LEAD_CHUNK_BONUS: i64 = 2;

/// Score one chunk against a filter. Pure and order-independent.
pub fn score_chunk(chunk: &KnowledgeChunk, filter: &RetrievalFilter) -> i64 {
    let mut score = BASE_SCORE;

    let wanted: HashSet<&str> = filter.cycle_keys.iter().map(String::as_str).collect();
    let chunk_cycles: HashSet<&str> = chunk.cycle_keys.iter().map(String::as_str).collect();
    let overlap = chunk_cycles.intersection(&wanted).count() as i64;
    score += CYCLE_OVERLAP_BONUS * overlap;

    score += (2 * chunk.micro_targets.len() as i64).min(MICRO_TARGET_CAP);
    score += (2 * chunk.evaluation_focus.len() as i64).min(EVALUATION_FOCUS_CAP);

    if chunk.token_count > LARGE_CHUNK_TOKENS {
        score -= LARGE_CHUNK_PENALTY;
    }
    if chunk.chunk_index == 0 {
        score += LEAD_CHUNK_BONUS;
    }

    score
}

/// Attach scores and sort by descending score.
///
/// The sort is stable, so equal-score chunks keep their query order.
pub fn rank_chunks(
    mut chunks: Vec<KnowledgeChunk>,
    filter: &RetrievalFilter,
) -> Vec<KnowledgeChunk> {
    for chunk in &mut chunks {
        chunk.relevance_score = score_chunk(chunk, filter);
    }
    chunks.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(
        id: &str,
        cycles: &[&str],
        targets: usize,
        focus: usize,
        tokens: usize,
        index: usize,
    ) -> KnowledgeChunk {
        KnowledgeChunk {
            id: id.to_string(),
            source_path: "doc.md".to_string(),
            subject_key: "math".to_string(),
            topic_key: "fractions".to_string(),
            cycle_keys: cycles.iter().map(|s| s.to_string()).collect(),
            micro_targets: (0..targets).map(|i| format!("mt{}", i)).collect(),
            evaluation_focus: (0..focus).map(|i| format!("ef{}", i)).collect(),
            text: String::new(),
            token_count: tokens,
            chunk_index: index,
            total_chunks: index + 1,
            relevance_score: 0,
            truncated: false,
        }
    }

    #[test]
    fn test_base_only() {
        let filter = RetrievalFilter::new("math", "fractions");
        assert_eq!(score_chunk(&chunk("a", &[], 0, 0, 100, 1), &filter), 10);
    }

    #[test]
    fn test_lead_chunk_bonus() {
        let filter = RetrievalFilter::new("math", "fractions");
        assert_eq!(score_chunk(&chunk("a", &[], 0, 0, 100, 0), &filter), 12);
    }

    #[test]
    fn test_cycle_overlap_counts_distinct_keys() {
        let filter =
            RetrievalFilter::new("math", "fractions").with_cycles(["c2", "c3", "c3", "c9"]);
        let c = chunk("a", &["c2", "c3", "c4"], 0, 0, 100, 1);
        assert_eq!(score_chunk(&c, &filter), 10 + 10);
    }

    #[test]
    fn test_cycle_overlap_is_exact_not_substring() {
        let filter = RetrievalFilter::new("math", "fractions").with_cycles(["c1"]);
        let c = chunk("a", &["c10"], 0, 0, 100, 1);
        assert_eq!(score_chunk(&c, &filter), 10);
    }

    #[test]
    fn test_breadth_caps() {
        let filter = RetrievalFilter::new("math", "fractions");
        assert_eq!(score_chunk(&chunk("a", &[], 2, 1, 100, 1), &filter), 10 + 4 + 2);
        assert_eq!(score_chunk(&chunk("a", &[], 9, 9, 100, 1), &filter), 10 + 10 + 8);
    }

    #[test]
    fn test_large_chunk_penalty() {
        let filter = RetrievalFilter::new("math", "fractions");
        assert_eq!(score_chunk(&chunk("a", &[], 0, 0, 1000, 1), &filter), 10);
        assert_eq!(score_chunk(&chunk("a", &[], 0, 0, 1001, 1), &filter), 7);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let filter = RetrievalFilter::new("math", "fractions");
        let ranked = rank_chunks(
            vec![
                chunk("first", &[], 0, 0, 100, 1),
                chunk("lead", &[], 0, 0, 100, 0),
                chunk("second", &[], 0, 0, 100, 1),
            ],
            &filter,
        );
        let ids: Vec<&str> = ranked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["lead", "first", "second"]);
        assert_eq!(ranked[0].relevance_score, 12);
    }
}
