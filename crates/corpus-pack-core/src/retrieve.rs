//! Retrieval pipeline: query → score → pack (→ truncate) → coverage.
//!
//! Operates entirely through the [`CorpusStore`] trait. Only the query stage
//! can fail; everything after it is pure.

use tracing::{debug, info};

use crate::coverage::aggregate_coverage;
use crate::error::RetrievalError;
use crate::models::{RetrievalFilter, RetrievedKnowledge};
use crate::pack::pack_chunks;
use crate::score::rank_chunks;
use crate::store::CorpusStore;
use crate::tokens::TokenEstimator;

/// Run one retrieval call against `store`.
///
/// An empty match set is a valid, empty result with a compression ratio
/// of `0.0`. When `filter.min_relevance_score` is set, chunks scoring below
/// it are dropped before packing; the ratio's denominator still counts
/// every matching chunk.
pub async fn retrieve<S: CorpusStore + ?Sized>(
    store: &S,
    filter: &RetrievalFilter,
    estimator: &dyn TokenEstimator,
) -> Result<RetrievedKnowledge, RetrievalError> {
    let matching = store.query_chunks(filter).await?;
    let all_matching = matching.len();
    debug!(
        subject = %filter.subject_key,
        topic = %filter.topic_key,
        matching = all_matching,
        "corpus query complete"
    );

    if all_matching == 0 {
        return Ok(RetrievedKnowledge::default());
    }

    let mut ranked = rank_chunks(matching, filter);
    if let Some(min) = filter.min_relevance_score {
        ranked.retain(|c| c.relevance_score >= min);
        debug!(min_score = min, kept = ranked.len(), "relevance floor applied");
    }

    let packed = pack_chunks(ranked, filter.max_tokens, estimator);
    let coverage_stats = aggregate_coverage(&packed.selected);
    let compression_ratio = packed.selected.len() as f64 / all_matching as f64;

    info!(
        selected = packed.selected.len(),
        matching = all_matching,
        total_tokens = packed.total_tokens,
        max_tokens = filter.max_tokens,
        "knowledge retrieved"
    );

    Ok(RetrievedKnowledge {
        chunks: packed.selected,
        total_tokens: packed.total_tokens,
        compression_ratio,
        coverage_stats,
    })
}
