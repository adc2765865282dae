//! Coverage aggregation over the final selection.

use std::collections::HashSet;

use crate::models::{CoverageStats, KnowledgeChunk};

/// Distinct sources plus de-duplicated unions of micro-targets and
/// evaluation focus, in first-seen order.
pub fn aggregate_coverage(chunks: &[KnowledgeChunk]) -> CoverageStats {
    let sources: HashSet<&str> = chunks.iter().map(|c| c.source_path.as_str()).collect();

    CoverageStats {
        sources_represented: sources.len(),
        micro_targets: union_in_order(chunks.iter().map(|c| &c.micro_targets)),
        evaluation_focus: union_in_order(chunks.iter().map(|c| &c.evaluation_focus)),
    }
}

fn union_in_order<'a>(lists: impl Iterator<Item = &'a Vec<String>>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for label in lists.flatten() {
        if seen.insert(label.as_str()) {
            out.push(label.clone());
        }
    }
    out
}
