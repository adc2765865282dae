//! Render a [`RetrievedKnowledge`] into one text block for a generation prompt.
//!
//! Output shape (sections with empty lists are omitted):
//!
//! ```text
//! ## Reference Knowledge
//!
//! Coverage: 3 chunks, 1976 tokens, 100% of matching content
//!
//! Micro-targets covered:
//! - compare fractions
//!
//! Evaluation focus:
//! - reasoning
//!
//! ### Source: fractions/intro.md (part 1/3)
//!
//! ...chunk text...
//! ```
//!
//! The format is meant to be stable rather than parseable.

use std::fmt::Write;

use crate::models::RetrievedKnowledge;

/// Format the knowledge block. An empty selection still yields the header
/// and coverage line.
pub fn format_knowledge_context(knowledge: &RetrievedKnowledge) -> String {
    let mut out = String::new();

    out.push_str("## Reference Knowledge\n\n");
    let _ = writeln!(
        out,
        "Coverage: {} chunk{}, {} tokens, {:.0}% of matching content",
        knowledge.chunks.len(),
        if knowledge.chunks.len() == 1 { "" } else { "s" },
        knowledge.total_tokens,
        knowledge.compression_ratio * 100.0
    );

    let coverage = &knowledge.coverage_stats;
    if !coverage.micro_targets.is_empty() {
        out.push_str("\nMicro-targets covered:\n");
        for target in &coverage.micro_targets {
            let _ = writeln!(out, "- {}", target);
        }
    }
    if !coverage.evaluation_focus.is_empty() {
        out.push_str("\nEvaluation focus:\n");
        for focus in &coverage.evaluation_focus {
            let _ = writeln!(out, "- {}", focus);
        }
    }

    for chunk in &knowledge.chunks {
        let _ = write!(
            out,
            "\n### Source: {} (part {}/{})\n\n{}\n",
            chunk.source_path,
            chunk.chunk_index + 1,
            chunk.total_chunks,
            chunk.text
        );
    }

    out
}
