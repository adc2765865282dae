//! Corpus building: split source documents into chunk rows.
//!
//! Splitting happens on paragraph boundaries (`\n\n`) so every chunk stays
//! coherent. A paragraph larger than the target is hard-split at the last
//! newline or space before the limit. Each row carries its own token
//! estimate, a contiguous `chunk_index`, and the shared `total_chunks`, and
//! inherits the document's classification and coverage lists.
//!
//! ```rust
//! use corpus_pack_core::chunk::split_text;
//!
//! let pieces = split_text("Hello world.\n\nSecond paragraph.", 700);
//! assert_eq!(pieces.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::store::ChunkRow;
use crate::tokens::{estimate_tokens, CHARS_PER_TOKEN};

/// A whole reference document awaiting chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub source_path: String,
    pub subject_key: String,
    pub topic_key: String,
    #[serde(default)]
    pub cycle_keys: Vec<String>,
    #[serde(default)]
    pub micro_targets: Vec<String>,
    #[serde(default)]
    pub evaluation_focus: Vec<String>,
    pub body: String,
}

impl SourceDocument {
    /// SHA-256 over every field that affects the stored rows.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        for part in [&self.source_path, &self.subject_key, &self.topic_key] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        for list in [&self.cycle_keys, &self.micro_targets, &self.evaluation_focus] {
            for item in list {
                hasher.update(item.as_bytes());
                hasher.update([0u8]);
            }
            hasher.update([1u8]);
        }
        hasher.update(self.body.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Split `text` into pieces of at most `max_tokens` (estimated).
///
/// Empty or whitespace-only text yields no pieces.
pub fn split_text(text: &str, max_tokens: usize) -> Vec<String> {
    let max_chars = max_tokens.max(1) * CHARS_PER_TOKEN;
    let mut pieces = Vec::new();
    let mut buf = String::new();

    for para in text.split("\n\n") {
        let trimmed = para.trim();
        if trimmed.is_empty() {
            continue;
        }

        let para_chars = trimmed.chars().count();
        let would_be = if buf.is_empty() {
            para_chars
        } else {
            buf.chars().count() + 2 + para_chars
        };

        if would_be > max_chars && !buf.is_empty() {
            pieces.push(std::mem::take(&mut buf));
        }

        if para_chars > max_chars {
            hard_split(trimmed, max_chars, &mut pieces);
        } else {
            if !buf.is_empty() {
                buf.push_str("\n\n");
            }
            buf.push_str(trimmed);
        }
    }

    if !buf.is_empty() {
        pieces.push(buf);
    }
    pieces
}

/// Break an oversized paragraph at newline/space boundaries.
fn hard_split(paragraph: &str, max_chars: usize, pieces: &mut Vec<String>) {
    let mut remaining = paragraph;
    while !remaining.is_empty() {
        let limit = byte_offset_of_char(remaining, max_chars);
        let split_at = if limit < remaining.len() {
            remaining[..limit]
                .rfind(['\n', ' '])
                .map(|pos| pos + 1)
                .unwrap_or(limit)
        } else {
            limit
        };
        let piece = remaining[..split_at].trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
        remaining = &remaining[split_at..];
    }
}

/// Byte offset of the `n`th char, or the string length.
fn byte_offset_of_char(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}

/// Chunk a document into rows ready for the corpus store.
///
/// A document with an empty body still produces one (empty) row so that
/// its metadata remains discoverable.
pub fn chunk_document(doc: &SourceDocument, max_tokens: usize) -> Vec<ChunkRow> {
    let mut pieces = split_text(&doc.body, max_tokens);
    if pieces.is_empty() {
        pieces.push(String::new());
    }

    let total = pieces.len() as i64;
    let cycle_keys_json = encode_list(&doc.cycle_keys);
    let micro_targets_json = encode_list(&doc.micro_targets);
    let evaluation_focus_json = encode_list(&doc.evaluation_focus);

    pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| ChunkRow {
            id: Uuid::new_v4().to_string(),
            source_path: doc.source_path.clone(),
            subject_key: doc.subject_key.clone(),
            topic_key: doc.topic_key.clone(),
            cycle_keys_json: cycle_keys_json.clone(),
            micro_targets_json: micro_targets_json.clone(),
            evaluation_focus_json: evaluation_focus_json.clone(),
            token_count: estimate_tokens(&text) as i64,
            text,
            chunk_index: index as i64,
            total_chunks: total,
        })
        .collect()
}

fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> SourceDocument {
        SourceDocument {
            source_path: "fractions/intro.md".to_string(),
            subject_key: "math".to_string(),
            topic_key: "fractions".to_string(),
            cycle_keys: vec!["c3".to_string()],
            micro_targets: vec!["compare".to_string()],
            evaluation_focus: vec![],
            body: body.to_string(),
        }
    }

    #[test]
    fn test_small_text_single_piece() {
        assert_eq!(split_text("Hello, world!", 700), vec!["Hello, world!"]);
    }

    #[test]
    fn test_empty_text_no_pieces() {
        assert!(split_text("", 700).is_empty());
        assert!(split_text("\n\n  \n\n", 700).is_empty());
    }

    #[test]
    fn test_paragraphs_grouped_under_limit() {
        let pieces = split_text("First.\n\nSecond.\n\nThird.", 700);
        assert_eq!(pieces, vec!["First.\n\nSecond.\n\nThird."]);
    }

    #[test]
    fn test_paragraphs_split_over_limit() {
        let text = "This is paragraph one.\n\nThis is paragraph two.\n\nThis is paragraph three.";
        let pieces = split_text(text, 6);
        assert!(pieces.len() > 1);
        for p in &pieces {
            assert!(estimate_tokens(p) <= 6, "piece too large: {:?}", p);
        }
    }

    #[test]
    fn test_hard_split_multibyte() {
        let text = "┌──────────────────┐\n│ Hello world      │\n└──────────────────┘";
        let pieces = split_text(text, 3);
        assert!(!pieces.is_empty());
        for p in &pieces {
            assert!(p.chars().count() <= 12);
        }
    }

    #[test]
    fn test_chunk_document_positions_and_metadata() {
        let body = (0..40)
            .map(|i| format!("Paragraph number {} about fractions.", i))
            .collect::<Vec<_>>()
            .join("\n\n");
        let rows = chunk_document(&doc(&body), 50);
        assert!(rows.len() > 1);
        for (i, r) in rows.iter().enumerate() {
            assert_eq!(r.chunk_index, i as i64);
            assert_eq!(r.total_chunks, rows.len() as i64);
            assert_eq!(r.token_count, estimate_tokens(&r.text) as i64);
            assert_eq!(r.cycle_keys_json, r#"["c3"]"#);
            assert_eq!(r.evaluation_focus_json, "[]");
        }
        let decoded = rows[0].clone().decode().unwrap();
        assert_eq!(decoded.micro_targets, vec!["compare"]);
    }

    #[test]
    fn test_empty_body_one_row() {
        let rows = chunk_document(&doc(""), 700);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_chunks, 1);
        assert_eq!(rows[0].token_count, 0);
    }

    #[test]
    fn test_content_hash_tracks_metadata() {
        let a = doc("body");
        let mut b = doc("body");
        assert_eq!(a.content_hash(), b.content_hash());
        b.micro_targets.push("order".to_string());
        assert_ne!(a.content_hash(), b.content_hash());
    }
}
