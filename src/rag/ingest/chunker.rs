//! Paragraph chunking for uploaded document text.

use regex::Regex;

use crate::rag::core::config::ChunkingConfig;
use crate::rag::core::errors::{RagError, RagResult};

/// Split document text into chunks.
///
/// Paragraph boundaries are blank lines. Fragments shorter than
/// `min_chunk_chars` are dropped; paragraphs longer than `max_chunk_chars`
/// are split greedily at whitespace.
///
/// # Errors
/// Returns an error if the paragraph pattern fails to compile.
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> RagResult<Vec<String>> {
    let boundary = Regex::new(r"\r?\n[ \t]*\r?\n")
        .map_err(|err| RagError::InvalidConfig(format!("invalid regex: {err}")))?;

    let mut chunks = Vec::new();
    for paragraph in boundary.split(text) {
        let paragraph = paragraph.trim();
        if paragraph.chars().count() < config.min_chunk_chars || paragraph.is_empty() {
            continue;
        }
        for piece in split_long(paragraph, config.max_chunk_chars) {
            if piece.chars().count() >= config.min_chunk_chars {
                chunks.push(piece);
            }
        }
    }
    Ok(chunks)
}

/// Greedy word-packing split for over-long paragraphs. A single word longer
/// than the budget is kept whole rather than cut mid-word.
fn split_long(paragraph: &str, max_chars: usize) -> Vec<String> {
    if paragraph.chars().count() <= max_chars {
        return vec![paragraph.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    for word in paragraph.split_whitespace() {
        let would_be = current.chars().count() + 1 + word.chars().count();
        if !current.is_empty() && would_be > max_chars {
            pieces.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
