//! Sliding-window text chunker.
//!
//! Splits loaded [`Page`]s into overlapping fixed-size [`Chunk`]s and
//! stamps each with its citation metadata: a deterministic chunk id of
//! the form `{document_id}_p{page_number}_c{chunk_index}`, a content
//! preview, a word count, and a SHA-256 content hash.
//!
//! Window boundaries prefer a newline or space in the back half of the
//! window so chunks tend to end on word boundaries. Every chunk after
//! the first on a page begins with the trailing `chunk_overlap`
//! characters of the one before it.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::config::ChunkingConfig;
use crate::models::{Chunk, Page};

/// Characters of content kept in `content_preview`.
const PREVIEW_CHARS: usize = 100;

/// Split pages into chunks. Chunk indices count per document, in page
/// order, starting at 0. Whitespace-only windows are dropped before
/// they are assigned an index. Zero pages yields zero chunks.
pub fn split_pages(pages: &[Page], config: &ChunkingConfig) -> Vec<Chunk> {
    let size = config.chunk_size.max(2);
    // Overlap must leave room for forward progress.
    let overlap = config.chunk_overlap.min(size / 2 - 1);

    let mut chunks = Vec::new();
    let mut doc_counters: HashMap<String, usize> = HashMap::new();

    for page in pages {
        for window in split_text(&page.text, size, overlap) {
            if window.trim().is_empty() {
                continue;
            }
            let counter = doc_counters.entry(page.document_id.clone()).or_insert(0);
            let chunk_index = *counter;
            *counter += 1;
            chunks.push(make_chunk(page, window, chunk_index));
        }
    }

    chunks
}

/// Slide a window of `size` characters with `overlap` carry-over across
/// the text. Returns borrowed windows in order.
fn split_text(text: &str, size: usize, overlap: usize) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }

    let len = text.len();
    let mut windows = Vec::new();
    let mut start = 0usize;

    loop {
        let hard_end = floor_char_boundary(text, (start + size).min(len));
        let window = &text[start..hard_end];

        // Prefer ending on a newline or space, but keep at least half a window.
        let end = if hard_end < len {
            window
                .rfind('\n')
                .or_else(|| window.rfind(' '))
                .filter(|&p| p > size / 2)
                .map(|p| start + p + 1)
                .unwrap_or(hard_end)
        } else {
            hard_end
        };

        windows.push(&text[start..end]);

        if end >= len {
            break;
        }
        let next = floor_char_boundary(text, end.saturating_sub(overlap));
        // Hard guarantee of forward progress on degenerate inputs.
        start = if next > start { next } else { end };
    }

    windows
}

fn make_chunk(page: &Page, content: &str, chunk_index: usize) -> Chunk {
    let chunk_id = format!(
        "{}_p{}_c{}",
        page.document_id, page.page_number, chunk_index
    );

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Chunk {
        content: content.to_string(),
        document_id: page.document_id.clone(),
        source: page.source.clone(),
        page_number: page.page_number,
        chunk_index,
        chunk_id,
        content_preview: preview_of(content),
        word_count: content.split_whitespace().count(),
        hash,
    }
}

/// First [`PREVIEW_CHARS`] characters, with an ellipsis when truncated.
fn preview_of(content: &str) -> String {
    let mut preview: String = content.chars().take(PREVIEW_CHARS).collect();
    if content.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}
