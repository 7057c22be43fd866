//! Citation construction and aggregation.
//!
//! Citations are content-addressed: `chunk_id` is the identity, and
//! `id` is only a presentation-layer sequence number, recomputed at
//! every aggregation boundary (per retrieval call, per section, per
//! document reference list). Both functions here are pure — identical
//! inputs always produce identical outputs.

use std::collections::HashSet;

use crate::models::{Chunk, Citation};

/// Map retrieved chunks to citation records, assigning 1-based ids in
/// input order.
pub fn to_citations(chunks: &[Chunk]) -> Vec<Citation> {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| Citation {
            id: (i + 1) as u32,
            source: chunk.source.clone(),
            page: chunk.page_number,
            chunk_id: chunk.chunk_id.clone(),
            preview: chunk.content_preview.clone(),
            text: chunk.content.clone(),
        })
        .collect()
}

/// Merge citation lists into one deduplicated reference list.
///
/// Deduplicates by `chunk_id` — the first occurrence wins all fields —
/// preserves first-seen order, and renumbers ids densely from 1.
/// Merging an already-deduplicated list returns it unchanged.
pub fn merge_citations<I>(lists: I) -> Vec<Citation>
where
    I: IntoIterator<Item = Vec<Citation>>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<Citation> = Vec::new();

    for list in lists {
        for citation in list {
            if seen.insert(citation.chunk_id.clone()) {
                let id = (merged.len() + 1) as u32;
                merged.push(Citation { id, ..citation });
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(chunk_id: &str, source: &str, page: u32, content: &str) -> Chunk {
        Chunk {
            content: content.to_string(),
            document_id: source.trim_end_matches(".txt").to_string(),
            source: source.to_string(),
            page_number: page,
            chunk_index: 0,
            chunk_id: chunk_id.to_string(),
            content_preview: content.chars().take(100).collect(),
            word_count: content.split_whitespace().count(),
            hash: format!("h-{}", chunk_id),
        }
    }

    fn citation(id: u32, chunk_id: &str) -> Citation {
        Citation {
            id,
            source: "spec.txt".to_string(),
            page: 1,
            chunk_id: chunk_id.to_string(),
            preview: "p".to_string(),
            text: "t".to_string(),
        }
    }

    #[test]
    fn test_to_citations_sequential_ids() {
        let chunks = vec![
            chunk("a_p1_c0", "a.txt", 1, "first"),
            chunk("a_p2_c1", "a.txt", 2, "second"),
            chunk("b_p1_c0", "b.txt", 1, "third"),
        ];
        let citations = to_citations(&chunks);
        assert_eq!(citations.len(), 3);
        assert_eq!(citations[0].id, 1);
        assert_eq!(citations[1].id, 2);
        assert_eq!(citations[2].id, 3);
        assert_eq!(citations[1].page, 2);
        assert_eq!(citations[2].source, "b.txt");
        assert_eq!(citations[0].text, "first");
    }

    #[test]
    fn test_to_citations_empty() {
        assert!(to_citations(&[]).is_empty());
    }

    #[test]
    fn test_merge_collapses_duplicates() {
        let a = citation(1, "x");
        let b = citation(2, "y");
        let merged = merge_citations(vec![vec![a.clone(), a.clone(), b.clone()]]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, 1);
        assert_eq!(merged[0].chunk_id, "x");
        assert_eq!(merged[1].id, 2);
        assert_eq!(merged[1].chunk_id, "y");
    }

    #[test]
    fn test_merge_across_lists_first_seen_order() {
        let list1 = vec![citation(1, "x"), citation(2, "y")];
        let list2 = vec![citation(1, "y"), citation(2, "z")];
        let merged = merge_citations(vec![list1, list2]);
        let ids: Vec<(u32, &str)> = merged.iter().map(|c| (c.id, c.chunk_id.as_str())).collect();
        assert_eq!(ids, vec![(1, "x"), (2, "y"), (3, "z")]);
    }

    #[test]
    fn test_merge_first_occurrence_wins_fields() {
        let mut first = citation(1, "x");
        first.preview = "original preview".to_string();
        let mut dup = citation(7, "x");
        dup.preview = "later preview".to_string();
        let merged = merge_citations(vec![vec![first], vec![dup]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].preview, "original preview");
    }

    #[test]
    fn test_merge_idempotent() {
        let deduped = vec![citation(1, "x"), citation(2, "y"), citation(3, "z")];
        let merged = merge_citations(vec![deduped.clone()]);
        assert_eq!(merged, deduped);
        let merged_again = merge_citations(vec![merged.clone()]);
        assert_eq!(merged_again, merged);
    }

    #[test]
    fn test_merge_renumbers_sparse_ids_densely() {
        // Ids from different sections arrive sparse and overlapping.
        let list1 = vec![citation(3, "x")];
        let list2 = vec![citation(3, "y"), citation(9, "z")];
        let merged = merge_citations(vec![list1, list2]);
        let ids: Vec<u32> = merged.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_citations(Vec::<Vec<Citation>>::new()).is_empty());
        assert!(merge_citations(vec![Vec::new(), Vec::new()]).is_empty());
    }
}
