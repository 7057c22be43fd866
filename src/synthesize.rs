//! Section-synthesizer boundary.
//!
//! Turning retrieved chunks into prose is an external collaborator's
//! job (an LLM in the reference deployment). The core only defines the
//! seam — [`SectionSynthesizer`] — and ships one network-free
//! implementation, [`ExtractiveSynthesizer`], which stitches the
//! retrieved excerpts with inline `[n]` markers so the assembly
//! pipeline works end to end without a model.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Chunk, Citation, GeneratedSection};

/// Consumes retrieval output for one section title and produces a
/// section whose inline `[n]` markers refer to ids in `citations`.
#[async_trait]
pub trait SectionSynthesizer: Send + Sync {
    async fn synthesize_section(
        &self,
        title: &str,
        chunks: &[Chunk],
        citations: &[Citation],
    ) -> Result<GeneratedSection>;
}

/// Characters of each excerpt carried into the section body.
const EXCERPT_CHARS: usize = 400;

/// Fallback content, matching the drafting tool's empty-retrieval message.
const NO_CONTENT_FALLBACK: &str = "No relevant information was found in the provided documents \
for this section. Please ensure that source documents containing information about this topic \
are uploaded, or consider providing additional documentation that covers the required \
regulatory aspects.";

/// Marker-annotated excerpt stitching; no model call.
pub struct ExtractiveSynthesizer;

#[async_trait]
impl SectionSynthesizer for ExtractiveSynthesizer {
    async fn synthesize_section(
        &self,
        title: &str,
        chunks: &[Chunk],
        citations: &[Citation],
    ) -> Result<GeneratedSection> {
        if chunks.is_empty() {
            return Ok(GeneratedSection {
                id: uuid::Uuid::new_v4().to_string(),
                title: title.to_string(),
                content: NO_CONTENT_FALLBACK.to_string(),
                source_count: 0,
                citations: Vec::new(),
            });
        }

        let paragraphs: Vec<String> = chunks
            .iter()
            .zip(citations.iter())
            .map(|(chunk, citation)| format!("{} [{}]", excerpt_of(&chunk.content), citation.id))
            .collect();

        Ok(GeneratedSection {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: paragraphs.join("\n\n"),
            source_count: chunks.len(),
            citations: citations.to_vec(),
        })
    }
}

/// First [`EXCERPT_CHARS`] characters, cut back to a word boundary.
fn excerpt_of(content: &str) -> String {
    let trimmed = content.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let cut: String = chars[..EXCERPT_CHARS].iter().collect();
    match cut.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => format!("{}...", cut[..pos].trim_end()),
        _ => format!("{}...", cut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(chunk_id: &str, content: &str) -> Chunk {
        Chunk {
            content: content.to_string(),
            document_id: "doc".to_string(),
            source: "doc.txt".to_string(),
            page_number: 1,
            chunk_index: 0,
            chunk_id: chunk_id.to_string(),
            content_preview: content.chars().take(100).collect(),
            word_count: content.split_whitespace().count(),
            hash: format!("h-{}", chunk_id),
        }
    }

    fn citation(id: u32, chunk_id: &str, text: &str) -> Citation {
        Citation {
            id,
            source: "doc.txt".to_string(),
            page: 1,
            chunk_id: chunk_id.to_string(),
            preview: text.chars().take(100).collect(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_retrieval_fallback() {
        let section = ExtractiveSynthesizer
            .synthesize_section("3.2.S.1 General Information", &[], &[])
            .await
            .unwrap();
        assert_eq!(section.source_count, 0);
        assert!(section.citations.is_empty());
        assert!(section.content.contains("No relevant information was found"));
    }

    #[tokio::test]
    async fn test_markers_match_citation_ids() {
        let chunks = vec![
            chunk("a_p1_c0", "The assay uses HPLC."),
            chunk("b_p2_c0", "Stability studies run 36 months."),
        ];
        let citations = vec![
            citation(1, "a_p1_c0", "The assay uses HPLC."),
            citation(2, "b_p2_c0", "Stability studies run 36 months."),
        ];
        let section = ExtractiveSynthesizer
            .synthesize_section("Analytical Procedures", &chunks, &citations)
            .await
            .unwrap();
        assert_eq!(section.source_count, 2);
        assert!(section.content.contains("[1]"));
        assert!(section.content.contains("[2]"));
        assert!(section.content.contains("HPLC"));
        assert_eq!(section.citations.len(), 2);
    }

    #[test]
    fn test_excerpt_cuts_on_word_boundary() {
        let long = "word ".repeat(200);
        let excerpt = excerpt_of(&long);
        assert!(excerpt.ends_with("..."));
        assert!(excerpt.len() <= EXCERPT_CHARS + 3);
        assert!(!excerpt.trim_end_matches("...").ends_with("wor"));
    }
}
