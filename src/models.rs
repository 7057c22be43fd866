//! Core data models used throughout regdraft.
//!
//! These types represent the pages, chunks, and citations that flow
//! through the loading, retrieval, and assembly pipeline, plus the
//! template and generated-document shapes exchanged with callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One page of text extracted from a source document, before chunking.
///
/// Page order within a document is loader-defined and preserved.
#[derive(Debug, Clone)]
pub struct Page {
    /// Raw extracted text.
    pub text: String,
    /// 1-based page number; sequential index when the format has no pages.
    pub page_number: u32,
    /// Document identity: source filename with its extension stripped.
    pub document_id: String,
    /// Basename of the originating file.
    pub source: String,
    /// Full path the file was loaded from.
    pub file_path: String,
}

/// A chunk of page text with citation metadata attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text.
    pub content: String,
    /// Document the chunk was split from.
    pub document_id: String,
    /// Basename of the originating file.
    pub source: String,
    /// Page the chunk starts on.
    pub page_number: u32,
    /// Position within the document's chunk sequence, starting at 0.
    pub chunk_index: usize,
    /// `{document_id}_p{page_number}_c{chunk_index}` — unique per index build.
    pub chunk_id: String,
    /// First 100 characters of content, with a trailing ellipsis if truncated.
    pub content_preview: String,
    /// Whitespace-separated word count.
    pub word_count: usize,
    /// SHA-256 of the content; identical texts share one embedding.
    pub hash: String,
}

/// A traceable citation record that generated text references by `[id]`.
///
/// Identity is `chunk_id` (content-addressed); `id` is a presentation
/// sequence number recomputed at each aggregation boundary. The full
/// chunk text is carried under the canonical name `text`; `content` is
/// accepted as an alias when deserializing boundary payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    /// 1-based sequence number, local to one retrieval call or reference list.
    pub id: u32,
    /// Basename of the originating file.
    pub source: String,
    /// Page number in the source document.
    pub page: u32,
    /// Identity key for deduplication.
    pub chunk_id: String,
    /// Short excerpt for display.
    pub preview: String,
    /// Full chunk text.
    #[serde(alias = "content")]
    pub text: String,
}

/// Result of one retrieval call: ranked chunks plus their citations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalOutput {
    pub chunks: Vec<Chunk>,
    pub citations: Vec<Citation>,
}

impl RetrievalOutput {
    /// The degraded result used for empty corpora and provider failures.
    pub fn empty() -> Self {
        Self {
            chunks: Vec::new(),
            citations: Vec::new(),
        }
    }
}

/// A synthesized document section with its local citation list.
///
/// Inline `[n]` markers in `content` refer to ids in `citations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedSection {
    #[serde(default = "new_uuid")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub source_count: usize,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// A fully assembled document in table-of-contents order, optionally
/// terminated by a synthetic "References" section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDocument {
    #[serde(default = "new_uuid")]
    pub id: String,
    pub title: String,
    pub template_id: String,
    pub session_id: String,
    pub sections: Vec<GeneratedSection>,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

/// One entry in a template's table of contents. Children are generated
/// after their parent, depth-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TocItem {
    #[serde(default = "new_uuid")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub children: Vec<TocItem>,
}

/// A document template: a named table of contents to generate against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    #[serde(default = "new_uuid")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub toc: Vec<TocItem>,
}

fn new_uuid() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_citation_content_alias() {
        let json = r#"{"id":1,"source":"a.pdf","page":2,"chunk_id":"a_p2_c0","preview":"x","content":"full text"}"#;
        let c: Citation = serde_json::from_str(json).unwrap();
        assert_eq!(c.text, "full text");
    }

    #[test]
    fn test_citation_serializes_text_field() {
        let c = Citation {
            id: 1,
            source: "a.pdf".to_string(),
            page: 1,
            chunk_id: "a_p1_c0".to_string(),
            preview: "p".to_string(),
            text: "t".to_string(),
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["text"], "t");
        assert!(json.get("content").is_none());
    }

    #[test]
    fn test_template_from_json_defaults() {
        let json = r#"{"name":"Module 3","toc":[{"title":"3.2.S Drug Substance","children":[{"title":"3.2.S.1 General Information"}]}]}"#;
        let t: Template = serde_json::from_str(json).unwrap();
        assert_eq!(t.toc.len(), 1);
        assert_eq!(t.toc[0].children.len(), 1);
        assert!(!t.id.is_empty());
    }
}
