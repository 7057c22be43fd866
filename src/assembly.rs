//! Document assembly.
//!
//! Walks a template's table of contents depth-first (parents before
//! children), generates one section per entry strictly sequentially —
//! cross-section citation numbering depends on the order — and appends
//! a trailing "References" section holding the deduplicated union of
//! every section's citations.
//!
//! A failing section is isolated: it becomes a placeholder and the
//! loop continues, so a single provider hiccup cannot abort the whole
//! document.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};
use uuid::Uuid;

use crate::citations::merge_citations;
use crate::models::{GeneratedDocument, GeneratedSection, Template, TocItem};
use crate::retriever::RetrievalMode;
use crate::service::RagService;
use crate::synthesize::SectionSynthesizer;

/// Placeholder expanded by a later rendering stage.
pub const REFERENCES_PLACEHOLDER: &str = "<!-- REFERENCES_PLACEHOLDER -->";

/// Flatten a table of contents depth-first, parents before children.
pub fn flatten_toc(items: &[TocItem]) -> Vec<&TocItem> {
    let mut flat = Vec::new();
    for item in items {
        flat.push(item);
        flat.extend(flatten_toc(&item.children));
    }
    flat
}

/// Generate a full document from a template against the given service.
///
/// Sections are produced in TOC traversal order. Each section's
/// citations keep their call-local ids; the trailing "References"
/// section carries the deduplicated, densely renumbered union and is
/// appended only when at least one citation exists anywhere.
pub async fn generate_document(
    service: &RagService,
    synthesizer: &dyn SectionSynthesizer,
    template: &Template,
    session_id: &str,
    top_k: usize,
    mode: RetrievalMode,
) -> GeneratedDocument {
    let entries = flatten_toc(&template.toc);
    info!(
        sections = entries.len(),
        template = %template.name,
        "generating document"
    );

    let mut sections: Vec<GeneratedSection> = Vec::with_capacity(entries.len() + 1);
    let mut all_citations: Vec<Vec<crate::models::Citation>> = Vec::new();

    for entry in entries {
        let retrieved = service
            .retrieve_for_query(&entry.title, top_k, mode)
            .await;

        let section = match synthesizer
            .synthesize_section(&entry.title, &retrieved.chunks, &retrieved.citations)
            .await
        {
            Ok(section) => section,
            Err(e) => {
                // One failed section must not abort the document.
                warn!(section = %entry.title, error = %e, "section synthesis failed");
                GeneratedSection {
                    id: Uuid::new_v4().to_string(),
                    title: entry.title.clone(),
                    content: format!(
                        "Generation failed for this section ({}). The remaining sections \
                         were generated normally.",
                        e
                    ),
                    source_count: 0,
                    citations: Vec::new(),
                }
            }
        };

        all_citations.push(section.citations.clone());
        sections.push(section);
    }

    let references = merge_citations(all_citations);
    if !references.is_empty() {
        info!(citations = references.len(), "adding references section");
        sections.push(GeneratedSection {
            id: Uuid::new_v4().to_string(),
            title: "References".to_string(),
            content: REFERENCES_PLACEHOLDER.to_string(),
            source_count: 0,
            citations: references,
        });
    }

    GeneratedDocument {
        id: Uuid::new_v4().to_string(),
        title: template.name.clone(),
        template_id: template.id.clone(),
        session_id: session_id.to_string(),
        sections,
        generated_at: chrono::Utc::now(),
    }
}

/// Load a template from a JSON or TOML file, selected by extension.
pub fn load_template(path: &Path) -> Result<Template> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template: {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "toml" => toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML template: {}", path.display())),
        _ => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON template: {}", path.display())),
    }
}
