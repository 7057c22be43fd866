//! Multi-format document loading.
//!
//! Selects an extraction path by file extension (`.pdf`, `.txt`/`.md`,
//! `.doc`/`.docx`; anything else is decoded as plain text) and returns
//! ordered [`Page`] records with provenance metadata. A file that fails
//! to load is logged and skipped; the overall load never aborts because
//! one file is unreadable.

use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Result};
use tracing::{debug, warn};

use crate::models::Page;

/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Load every readable file into pages. Unreadable files are skipped
/// with a warning; zero successes yields an empty result, not an error.
pub fn load_documents(paths: &[String]) -> Vec<Page> {
    let mut all_pages = Vec::new();

    for path in paths {
        match load_file(Path::new(path)) {
            Ok(pages) => {
                debug!(
                    source = %basename(path),
                    pages = pages.len(),
                    "loaded document"
                );
                all_pages.extend(pages);
            }
            Err(e) => {
                warn!(file = %path, error = %e, "could not load file, skipping");
            }
        }
    }

    if all_pages.is_empty() {
        warn!("no documents were successfully loaded");
    }
    all_pages
}

/// Load a single file into ordered pages.
pub fn load_file(path: &Path) -> Result<Vec<Page>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let page_texts = match extension.as_str() {
        "pdf" => extract_pdf_pages(path)?,
        "txt" | "md" => vec![read_text(path)?],
        "doc" | "docx" => vec![extract_docx(path)?],
        other => {
            // Fall back to plain-text decoding for unknown extensions.
            debug!(extension = %other, file = %path.display(), "unknown file type, trying as text");
            vec![read_text(path)?]
        }
    };

    let document_id = document_id_for(path);
    let source = basename(&path.to_string_lossy());
    let file_path = path.to_string_lossy().into_owned();

    Ok(page_texts
        .into_iter()
        .enumerate()
        .map(|(idx, text)| Page {
            text,
            page_number: (idx + 1) as u32,
            document_id: document_id.clone(),
            source: source.clone(),
            file_path: file_path.clone(),
        })
        .collect())
}

/// Document identity: basename with the extension stripped.
pub fn document_id_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| anyhow!("file is not valid UTF-8: {}", path.display()))
}

/// Extract PDF text, split into pages on form feeds when the extractor
/// emits them. A PDF without page breaks loads as a single page.
fn extract_pdf_pages(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path)?;
    let text = pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| anyhow!("PDF extraction failed: {}", e))?;

    let pages: Vec<String> = text
        .split('\u{c}')
        .map(|p| p.to_string())
        .filter(|p| !p.trim().is_empty())
        .collect();

    if pages.is_empty() {
        Ok(vec![text])
    } else {
        Ok(pages)
    }
}

/// Extract text from a Word document: `word/document.xml` `w:t` runs.
fn extract_docx(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.as_slice()))
        .map_err(|e| anyhow!("not a valid Word archive: {}", e))?;

    let mut doc_xml = Vec::new();
    {
        let entry = archive
            .by_name("word/document.xml")
            .map_err(|_| anyhow!("word/document.xml not found"))?;
        entry
            .take(MAX_XML_ENTRY_BYTES)
            .read_to_end(&mut doc_xml)
            .map_err(|e| anyhow!("failed to read word/document.xml: {}", e))?;
        if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
            return Err(anyhow!("word/document.xml exceeds size limit"));
        }
    }

    extract_w_t_elements(&doc_xml)
}

fn extract_w_t_elements(xml: &[u8]) -> Result<String> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    if let Ok(quick_xml::events::Event::Text(te)) = reader.read_event_into(&mut buf)
                    {
                        if !out.is_empty() {
                            out.push(' ');
                        }
                        out.push_str(te.unescape().unwrap_or_default().as_ref());
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(anyhow!("OOXML parse error: {}", e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}
