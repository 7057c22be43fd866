//! # Regdraft
//!
//! A retrieval and citation pipeline for drafting regulatory documents
//! from source material.
//!
//! Regdraft loads PDF, DOCX, and plain-text sources, splits them into
//! overlapping chunks, embeds them with a remote provider, and serves
//! diversity-aware retrieval with traceable citations. A template's
//! table of contents drives section-by-section document assembly, with
//! a deduplicated reference list appended at the end.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────────┐
//! │  Loader  │──▶│ Chunker  │──▶│  VectorIndex   │
//! │ PDF/DOCX │   │ overlap  │   │ embed + cosine │
//! └──────────┘   └──────────┘   └───────┬───────┘
//!                                       │ MMR
//!                      ┌────────────────┤
//!                      ▼                ▼
//!                ┌──────────┐     ┌──────────┐
//!                │ Service  │────▶│ Assembly │
//!                │ + cites  │     │ TOC walk │
//!                └──────────┘     └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! regdraft chunks ./sources/                    # inspect chunking
//! regdraft query "stability data" -f spec.pdf   # retrieve with citations
//! regdraft generate -t module3.json -f ./sources/ --session review-1
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`loader`] | PDF/DOCX/text extraction into pages |
//! | [`chunker`] | Overlapping text chunking |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`index`] | In-memory vector index |
//! | [`retriever`] | MMR diversity-aware retrieval |
//! | [`citations`] | Citation construction and deduplication |
//! | [`service`] | Session-scoped retrieval service |
//! | [`synthesize`] | Section synthesis boundary |
//! | [`assembly`] | Template-driven document assembly |

pub mod assembly;
pub mod chunker;
pub mod citations;
pub mod config;
pub mod embedding;
pub mod index;
pub mod loader;
pub mod models;
pub mod retriever;
pub mod service;
pub mod synthesize;
