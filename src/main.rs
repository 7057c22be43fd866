//! # Regdraft CLI (`regdraft`)
//!
//! The `regdraft` binary exposes the retrieval pipeline for inspection
//! and batch document generation.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `regdraft chunks <paths>...` | Load and chunk documents, print chunk metadata |
//! | `regdraft query "<query>"` | Retrieve relevant chunks with citations |
//! | `regdraft generate` | Generate a full document from a template |
//!
//! ## Examples
//!
//! ```bash
//! # Inspect how a source directory chunks
//! regdraft chunks ./sources/
//!
//! # Retrieve with citations against two files
//! regdraft query "stability data" -f spec.pdf -f protocol.docx --top-k 5
//!
//! # Generate a document from a JSON template
//! regdraft generate -t module3.json -f ./sources/ --session review-1
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use regdraft::assembly;
use regdraft::chunker::split_pages;
use regdraft::config::{self, Config};
use regdraft::loader::load_documents;
use regdraft::retriever::RetrievalMode;
use regdraft::service::RagService;
use regdraft::synthesize::ExtractiveSynthesizer;

/// Regdraft CLI — retrieval and citation engine for regulatory
/// document drafting.
///
/// All commands accept a `--config` flag pointing to a TOML
/// configuration file; when the file is absent, built-in defaults are
/// used (with embedding disabled).
#[derive(Parser)]
#[command(
    name = "regdraft",
    about = "Retrieval and citation engine for regulatory document drafting",
    version,
    long_about = "Regdraft loads PDF, DOCX, and plain-text sources, chunks and embeds them, \
    and serves diversity-aware retrieval with traceable citations. Templates drive \
    section-by-section document generation with a deduplicated reference list."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Embedding provider, chunking, and retrieval settings are read
    /// from this file. Missing file falls back to defaults.
    #[arg(long, global = true, default_value = "./regdraft.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Load and chunk documents, printing chunk metadata.
    ///
    /// Does not require an embedding provider. Useful for checking how
    /// a source set splits before running retrieval.
    Chunks {
        /// Files or directories to load. Directories are walked recursively.
        paths: Vec<String>,
    },

    /// Retrieve relevant chunks for a query, with citations.
    Query {
        /// The retrieval query string.
        query: String,

        /// Files or directories to retrieve against. Directories are
        /// walked recursively.
        #[arg(short, long = "file", required = true)]
        files: Vec<String>,

        /// Number of results to return.
        #[arg(long, default_value_t = 5)]
        top_k: usize,

        /// Retrieval mode: `local` (chunk-level) or `global` (reserved,
        /// currently behaves as `local`).
        #[arg(long, default_value = "local")]
        mode: String,
    },

    /// Generate a document from a template's table of contents.
    ///
    /// Each TOC entry becomes a section synthesized from the retrieved
    /// chunks for its title; a "References" section with the
    /// deduplicated citation union is appended. Prints the generated
    /// document as JSON.
    Generate {
        /// Template file (JSON or TOML, selected by extension).
        #[arg(short, long)]
        template: PathBuf,

        /// Files or directories to retrieve against.
        #[arg(short, long = "file", required = true)]
        files: Vec<String>,

        /// Session identifier recorded on the generated document.
        #[arg(long, default_value = "default")]
        session: String,

        /// Number of chunks retrieved per section.
        #[arg(long, default_value_t = 20)]
        top_k: usize,
    },
}

/// Expand files and directories into a flat file list. Directories are
/// walked recursively; unreadable entries are skipped with a warning.
fn expand_paths(paths: &[String]) -> Vec<String> {
    let mut files = Vec::new();
    for path in paths {
        let p = Path::new(path);
        if p.is_dir() {
            for entry in walkdir::WalkDir::new(p)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() {
                    files.push(entry.path().display().to_string());
                }
            }
        } else {
            files.push(path.clone());
        }
    }
    files
}

fn load_config_or_default(path: &Path) -> Config {
    config::load_config(path).unwrap_or_else(|_| Config::minimal())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("regdraft=info")
        }))
        .init();

    let cli = Cli::parse();
    let cfg = load_config_or_default(&cli.config);

    match cli.command {
        Commands::Chunks { paths } => {
            let files = expand_paths(&paths);
            if files.is_empty() {
                bail!("No input files. Pass one or more files or directories.");
            }
            let pages = load_documents(&files);
            let chunks = split_pages(&pages, &cfg.chunking);
            println!(
                "{} file(s), {} page(s), {} chunk(s)",
                files.len(),
                pages.len(),
                chunks.len()
            );
            for chunk in &chunks {
                println!(
                    "  {} [{} words] {}",
                    chunk.chunk_id, chunk.word_count, chunk.content_preview
                );
            }
        }

        Commands::Query {
            query,
            files,
            top_k,
            mode,
        } => {
            let files = expand_paths(&files);
            if files.is_empty() {
                bail!("No input files. Pass one or more files or directories with --file.");
            }
            let mode: RetrievalMode = mode.parse()?;
            let service = RagService::new(&cfg, files).await?;
            let output = service.retrieve_for_query(&query, top_k, mode).await;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Generate {
            template,
            files,
            session,
            top_k,
        } => {
            let files = expand_paths(&files);
            if files.is_empty() {
                bail!("No input files. Pass one or more files or directories with --file.");
            }
            let template = assembly::load_template(&template)?;
            let service = RagService::new(&cfg, files).await?;
            let synthesizer = ExtractiveSynthesizer;
            let document = assembly::generate_document(
                &service,
                &synthesizer,
                &template,
                &session,
                top_k,
                RetrievalMode::Local,
            )
            .await;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }

    Ok(())
}
