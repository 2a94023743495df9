use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use docsift::config::Config;
use docsift::db::models::NewDocument;
use docsift::db::Database;
use docsift::extract::{guess_content_type, pdf, ContentKind, ExtractionInput};
use docsift::output::{terminal, DebugReport};
use docsift::pipeline::{reprocess, Pipeline};

/// docsift: pull text and keywords out of uploaded documents.
///
/// Extracts text from PDFs and images (OCR when needed), detects the
/// language, and ranks keyword phrases for search and tagging.
#[derive(Parser)]
#[command(name = "docsift", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database and upload directory
    Init,

    /// Store a file and extract its text and keywords
    Ingest {
        /// The file to ingest (PDF or image)
        file: PathBuf,

        /// MIME type, if the extension doesn't tell (e.g. application/pdf)
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Re-run extraction for stored documents, newest first
    Reprocess {
        /// Only re-process the N most recent documents
        #[arg(long)]
        limit: Option<u32>,

        /// Number of documents to extract in parallel (default: 1)
        #[arg(long, default_value = "1")]
        concurrency: usize,
    },

    /// List stored documents, newest first
    List {
        /// Max documents to show (default: 20)
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Show a document's text preview and keywords
    Show {
        /// Document id
        id: String,
    },

    /// Show a document's keyword percentages
    Stats {
        /// Document id
        id: String,

        /// Print JSON instead of a bar chart
        #[arg(long)]
        json: bool,
    },

    /// Find documents whose name, text or keywords contain a string
    Search {
        /// Case-insensitive substring to look for
        query: String,
    },

    /// Delete a document and its stored file
    Delete {
        /// Document id
        id: String,
    },

    /// Copy a document's stored file out of the upload directory
    Export {
        /// Document id
        id: String,

        /// Destination file, or a directory to copy into
        dest: PathBuf,
    },

    /// Re-extract a document and compare with what is stored
    Debug {
        /// Document id
        id: String,
    },

    /// Show system status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("docsift=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing docsift database...");
            let config = Config::load()?;
            let db = docsift::db::initialize_sqlite(&config.db_path)?;
            std::fs::create_dir_all(&config.upload_dir).with_context(|| {
                format!("Failed to create upload directory {}", config.upload_dir.display())
            })?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("Uploads stored in: {}", config.upload_dir.display());
            println!("\nNext step: docsift ingest <file>");
        }

        Commands::Ingest { file, content_type } => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let pipeline = Arc::new(Pipeline::from_config(&config));
            ingest(&config, &db, &pipeline, &file, content_type.as_deref()).await?;
        }

        Commands::Reprocess { limit, concurrency } => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let pipeline = Arc::new(Pipeline::from_config(&config));
            let summary =
                reprocess::run(&pipeline, &db, limit, concurrency, config.extract_timeout)
                    .await?;

            if summary.skipped > 0 {
                println!(
                    "  {} {} skipped (no stored file)",
                    "-".yellow(),
                    summary.skipped
                );
            }
            if summary.failed > 0 {
                println!(
                    "  {} {} could not be saved (see log)",
                    "!".bright_red(),
                    summary.failed
                );
            }
        }

        Commands::List { limit } => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let documents = db.list_documents(Some(limit)).await?;
            terminal::display_document_list(&documents);
        }

        Commands::Show { id } => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let doc = find_document(&db, &id).await?;
            terminal::display_document_detail(&doc);
        }

        Commands::Stats { id, json } => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let doc = find_document(&db, &id).await?;
            let stats = doc.keyword_set.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                terminal::display_keyword_stats(doc.display_name(), &stats);
            }
        }

        Commands::Search { query } => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let documents = db.search_documents(&query).await?;
            if documents.is_empty() {
                println!("No documents match '{query}'.");
            } else {
                terminal::display_document_list(&documents);
            }
        }

        Commands::Delete { id } => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let doc = find_document(&db, &id).await?;

            // Stored file first, then the row
            if let Some(path) = doc.file_path.as_deref().filter(|p| !p.is_empty()) {
                match std::fs::remove_file(path) {
                    Ok(()) => info!(path, "Removed stored file"),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        warn!(path, "Stored file already gone")
                    }
                    Err(e) => {
                        return Err(e).with_context(|| format!("Failed to remove {path}"));
                    }
                }
            }
            db.delete_document(&doc.id).await?;
            println!("{} Deleted {} ({})", "✓".green(), doc.id, doc.display_name());
        }

        Commands::Export { id, dest } => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let doc = find_document(&db, &id).await?;
            let target = docsift::export::export_document(&doc, &dest)?;
            println!("{} Exported {} to {}", "✓".green(), doc.display_name(), target.display());
        }

        Commands::Debug { id } => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let pipeline = Arc::new(Pipeline::from_config(&config));
            let doc = find_document(&db, &id).await?;

            let fresh_text = match doc.file_path.as_deref().filter(|p| !p.is_empty()) {
                Some(path) => {
                    let input = ExtractionInput::from_path(path, doc.content_type_hint());
                    let worker = Arc::clone(&pipeline);
                    tokio::task::spawn_blocking(move || worker.extractor().extract(&input))
                        .await?
                }
                None => {
                    println!("{}", "Document has no stored file; nothing to re-extract.".yellow());
                    String::new()
                }
            };

            let report = DebugReport::new(&fresh_text, &doc);
            terminal::display_debug_report(&doc, &report);
        }

        Commands::Status => {
            let config = Config::load()?;
            if !Path::new(&config.db_path).exists() {
                println!("Database: not initialized");
                println!("\nRun `docsift init` to set up the database.");
                return Ok(());
            }
            let db = open_database(&config)?;
            docsift::status::show(&db, &config).await?;
        }
    }

    Ok(())
}

/// Copy a file into the upload directory, record it, and run the pipeline.
async fn ingest(
    config: &Config,
    db: &Arc<dyn Database>,
    pipeline: &Arc<Pipeline>,
    source: &Path,
    content_type: Option<&str>,
) -> Result<()> {
    let bytes = std::fs::read(source)
        .with_context(|| format!("Failed to read {}", source.display()))?;

    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("Ingest path has no file name")?;
    let content_type = content_type
        .map(str::to_string)
        .or_else(|| guess_content_type(source).map(str::to_string))
        .unwrap_or_default();

    // Stored copies get a unique prefix so equal names never collide
    std::fs::create_dir_all(&config.upload_dir).with_context(|| {
        format!("Failed to create upload directory {}", config.upload_dir.display())
    })?;
    let stored_path = config
        .upload_dir
        .join(format!("{}-{}", uuid::Uuid::new_v4().simple(), file_name));
    std::fs::write(&stored_path, &bytes)
        .with_context(|| format!("Failed to store {}", stored_path.display()))?;

    let id = db
        .insert_document(&NewDocument {
            file_name: file_name.clone(),
            file_path: Some(stored_path.to_string_lossy().into_owned()),
            content_type: content_type.clone(),
            file_size: Some(bytes.len() as i64),
        })
        .await?;
    info!(id = %id, file_name = %file_name, content_type = %content_type, "Stored document");

    let hint = Some(content_type.as_str()).filter(|ct| !ct.is_empty());
    if ContentKind::classify(hint, Some(stored_path.as_path())).pdf {
        if let Some(title) = pdf::metadata_title(&bytes) {
            db.set_title(&id, &title).await?;
        }
    }

    let input = ExtractionInput::from_bytes(bytes, hint).with_path(&stored_path);
    let result = pipeline.process_bounded(input, config.extract_timeout).await;
    db.save_extraction(&id, &result).await?;

    let doc = db
        .get_document(&id)
        .await?
        .context("Document vanished right after it was stored")?;
    terminal::display_document_detail(&doc);
    Ok(())
}

async fn find_document(
    db: &Arc<dyn Database>,
    id: &str,
) -> Result<docsift::db::models::Document> {
    db.get_document(id)
        .await?
        .with_context(|| format!("No document with id {id}"))
}

fn open_database(config: &Config) -> Result<Arc<dyn Database>> {
    docsift::db::open_sqlite(&config.db_path)
}
