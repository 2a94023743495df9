// System status display: database size, document counts, pipeline settings.

use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;

/// Display system status to the terminal.
pub async fn show(db: &Arc<dyn Database>, config: &Config) -> Result<()> {
    let db_path = config.db_path.as_str();

    // Database file size
    let file_size = std::fs::metadata(db_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_path, file_size);
    println!("Uploads: {}", config.upload_dir.display());

    let total = db.document_count().await?;
    if total == 0 {
        println!("Documents: none yet");
        println!("  Run `docsift ingest <file>` to add one");
    } else {
        println!("Documents: {}", total);
        for (language, count) in db.language_breakdown().await? {
            let label = if language.is_empty() { "unknown" } else { language.as_str() };
            println!("  {:<8} {}", label, count);
        }
    }

    println!(
        "Pipeline: {:?} extraction, OCR {}, {:?} keywords",
        config.extraction_mode,
        if config.ocr_enabled { "on" } else { "off" },
        config.keyword_backend,
    );
    if let Some(timeout) = config.extract_timeout {
        println!("  Extraction timeout: {}s", timeout.as_secs());
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
