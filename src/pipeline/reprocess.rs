// Bulk re-processing: re-run extraction for stored documents.
//
// Walks documents newest first, re-extracts each from its stored file and
// overwrites text, language and keywords in one write. Documents with no
// stored file are skipped and reported. One bad document never stops the
// batch.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use super::process::Pipeline;
use crate::db::Database;
use crate::extract::ExtractionInput;

/// Outcome counts for one bulk run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReprocessSummary {
    /// Documents re-extracted and written back
    pub processed: usize,
    /// Documents with no stored file
    pub skipped: usize,
    /// Documents whose result could not be written
    pub failed: usize,
}

/// Re-process up to `limit` documents, newest first.
///
/// `concurrency` is the number of documents extracted at once (1 =
/// strictly sequential). Writes always happen one at a time, each from a
/// single complete run.
pub async fn run(
    pipeline: &Arc<Pipeline>,
    db: &Arc<dyn Database>,
    limit: Option<u32>,
    concurrency: usize,
    timeout: Option<Duration>,
) -> Result<ReprocessSummary> {
    let documents = db.list_documents(limit).await?;
    let mut summary = ReprocessSummary::default();

    let mut jobs = Vec::new();
    for doc in documents {
        match doc.file_path.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(path) => {
                let input = ExtractionInput::from_path(path, doc.content_type_hint());
                jobs.push((doc.id, input));
            }
            None => {
                warn!(id = %doc.id, file_name = %doc.file_name, "No stored file, skipping");
                println!("Skipping {} ({}): no stored file", doc.id, doc.file_name);
                summary.skipped += 1;
            }
        }
    }

    if jobs.is_empty() {
        println!("Processed 0 documents");
        return Ok(summary);
    }

    let concurrency = concurrency.max(1);
    info!(
        documents = jobs.len(),
        concurrency,
        extractor = pipeline.keyword_extractor_name(),
        "Re-processing documents"
    );

    let pb = ProgressBar::new(jobs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Extracting [{bar:30}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut results = stream::iter(jobs.into_iter().map(|(id, input)| async move {
        let result = pipeline.process_bounded(input, timeout).await;
        (id, result)
    }))
    .buffer_unordered(concurrency);

    // Write each result as it lands, one document at a time
    while let Some((id, result)) = results.next().await {
        match db.save_extraction(&id, &result).await {
            Ok(true) => {
                summary.processed += 1;
                pb.println(format!(
                    "  {id}: {} chars, {} keywords",
                    result.text.chars().count(),
                    result.keywords.len()
                ));
            }
            Ok(false) => {
                warn!(id = %id, "Document disappeared before its result was written");
                summary.failed += 1;
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Failed to save extraction, continuing");
                summary.failed += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!("Processed {} documents", summary.processed);
    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        failed = summary.failed,
        "Re-processing complete"
    );

    Ok(summary)
}
