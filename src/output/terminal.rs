// Colored terminal output for documents and keyword stats.
//
// This module handles all terminal-specific formatting: colors, tables,
// bar charts. The main.rs command handlers delegate here.

use colored::Colorize;

use super::{truncate_chars, DebugReport};
use crate::db::models::Document;
use crate::keywords::stats::KeywordStat;
use crate::keywords::ScoreScale;

/// Display a list of documents, newest first.
pub fn display_document_list(documents: &[Document]) {
    if documents.is_empty() {
        println!("No documents stored yet. Run `docsift ingest <file>` first.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Documents ({}) ===", documents.len()).bold()
    );
    println!();

    println!(
        "  {:<36}  {:<32} {:>4}  {:>8}  {:<19}",
        "Id".dimmed(),
        "Name".dimmed(),
        "Lang".dimmed(),
        "Keywords".dimmed(),
        "Created".dimmed(),
    );
    println!("  {}", "-".repeat(107).dimmed());

    for doc in documents {
        let language = match doc.language() {
            "" => "?".dimmed().to_string(),
            code => code.to_string(),
        };
        println!(
            "  {:<36}  {:<32} {:>4}  {:>8}  {:<19}",
            doc.id,
            truncate_chars(doc.display_name(), 29),
            language,
            doc.keyword_set.len(),
            doc.created_at,
        );
    }
    println!();
}

/// Display one document: metadata, a text preview, and its keywords.
pub fn display_document_detail(doc: &Document) {
    println!("\n{}", format!("=== {} ===", doc.display_name()).bold());

    println!("  Id: {}", doc.id);
    println!("  File: {}", doc.file_name);
    match &doc.file_path {
        Some(path) => println!("  Stored at: {}", path),
        None => println!("  Stored at: {}", "(no stored file)".yellow()),
    }
    if !doc.content_type.is_empty() {
        println!("  Content type: {}", doc.content_type);
    }
    if let Some(size) = doc.file_size {
        println!("  Size: {} bytes", size);
    }
    println!(
        "  Language: {}",
        match doc.language() {
            "" => "unknown".dimmed().to_string(),
            code => code.to_string(),
        }
    );
    println!("  Created: {}", doc.created_at);
    match &doc.processed_at {
        Some(at) => println!("  Processed: {}", at),
        None => println!("  Processed: {}", "never".yellow()),
    }

    if doc.text.is_empty() {
        println!("\n  {}", "No text extracted.".dimmed());
    } else {
        println!(
            "\n  Text ({} chars): {}",
            doc.text.chars().count(),
            truncate_chars(&doc.text.replace('\n', " "), 200).dimmed()
        );
    }

    if doc.keyword_set.is_empty() {
        println!("  {}", "No keywords.".dimmed());
        return;
    }

    let scale_hint = match doc.keyword_set.scale {
        ScoreScale::Relevance => "lower score = more relevant",
        ScoreScale::Frequency { .. } => "score = occurrences",
    };
    println!(
        "\n  {} keywords ({}):",
        doc.keyword_set.len(),
        scale_hint
    );
    for (i, (phrase, score)) in doc.keyword_set.entries().iter().enumerate() {
        println!("    {:>2}. {:<40} {:.4}", i + 1, phrase, score);
    }
}

/// Display keyword stats as a bar chart, strongest first.
pub fn display_keyword_stats(title: &str, stats: &[KeywordStat]) {
    println!("\n{}", format!("=== Keyword stats: {} ===", title).bold());
    println!();

    if stats.is_empty() {
        println!("  No keywords. Run `docsift reprocess` to extract them.");
        return;
    }

    let bar_width: usize = 20;
    // Scale bars against the strongest keyword so small sets stay readable
    let top = stats.iter().map(|s| s.percent).fold(0.0_f64, f64::max);

    for (i, stat) in stats.iter().enumerate() {
        let ratio = if top > 0.0 { stat.percent / top } else { 0.0 };
        let filled = (ratio * bar_width as f64).round() as usize;
        let empty = bar_width.saturating_sub(filled);
        let bar = format!("[{}{}]", "=".repeat(filled), " ".repeat(empty));

        let colored_bar = if stat.percent >= 25.0 {
            bar.bright_green()
        } else if stat.percent >= 10.0 {
            bar.bright_yellow()
        } else {
            bar.bright_blue()
        };

        println!(
            "  {:>2}. {:<40} {} {:>5.1}%",
            i + 1,
            stat.word.bold(),
            colored_bar,
            stat.percent
        );
    }
    println!();
}

/// Display a `docsift debug` report.
pub fn display_debug_report(doc: &Document, report: &DebugReport) {
    println!("\n{}", format!("=== Debug: {} ===", doc.display_name()).bold());
    println!("  Text length: {} chars", report.text_length);
    println!("  Stored text length: {} chars", doc.text.chars().count());

    println!("\n  {}", "Sample:".bold());
    if report.sample.is_empty() {
        println!("    {}", "(empty)".dimmed());
    } else {
        for line in report.sample.lines() {
            println!("    {}", line.dimmed());
        }
    }

    println!("\n  {} ({}):", "Tokens".bold(), report.tokens.len());
    println!("    {}", report.tokens.join(" "));

    println!(
        "\n  {} ({}):",
        "Stored keyword tokens".bold(),
        report.stored_keyword_tokens.len()
    );
    println!("    {}", report.stored_keyword_tokens.join(" "));
}
