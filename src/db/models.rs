// Data models: Rust structs that map to database rows.
//
// These are the types that flow through the application. They're separate
// from the database queries so other modules can use them without depending
// on rusqlite directly.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::keywords::KeywordSet;

/// A stored document and the output of its latest extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// UUID v4
    pub id: String,
    /// Original upload name
    pub file_name: String,
    /// Where the stored copy lives. None when there's nothing to re-process.
    pub file_path: Option<String>,
    /// MIME type as declared or guessed at ingest ("" when unknown)
    pub content_type: String,
    pub file_size: Option<i64>,
    /// PDF /Title metadata, when the file had one
    pub title: Option<String>,
    /// Extracted text ("" when nothing was recoverable)
    pub text: String,
    pub keyword_set: KeywordSet,
    pub created_at: String,
    /// Last time the pipeline wrote this row (None if it never ran)
    pub processed_at: Option<String>,
}

impl Document {
    /// Detected language code, "" when unknown.
    pub fn language(&self) -> &str {
        self.keyword_set.language.as_deref().unwrap_or("")
    }

    /// Display name: the PDF title when known, else the file name.
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.file_name)
    }

    /// Content type as an optional routing hint for the extractor.
    pub fn content_type_hint(&self) -> Option<&str> {
        Some(self.content_type.as_str()).filter(|ct| !ct.is_empty())
    }
}

/// Fields known at ingest time, before extraction runs.
#[derive(Debug, Clone, Default)]
pub struct NewDocument {
    pub file_name: String,
    pub file_path: Option<String>,
    pub content_type: String,
    pub file_size: Option<i64>,
}

/// Read a keyword column written in any historical shape and return the
/// canonical list of phrases.
///
/// Accepted shapes:
///   - JSON array of strings: `["invoice", "due date"]`
///   - JSON array of objects: `[{"word": "invoice", "count": 4, "percent": 1.2}]`
///     (`keyword` or `k` also accepted as the word field)
///   - a JSON string wrapping either of the above
///   - plain text, comma or newline separated
///
/// Phrases are trimmed and lowercased; blanks and repeats are dropped, first
/// occurrence wins.
pub fn parse_legacy_keywords(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    let phrases: Vec<String> = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items.iter().filter_map(phrase_from_item).collect(),
        Ok(Value::String(inner)) => return parse_legacy_keywords(&inner),
        Ok(_) => Vec::new(),
        Err(_) => raw
            .split([',', '\n'])
            .map(str::to_string)
            .collect(),
    };

    let mut seen = HashSet::new();
    phrases
        .into_iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Counts carried by a legacy `[{word, count, percent}]` keyword list.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyFrequency {
    /// (phrase, count) in stored order, phrases canonicalized as above
    pub counts: Vec<(String, f64)>,
    pub total_tokens: u64,
}

/// Recover word counts from a legacy frequency list, if the column holds one.
///
/// The token total is rebuilt from `count / percent` when a percent was
/// stored, and never falls below the sum of the listed counts.
pub fn parse_legacy_frequency(raw: &str) -> Option<LegacyFrequency> {
    let items = match serde_json::from_str::<Value>(raw.trim()).ok()? {
        Value::Array(items) => items,
        Value::String(inner) => return parse_legacy_frequency(&inner),
        _ => return None,
    };

    let mut seen = HashSet::new();
    let mut counts = Vec::new();
    let mut implied_total: Option<f64> = None;
    for item in &items {
        let Some(count) = item.get("count").and_then(Value::as_f64) else {
            continue;
        };
        let Some(phrase) = phrase_from_item(item).map(|p| p.trim().to_lowercase()) else {
            continue;
        };
        if phrase.is_empty() || !seen.insert(phrase.clone()) {
            continue;
        }
        if implied_total.is_none() {
            implied_total = item
                .get("percent")
                .and_then(Value::as_f64)
                .filter(|p| *p > 0.0 && count > 0.0)
                .map(|p| (count * 100.0 / p).round());
        }
        counts.push((phrase, count));
    }

    if counts.is_empty() {
        return None;
    }

    let listed: f64 = counts.iter().map(|(_, c)| c).sum();
    let total = implied_total.unwrap_or(listed).max(listed);
    Some(LegacyFrequency {
        counts,
        total_tokens: total as u64,
    })
}

fn phrase_from_item(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => ["word", "keyword", "k"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}
