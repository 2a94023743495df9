// Output formatting: terminal display for documents and keyword stats.

pub mod terminal;

use crate::db::models::Document;

/// Characters of extracted text shown by `docsift debug`.
pub const DEBUG_SAMPLE_CHARS: usize = 2000;

/// Word tokens shown by `docsift debug`.
pub const DEBUG_TOKEN_LIMIT: usize = 200;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Unlike byte slicing (`&text[..120]`), this respects UTF-8 character boundaries
/// and will never panic on multi-byte characters like emoji or accented letters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// Lowercased runs of letters and digits, at most `limit` of them.
pub fn word_tokens(text: &str, limit: usize) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .take(limit)
        .map(str::to_lowercase)
        .collect()
}

/// What `docsift debug` shows for a document: a fresh extraction next to
/// what is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugReport {
    pub text_length: usize,
    pub sample: String,
    pub tokens: Vec<String>,
    pub stored_keyword_tokens: Vec<String>,
}

impl DebugReport {
    pub fn new(fresh_text: &str, stored: &Document) -> Self {
        let stored_keyword_tokens = stored
            .keyword_set
            .keywords
            .iter()
            .flat_map(|k| word_tokens(k, usize::MAX))
            .collect();

        Self {
            text_length: fresh_text.chars().count(),
            sample: fresh_text.chars().take(DEBUG_SAMPLE_CHARS).collect(),
            tokens: word_tokens(fresh_text, DEBUG_TOKEN_LIMIT),
            stored_keyword_tokens,
        }
    }
}
