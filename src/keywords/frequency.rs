// Frequency-based keyword fallback.
//
// Tokenize, lowercase, drop a fixed English stopword set, count. Output is
// the top-N words by count with their share of all kept tokens. Unlike
// YAKE scores, a bigger number here means a more prominent word.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use super::traits::KeywordExtractor;
use super::{stats, KeywordSet};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9']{2,}").unwrap());

/// Common English function words ignored by the counter.
pub const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him",
    "his", "how", "if", "in", "into", "is", "it", "it's", "its", "just", "me", "more", "most",
    "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our",
    "ours", "out", "over", "own", "same", "she", "should", "so", "some", "such", "than", "that",
    "the", "their", "them", "then", "there", "these", "they", "this", "those", "through", "to",
    "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your",
];

/// One counted word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyKeyword {
    pub word: String,
    pub count: usize,
    /// round(100 * count / total_tokens, 1)
    pub percent: f64,
}

/// Counter output: the top words plus the token total their percents use.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrequencyReport {
    pub keywords: Vec<FrequencyKeyword>,
    /// Non-stopword tokens counted, including words outside the top N
    pub total_tokens: usize,
}

/// Token-frequency keyword extractor.
#[derive(Debug, Clone)]
pub struct FrequencyCounter {
    pub top_n: usize,
}

impl Default for FrequencyCounter {
    fn default() -> Self {
        Self { top_n: 30 }
    }
}

impl FrequencyCounter {
    /// Count words in `text`, most frequent first. Ties keep the order in
    /// which the words first appeared.
    pub fn count(&self, text: &str) -> FrequencyReport {
        let lower = text.to_lowercase();

        // (word, count) in first-seen order, with an index for lookups
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut total_tokens = 0usize;

        for token in TOKEN_RE.find_iter(&lower).map(|m| m.as_str()) {
            if !token.chars().any(|c| c.is_ascii_alphanumeric()) || STOPWORDS.contains(&token) {
                continue;
            }
            total_tokens += 1;
            match index.get(token) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(token.to_string(), counts.len());
                    counts.push((token.to_string(), 1));
                }
            }
        }

        if total_tokens == 0 {
            return FrequencyReport::default();
        }

        // Stable sort keeps first-seen order among equal counts
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let keywords = counts
            .into_iter()
            .take(self.top_n)
            .map(|(word, count)| FrequencyKeyword {
                word,
                count,
                percent: stats::round1(100.0 * count as f64 / total_tokens as f64),
            })
            .collect();

        FrequencyReport {
            keywords,
            total_tokens,
        }
    }

    /// Just the counted words, for callers that don't need the total.
    pub fn extract_keywords(&self, text: &str) -> Vec<FrequencyKeyword> {
        self.count(text).keywords
    }
}

impl KeywordExtractor for FrequencyCounter {
    fn name(&self) -> &'static str {
        "frequency"
    }

    fn keyword_set(&self, text: &str, language: Option<&str>) -> KeywordSet {
        KeywordSet::from_frequency(self.count(text), language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_example() {
        let keywords = FrequencyCounter::default().extract_keywords("invoice invoice paid");
        assert_eq!(
            keywords,
            vec![
                FrequencyKeyword {
                    word: "invoice".to_string(),
                    count: 2,
                    percent: 66.7,
                },
                FrequencyKeyword {
                    word: "paid".to_string(),
                    count: 1,
                    percent: 33.3,
                },
            ]
        );
    }

    #[test]
    fn test_stopwords_and_short_tokens_are_dropped() {
        let report = FrequencyCounter::default().count("The cat and a dog, I think x y z.");
        let words: Vec<&str> = report.keywords.iter().map(|k| k.word.as_str()).collect();
        assert_eq!(words, vec!["cat", "dog", "think"]);
        assert_eq!(report.total_tokens, 3);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let words: Vec<String> = FrequencyCounter::default()
            .extract_keywords("zebra apple mango apple zebra mango")
            .into_iter()
            .map(|k| k.word)
            .collect();
        assert_eq!(words, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_top_n_caps_output_but_not_total() {
        let counter = FrequencyCounter { top_n: 1 };
        let report = counter.count("alpha alpha beta gamma");
        assert_eq!(report.keywords.len(), 1);
        assert_eq!(report.keywords[0].word, "alpha");
        assert_eq!(report.keywords[0].percent, 50.0);
        assert_eq!(report.total_tokens, 4);
    }

    #[test]
    fn test_case_folding_merges_counts() {
        let keywords = FrequencyCounter::default().extract_keywords("Invoice INVOICE invoice");
        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords[0].count, 3);
        assert_eq!(keywords[0].percent, 100.0);
    }

    #[test]
    fn test_empty_and_all_stopword_input() {
        let counter = FrequencyCounter::default();
        assert!(counter.extract_keywords("").is_empty());
        assert!(counter.extract_keywords("the and of to in").is_empty());
        assert!(counter.extract_keywords("'' ''' ''").is_empty());
    }

    #[test]
    fn test_keyword_set_uses_frequency_scale() {
        let set = FrequencyCounter::default().keyword_set("invoice invoice paid", Some("en"));
        assert_eq!(set.keywords, vec!["invoice", "paid"]);
        assert_eq!(set.scores["invoice"], 2.0);
        let stats = set.stats();
        assert_eq!(stats[0].percent, 66.7);
        assert_eq!(stats[1].percent, 33.3);
    }
}
