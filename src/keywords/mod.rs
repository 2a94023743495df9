// Keyword extraction: ranked keyword sets for a document's text.
//
// Two strategies live behind the KeywordExtractor trait: the YAKE n-gram
// ranker (scores where LOWER means MORE relevant) and a plain frequency
// counter (scores are occurrence counts). Their scales are not
// interchangeable, so every KeywordSet records which one produced it.

pub mod frequency;
pub mod stats;
pub mod traits;
pub mod yake;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use self::frequency::FrequencyReport;
use self::stats::KeywordStat;

pub use self::traits::KeywordExtractor;

/// A phrase proposed by an extractor, before deduplication.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordCandidate {
    /// Lowercased, trimmed, 1–3 tokens, never empty
    pub phrase: String,
    pub raw_score: f64,
}

impl KeywordCandidate {
    pub fn new(phrase: impl Into<String>, raw_score: f64) -> Self {
        Self {
            phrase: phrase.into(),
            raw_score,
        }
    }
}

/// What the numbers in `KeywordSet::scores` mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreScale {
    /// Statistical ranker output: lower score = higher relevance.
    #[default]
    Relevance,
    /// Occurrence counts out of `total_tokens` non-stopword tokens.
    Frequency { total_tokens: u64 },
}

/// The durable result of one extraction run for a document.
///
/// `keywords` holds each phrase once, in first-seen (best-first) order, and
/// every phrase has exactly one entry in `scores`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KeywordSet {
    pub keywords: Vec<String>,
    pub scores: HashMap<String, f64>,
    pub language: Option<String>,
    #[serde(default)]
    pub scale: ScoreScale,
}

impl KeywordSet {
    /// Build a set from ranked candidates. The first occurrence of a phrase
    /// wins; later duplicates are dropped, not merged.
    pub fn from_candidates(candidates: Vec<KeywordCandidate>, language: Option<&str>) -> Self {
        let mut set = Self {
            language: language.map(str::to_string),
            ..Default::default()
        };
        for candidate in candidates {
            if set.scores.contains_key(&candidate.phrase) {
                continue;
            }
            set.scores.insert(candidate.phrase.clone(), candidate.raw_score);
            set.keywords.push(candidate.phrase);
        }
        set
    }

    /// Build a set from frequency counts. Scores are the raw counts.
    pub fn from_frequency(report: FrequencyReport, language: Option<&str>) -> Self {
        let mut set = Self {
            language: language.map(str::to_string),
            scale: ScoreScale::Frequency {
                total_tokens: report.total_tokens as u64,
            },
            ..Default::default()
        };
        for keyword in report.keywords {
            if set.scores.contains_key(&keyword.word) {
                continue;
            }
            set.scores.insert(keyword.word.clone(), keyword.count as f64);
            set.keywords.push(keyword.word);
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// (phrase, score) pairs in keyword order.
    pub fn entries(&self) -> Vec<(String, f64)> {
        self.keywords
            .iter()
            .filter_map(|k| self.scores.get(k).map(|&s| (k.clone(), s)))
            .collect()
    }

    /// Display percentages for this set, strongest first.
    ///
    /// Relevance scores go through inverse normalization; frequency counts
    /// are turned into their share of all counted tokens. The inverse
    /// formula is never applied to counts.
    pub fn stats(&self) -> Vec<KeywordStat> {
        let entries = self.entries();
        match self.scale {
            ScoreScale::Relevance => stats::normalize(&entries),
            ScoreScale::Frequency { total_tokens } => {
                stats::frequency_percentages(&entries, total_tokens)
            }
        }
    }
}
