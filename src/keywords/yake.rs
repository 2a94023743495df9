// YAKE keyword ranking.
//
// Uses the `keyword_extraction` crate's YAKE implementation with the
// stop-word list for the document's language.
//
// The crate reports each phrase as 1/S scaled so the best phrase is 1.0,
// sorted descending. We store YAKE's native S instead (the reciprocal):
// LOWER means MORE relevant and results stay best-first, so scores ascend.
// Anything that turns these scores into weights must invert them (see
// stats::normalize).

use keyword_extraction::yake::{Yake, YakeParams};
use stop_words::{get, LANGUAGE};
use tracing::{debug, warn};

use super::traits::KeywordExtractor;
use super::{KeywordCandidate, KeywordSet};
use crate::extract::contain_panics;

/// Languages the ranker has stop-word lists wired up for (ISO 639-1).
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "fr", "de", "es", "it", "pt", "nl", "ar"];

/// YAKE's default deduplication threshold and co-occurrence window.
const DEDUP_THRESHOLD: f32 = 0.85;
const WINDOW_SIZE: usize = 1;

/// Statistical n-gram keyword ranker.
#[derive(Debug, Clone)]
pub struct YakeRanker {
    /// Longest phrase to propose, in tokens
    pub max_ngram: usize,
    /// Cap on the number of phrases returned
    pub top_k: usize,
    /// Language used when the hint is missing or unsupported
    pub default_language: String,
}

impl Default for YakeRanker {
    fn default() -> Self {
        Self {
            max_ngram: 3,
            top_k: 40,
            default_language: "en".to_string(),
        }
    }
}

impl YakeRanker {
    /// Pick the stop-word language: the hint if we support it, else the default.
    pub fn resolve_language<'a>(&'a self, hint: Option<&'a str>) -> &'a str {
        let supported = |code: &str| SUPPORTED_LANGUAGES.contains(&code);
        match hint.map(str::trim) {
            Some(code) if supported(code) => code,
            _ if supported(&self.default_language) => &self.default_language,
            _ => "en",
        }
    }

    /// Rank phrases in `text`, best first (lowest score first).
    ///
    /// The best phrase always scores 1.0 and every later one scores higher.
    ///
    /// Returns an empty list for blank text or if the engine fails.
    pub fn rank(&self, text: &str, language_hint: Option<&str>) -> Vec<KeywordCandidate> {
        if text.trim().is_empty() || self.top_k == 0 || self.max_ngram == 0 {
            return Vec::new();
        }

        let language = self.resolve_language(language_hint);
        let stop_words = stop_words_for(language);

        let ranked = contain_panics("yake", || {
            let params = YakeParams::All(
                text,
                &stop_words,
                None,
                DEDUP_THRESHOLD,
                self.max_ngram,
                WINDOW_SIZE,
            );
            Ok(Yake::new(params).get_ranked_keyword_scores(self.top_k))
        });

        let ranked = match ranked {
            Ok(ranked) => ranked,
            Err(e) => {
                warn!(error = %e, "YAKE failed, returning no keywords");
                return Vec::new();
            }
        };

        let candidates: Vec<KeywordCandidate> = ranked
            .into_iter()
            .filter_map(|(phrase, score)| {
                let phrase = phrase.trim().to_lowercase();
                let tokens = phrase.split_whitespace().count();
                if tokens == 0 || tokens > self.max_ngram {
                    return None;
                }
                native_score(score).map(|raw| KeywordCandidate::new(phrase, raw))
            })
            .collect();

        debug!(
            language,
            candidates = candidates.len(),
            "Ranked YAKE keywords"
        );

        candidates
    }
}

impl KeywordExtractor for YakeRanker {
    fn name(&self) -> &'static str {
        "yake"
    }

    fn keyword_set(&self, text: &str, language: Option<&str>) -> KeywordSet {
        KeywordSet::from_candidates(self.rank(text, language), language)
    }
}

/// Undo the crate's 1/S weighting. Non-positive weights carry no ranking.
fn native_score(weight: f32) -> Option<f64> {
    let weight = f64::from(weight);
    (weight.is_finite() && weight > 0.0).then(|| 1.0 / weight)
}

fn stop_words_for(code: &str) -> Vec<String> {
    let language = match code {
        "fr" => LANGUAGE::French,
        "de" => LANGUAGE::German,
        "es" => LANGUAGE::Spanish,
        "it" => LANGUAGE::Italian,
        "pt" => LANGUAGE::Portuguese,
        "nl" => LANGUAGE::Dutch,
        "ar" => LANGUAGE::Arabic,
        _ => LANGUAGE::English,
    };
    get(language)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVOICE_TEXT: &str = "Invoice number 4471 for consulting services. \
        The invoice total is due within thirty days. Late payment of the invoice \
        incurs a late fee. Consulting services were delivered in March. \
        Please reference the invoice number when sending payment.";

    #[test]
    fn test_resolve_language() {
        let ranker = YakeRanker::default();
        assert_eq!(ranker.resolve_language(Some("fr")), "fr");
        assert_eq!(ranker.resolve_language(Some("ja")), "en");
        assert_eq!(ranker.resolve_language(None), "en");

        let odd_default = YakeRanker {
            default_language: "xx".to_string(),
            ..Default::default()
        };
        assert_eq!(odd_default.resolve_language(None), "en");
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let ranker = YakeRanker::default();
        assert!(ranker.rank("", Some("en")).is_empty());
        assert!(ranker.rank("   \n", None).is_empty());
    }

    #[test]
    fn test_phrases_are_clean_and_bounded() {
        let ranker = YakeRanker {
            top_k: 10,
            ..Default::default()
        };
        let candidates = ranker.rank(INVOICE_TEXT, Some("en"));

        assert!(!candidates.is_empty());
        assert!(candidates.len() <= 10);
        for c in &candidates {
            assert!(!c.phrase.trim().is_empty());
            assert_eq!(c.phrase, c.phrase.to_lowercase());
            assert_eq!(c.phrase, c.phrase.trim());
            assert!(c.phrase.split_whitespace().count() <= 3);
        }
    }

    #[test]
    fn test_scores_ascend_best_first() {
        let candidates = YakeRanker::default().rank(INVOICE_TEXT, Some("en"));
        assert!(candidates.len() > 1);
        assert!((candidates[0].raw_score - 1.0).abs() < 1e-6);
        for pair in candidates.windows(2) {
            assert!(
                pair[0].raw_score <= pair[1].raw_score,
                "{} ({}) ranked ahead of {} ({})",
                pair[0].phrase,
                pair[0].raw_score,
                pair[1].phrase,
                pair[1].raw_score
            );
        }
    }

    #[test]
    fn test_native_score_inverts_weight() {
        assert_eq!(native_score(1.0), Some(1.0));
        assert_eq!(native_score(0.25), Some(4.0));
        assert_eq!(native_score(0.0), None);
        assert_eq!(native_score(f32::NAN), None);
    }
}
