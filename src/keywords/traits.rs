// Keyword extractor trait: swap-ready abstraction.
//
// The pipeline only needs a KeywordSet; whether it came from the YAKE
// ranker or the frequency counter is a deployment choice.

use super::KeywordSet;

/// Trait for turning a document's text into a durable keyword set.
pub trait KeywordExtractor: Send + Sync {
    /// Short name used in logs and status output.
    fn name(&self) -> &'static str;

    /// Extract keywords from `text`. `language` is an ISO 639-1 hint.
    ///
    /// Never fails: empty text or an engine failure yields an empty set.
    fn keyword_set(&self, text: &str, language: Option<&str>) -> KeywordSet;
}
