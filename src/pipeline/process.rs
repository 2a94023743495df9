// Single-document processing: bytes in, text + language + keywords out.
//
// `process` never fails. Every stage degrades to an empty value, so a
// document with no recoverable text still gets a complete (empty) result
// that overwrites whatever was stored before.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::extract::{ExtractionInput, TextExtractor};
use crate::keywords::yake::YakeRanker;
use crate::keywords::{KeywordExtractor, KeywordSet};
use crate::language::LanguageDetector;

/// Everything one extraction run produces for a document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessedDocument {
    /// Extracted text, "" when nothing was recoverable
    pub text: String,
    /// ISO 639-1 code, None when the text is blank or detection failed
    pub language: Option<String>,
    pub keywords: KeywordSet,
}

/// The extract -> detect -> rank chain with its configured components.
pub struct Pipeline {
    extractor: TextExtractor,
    detector: LanguageDetector,
    keywords: Box<dyn KeywordExtractor>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(TextExtractor::default(), Box::new(YakeRanker::default()))
    }
}

impl Pipeline {
    pub fn new(extractor: TextExtractor, keywords: Box<dyn KeywordExtractor>) -> Self {
        Self {
            extractor,
            detector: LanguageDetector,
            keywords,
        }
    }

    /// Build the pipeline the configuration asks for.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            TextExtractor::new(config.extractor_settings()),
            config.keyword_extractor(),
        )
    }

    /// Name of the keyword extractor in use (for status output).
    pub fn keyword_extractor_name(&self) -> &'static str {
        self.keywords.name()
    }

    pub fn extractor(&self) -> &TextExtractor {
        &self.extractor
    }

    /// Run one document through every stage.
    pub fn process(&self, input: &ExtractionInput) -> ProcessedDocument {
        let text = self.extractor.extract(input);
        self.analyze(text)
    }

    /// Language detection and keyword ranking over already-extracted text.
    pub fn analyze(&self, text: String) -> ProcessedDocument {
        let language = if text.trim().is_empty() {
            None
        } else {
            self.detector.detect(&text)
        };

        let keywords = self.keywords.keyword_set(&text, language.as_deref());

        debug!(
            chars = text.chars().count(),
            language = language.as_deref().unwrap_or(""),
            keywords = keywords.len(),
            extractor = self.keywords.name(),
            "Processed document"
        );

        ProcessedDocument {
            text,
            language,
            keywords,
        }
    }

    /// Run `process` on the blocking pool, optionally bounded by `timeout`.
    ///
    /// A run that times out or panics yields the empty result. A timed-out
    /// run keeps going on its thread but its output is discarded, so only a
    /// single complete run ever reaches the caller.
    pub async fn process_bounded(
        self: &Arc<Self>,
        input: ExtractionInput,
        timeout: Option<Duration>,
    ) -> ProcessedDocument {
        let pipeline = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || pipeline.process(&input));

        let joined = match timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(
                        timeout_secs = limit.as_secs_f64(),
                        "Extraction timed out, storing empty result"
                    );
                    return ProcessedDocument::default();
                }
            },
            None => task.await,
        };

        match joined {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Extraction task failed, storing empty result");
                ProcessedDocument::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::frequency::FrequencyCounter;

    #[test]
    fn test_blank_text_has_no_language_or_keywords() {
        let pipeline = Pipeline::default();
        let result = pipeline.analyze("   \n ".to_string());
        assert_eq!(result.language, None);
        assert!(result.keywords.is_empty());
        assert!(result.keywords.scores.is_empty());
    }

    #[test]
    fn test_empty_input_gives_empty_result() {
        let pipeline = Pipeline::default();
        let result = pipeline.process(&ExtractionInput::from_bytes(Vec::new(), None));
        assert_eq!(result, ProcessedDocument::default());
    }

    #[test]
    fn test_language_feeds_keyword_set() {
        let pipeline = Pipeline::new(
            TextExtractor::default(),
            Box::new(FrequencyCounter::default()),
        );
        let result = pipeline.analyze(
            "The invoice lists consulting services delivered in March. \
             Payment of the invoice is due within thirty days of receipt."
                .to_string(),
        );
        assert_eq!(result.language.as_deref(), Some("en"));
        assert_eq!(result.keywords.language.as_deref(), Some("en"));
        assert_eq!(result.keywords.keywords[0], "invoice");
        assert_eq!(pipeline.keyword_extractor_name(), "frequency");
    }

    #[tokio::test]
    async fn test_process_bounded_matches_process() {
        let pipeline = Arc::new(Pipeline::new(
            TextExtractor::default(),
            Box::new(FrequencyCounter::default()),
        ));
        let direct = pipeline.process(&ExtractionInput::from_bytes(b"not a pdf".to_vec(), None));
        let bounded = pipeline
            .process_bounded(
                ExtractionInput::from_bytes(b"not a pdf".to_vec(), None),
                Some(Duration::from_secs(30)),
            )
            .await;
        assert_eq!(direct, bounded);
    }
}
