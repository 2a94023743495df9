// Language detection for extracted text.
//
// whatlang is a pure function of its input (no sampling, no seed), so the
// same text always produces the same code. The detector itself is built
// once per process and shared.

use once_cell::sync::Lazy;
use whatlang::{Detector, Lang};

static DETECTOR: Lazy<Detector> = Lazy::new(Detector::new);

/// Deterministic language guesser returning ISO 639-1 codes ("en", "fr", ...).
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageDetector;

impl LanguageDetector {
    /// Guess the language of `text`.
    ///
    /// Returns `None` for blank text or when nothing can be detected;
    /// callers fall back to their default language.
    pub fn detect(&self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        let info = DETECTOR.detect(text)?;
        Some(iso_639_1(info.lang()).to_string())
    }
}

/// Two-letter code for the common languages; anything else keeps whatlang's
/// three-letter ISO 639-3 code.
fn iso_639_1(lang: Lang) -> &'static str {
    match lang {
        Lang::Eng => "en",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Spa => "es",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Nld => "nl",
        Lang::Ara => "ar",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Pol => "pl",
        Lang::Tur => "tr",
        Lang::Swe => "sv",
        Lang::Dan => "da",
        Lang::Fin => "fi",
        Lang::Nob => "no",
        Lang::Ces => "cs",
        Lang::Ell => "el",
        Lang::Heb => "he",
        Lang::Hin => "hi",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Cmn => "zh",
        Lang::Ron => "ro",
        Lang::Hun => "hu",
        Lang::Ind => "id",
        Lang::Vie => "vi",
        Lang::Pes => "fa",
        other => other.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_has_no_language() {
        assert_eq!(LanguageDetector.detect(""), None);
        assert_eq!(LanguageDetector.detect("   \n\t"), None);
    }

    #[test]
    fn test_detects_english() {
        let text = "The quarterly invoice was paid in full and the remaining balance \
                    will be carried over to the next billing period.";
        assert_eq!(LanguageDetector.detect(text).as_deref(), Some("en"));
    }

    #[test]
    fn test_detects_french() {
        let text = "La facture trimestrielle a été payée intégralement et le solde \
                    restant sera reporté sur la prochaine période de facturation.";
        assert_eq!(LanguageDetector.detect(text).as_deref(), Some("fr"));
    }

    #[test]
    fn test_detection_is_deterministic() {
        let text = "Der Vertrag wurde gestern von beiden Parteien unterschrieben.";
        let first = LanguageDetector.detect(text);
        for _ in 0..5 {
            assert_eq!(LanguageDetector.detect(text), first);
        }
    }
}
