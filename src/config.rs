use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::extract::{ExtractionMode, ExtractorSettings};
use crate::keywords::frequency::FrequencyCounter;
use crate::keywords::yake::YakeRanker;
use crate::keywords::KeywordExtractor;

/// Which keyword extraction strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordBackend {
    /// YAKE statistical n-gram ranker (default). Lower score = more relevant.
    Yake,
    /// Plain token frequency count with a fixed stopword list.
    Frequency,
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    /// Where ingested files are copied before extraction
    pub upload_dir: PathBuf,
    pub keyword_backend: KeywordBackend,
    pub extraction_mode: ExtractionMode,
    /// OCR for image uploads (DOCSIFT_OCR=off disables it)
    pub ocr_enabled: bool,
    pub tesseract_cmd: String,
    pub pdftoppm_cmd: String,
    /// Tesseract language pack, e.g. "eng" or "fra" (optional)
    pub ocr_language: Option<String>,
    /// Upper bound on one document's extraction run (unset = unbounded)
    pub extract_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default, so `docsift init` works on a bare machine.
    pub fn load() -> Result<Self> {
        let keyword_backend = match env::var("DOCSIFT_KEYWORDS").as_deref() {
            Ok("frequency") => KeywordBackend::Frequency,
            Ok("yake") | Err(_) => KeywordBackend::Yake,
            Ok(other) => anyhow::bail!(
                "Unknown DOCSIFT_KEYWORDS value '{other}' (expected 'yake' or 'frequency')"
            ),
        };

        let extraction_mode = match env::var("DOCSIFT_EXTRACTION").as_deref() {
            Ok("layered") => ExtractionMode::Layered,
            Ok("standard") | Err(_) => ExtractionMode::Standard,
            Ok(other) => anyhow::bail!(
                "Unknown DOCSIFT_EXTRACTION value '{other}' (expected 'standard' or 'layered')"
            ),
        };

        let ocr_enabled = !matches!(
            env::var("DOCSIFT_OCR").as_deref(),
            Ok("off") | Ok("0") | Ok("false")
        );

        let extract_timeout = match env::var("DOCSIFT_EXTRACT_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    anyhow::anyhow!("DOCSIFT_EXTRACT_TIMEOUT_SECS must be a whole number, got '{raw}'")
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        Ok(Self {
            db_path: env::var("DOCSIFT_DB_PATH").unwrap_or_else(|_| "./docsift.db".to_string()),
            upload_dir: env::var("DOCSIFT_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./uploads")),
            keyword_backend,
            extraction_mode,
            ocr_enabled,
            tesseract_cmd: env::var("DOCSIFT_TESSERACT_CMD")
                .unwrap_or_else(|_| "tesseract".to_string()),
            pdftoppm_cmd: env::var("DOCSIFT_PDFTOPPM_CMD")
                .unwrap_or_else(|_| "pdftoppm".to_string()),
            ocr_language: env::var("DOCSIFT_OCR_LANG").ok().filter(|l| !l.is_empty()),
            extract_timeout,
        })
    }

    /// Extractor settings derived from this configuration.
    pub fn extractor_settings(&self) -> ExtractorSettings {
        ExtractorSettings {
            mode: self.extraction_mode,
            ocr_enabled: self.ocr_enabled,
            tesseract_cmd: self.tesseract_cmd.clone(),
            pdftoppm_cmd: self.pdftoppm_cmd.clone(),
            ocr_language: self.ocr_language.clone(),
        }
    }

    /// Create the configured keyword extractor with default limits.
    pub fn keyword_extractor(&self) -> Box<dyn KeywordExtractor> {
        match self.keyword_backend {
            KeywordBackend::Yake => Box::new(YakeRanker::default()),
            KeywordBackend::Frequency => Box::new(FrequencyCounter::default()),
        }
    }
}
