// Text extraction: turns an uploaded file into plain text.
//
// Extraction is modelled as an ordered list of strategies. Each strategy
// returns `Result<String>`; the extractor walks the list and stops at the
// first one that produces non-blank text. Failures never escape: a missing
// OCR binary, a corrupt PDF, or an unreadable image all just mean "this
// strategy produced nothing" and the next one gets a turn.

pub mod ocr;
pub mod pdf;

use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use self::ocr::{ImageOcr, PdfPageOcr, Tesseract};
use self::pdf::{LopdfTextLayer, PdfExtractTextLayer};

/// File suffixes treated as images when the content type doesn't say so.
const IMAGE_SUFFIXES: &[&str] = &["png", "jpg", "jpeg", "tiff", "bmp", "gif"];

/// One way of getting text out of a file's bytes.
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Extract text. `Ok("")` means the strategy ran but found nothing;
    /// `Err` means it could not run at all. Both let the chain continue.
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// The file handed to the extractor: a path, a buffer, or both.
///
/// When both are present the buffer wins and the path only serves as a
/// filename hint for classification.
#[derive(Debug, Clone, Default)]
pub struct ExtractionInput {
    pub path: Option<PathBuf>,
    pub bytes: Option<Vec<u8>>,
    /// Declared MIME type. A routing hint only, never trusted.
    pub content_type: Option<String>,
}

impl ExtractionInput {
    pub fn from_path(path: impl Into<PathBuf>, content_type: Option<&str>) -> Self {
        Self {
            path: Some(path.into()),
            bytes: None,
            content_type: content_type.map(str::to_string),
        }
    }

    pub fn from_bytes(bytes: Vec<u8>, content_type: Option<&str>) -> Self {
        Self {
            path: None,
            bytes: Some(bytes),
            content_type: content_type.map(str::to_string),
        }
    }

    /// Attach a path (used as a filename hint when bytes are already loaded).
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// The raw bytes to extract from, reading the file if no buffer was given.
    fn load(&self) -> Result<Cow<'_, [u8]>> {
        if let Some(bytes) = &self.bytes {
            return Ok(Cow::Borrowed(bytes.as_slice()));
        }
        match &self.path {
            Some(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Ok(Cow::Owned(bytes))
            }
            None => anyhow::bail!("Extraction input has neither a path nor bytes"),
        }
    }
}

/// How the declared type and filename classify an input.
///
/// An input can be a PDF, an image, both (conflicting hints), or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentKind {
    pub pdf: bool,
    pub image: bool,
}

impl ContentKind {
    pub fn classify(content_type: Option<&str>, path: Option<&Path>) -> Self {
        let ct = content_type.unwrap_or_default().trim().to_ascii_lowercase();
        let suffix = path
            .and_then(|p| p.extension())
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        Self {
            pdf: ct.ends_with("pdf") || suffix == "pdf",
            image: ct.starts_with("image/") || IMAGE_SUFFIXES.contains(&suffix.as_str()),
        }
    }

    /// Neither hint matched, so the type is unknown.
    pub fn is_ambiguous(&self) -> bool {
        !self.pdf && !self.image
    }
}

/// MIME type for a file going by its extension alone, for uploads that
/// arrive without one.
pub fn guess_content_type(path: &Path) -> Option<&'static str> {
    let suffix = path.extension()?.to_string_lossy().to_ascii_lowercase();
    let ct = match suffix.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(ct)
}

/// Which strategy chain to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// PDF text layer for PDFs, OCR for images, PDF text layer as a last
    /// resort for anything unclassified.
    #[default]
    Standard,
    /// Three tiers for PDFs: lopdf text layer, then pdf-extract, then
    /// rendering every page and running OCR over it.
    Layered,
}

#[derive(Debug, Clone)]
pub struct ExtractorSettings {
    pub mode: ExtractionMode,
    pub ocr_enabled: bool,
    pub tesseract_cmd: String,
    pub pdftoppm_cmd: String,
    pub ocr_language: Option<String>,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Standard,
            ocr_enabled: true,
            tesseract_cmd: "tesseract".to_string(),
            pdftoppm_cmd: "pdftoppm".to_string(),
            ocr_language: None,
        }
    }
}

/// Text extractor with a prioritized strategy chain per content kind.
pub struct TextExtractor {
    mode: ExtractionMode,
    ocr_enabled: bool,
    text_layer: LopdfTextLayer,
    fallback_text_layer: PdfExtractTextLayer,
    image_ocr: ImageOcr,
    page_ocr: PdfPageOcr,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(ExtractorSettings::default())
    }
}

impl TextExtractor {
    pub fn new(settings: ExtractorSettings) -> Self {
        let engine = Tesseract::new(&settings.tesseract_cmd, settings.ocr_language.as_deref());
        Self {
            mode: settings.mode,
            ocr_enabled: settings.ocr_enabled,
            text_layer: LopdfTextLayer,
            fallback_text_layer: PdfExtractTextLayer,
            image_ocr: ImageOcr::new(engine.clone()),
            page_ocr: PdfPageOcr::new(engine, &settings.pdftoppm_cmd),
        }
    }

    /// The strategies to try for a given classification, in priority order.
    pub fn plan(&self, kind: ContentKind) -> Vec<&dyn ExtractionStrategy> {
        let mut plan: Vec<&dyn ExtractionStrategy> = Vec::new();

        let pdf_tiers: Vec<&dyn ExtractionStrategy> = match self.mode {
            ExtractionMode::Standard => vec![&self.text_layer as &dyn ExtractionStrategy],
            ExtractionMode::Layered => {
                let mut tiers: Vec<&dyn ExtractionStrategy> = vec![
                    &self.text_layer as &dyn ExtractionStrategy,
                    &self.fallback_text_layer as &dyn ExtractionStrategy,
                ];
                if self.ocr_enabled {
                    tiers.push(&self.page_ocr);
                }
                tiers
            }
        };

        if kind.pdf {
            plan.extend(pdf_tiers.iter().copied());
        }
        if kind.image && self.ocr_enabled {
            plan.push(&self.image_ocr);
        }
        // Some uploads are mislabelled, so unknown types still get the PDF path.
        if kind.is_ambiguous() {
            plan.extend(pdf_tiers.iter().copied());
        }

        plan
    }

    /// Extract plain text from the input. Never fails; returns an empty
    /// string when no strategy recovers any text.
    pub fn extract(&self, input: &ExtractionInput) -> String {
        let kind = ContentKind::classify(input.content_type.as_deref(), input.path.as_deref());

        let bytes = match input.load() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Could not load document bytes, extracting nothing");
                return String::new();
            }
        };

        if bytes.is_empty() {
            debug!("Document is empty, nothing to extract");
            return String::new();
        }

        for strategy in self.plan(kind) {
            match strategy.extract(&bytes) {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(
                        strategy = strategy.name(),
                        chars = text.chars().count(),
                        "Extracted text"
                    );
                    return text;
                }
                Ok(_) => debug!(strategy = strategy.name(), "Strategy produced no text"),
                Err(e) => debug!(strategy = strategy.name(), error = %e, "Strategy failed"),
            }
        }

        String::new()
    }
}

/// Run a third-party parser, turning a panic into an ordinary error.
///
/// Some PDF/image parsers panic on malformed input instead of returning an
/// error; a panic must only cost us the strategy, not the document.
pub(crate) fn contain_panics<T>(name: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(_) => anyhow::bail!("{name} panicked on malformed input"),
    }
}
