// OCR strategies backed by the tesseract CLI.
//
// Tesseract is optional. If the binary isn't installed the command fails
// to spawn, the strategy returns an error, and the extractor moves on.
// Scanned PDFs are rasterized with pdftoppm first, one PNG per page.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use image::ImageFormat;
use tracing::debug;

use super::{contain_panics, ExtractionStrategy};

/// Resolution used when rendering PDF pages for OCR.
const RENDER_DPI: &str = "300";

/// Thin wrapper around the tesseract command line.
#[derive(Debug, Clone)]
pub struct Tesseract {
    cmd: String,
    language: Option<String>,
}

impl Tesseract {
    pub fn new(cmd: &str, language: Option<&str>) -> Self {
        Self {
            cmd: cmd.to_string(),
            language: language.map(str::to_string),
        }
    }

    /// Recognize the text in an image file on disk.
    pub fn recognize_file(&self, image_path: &Path) -> Result<String> {
        let mut command = Command::new(&self.cmd);
        command.arg(image_path).arg("stdout");
        if let Some(lang) = &self.language {
            command.arg("-l").arg(lang);
        }

        let output = command
            .output()
            .with_context(|| format!("OCR engine '{}' is unavailable", self.cmd))?;

        if !output.status.success() {
            anyhow::bail!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// OCR over an uploaded image (PNG, JPEG, TIFF, BMP, GIF).
///
/// The bytes are decoded first so an unreadable image fails fast, then
/// normalized to an RGB PNG for tesseract.
pub struct ImageOcr {
    engine: Tesseract,
}

impl ImageOcr {
    pub fn new(engine: Tesseract) -> Self {
        Self { engine }
    }
}

impl ExtractionStrategy for ImageOcr {
    fn name(&self) -> &'static str {
        "image-ocr"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let rgb = contain_panics("image-decode", || {
            let decoded = image::load_from_memory(bytes).context("Unreadable image bytes")?;
            Ok(decoded.to_rgb8())
        })?;

        let scratch = tempfile::Builder::new()
            .prefix("docsift-ocr-")
            .suffix(".png")
            .tempfile()
            .context("Failed to create scratch file for OCR")?;
        rgb.save_with_format(scratch.path(), ImageFormat::Png)
            .context("Failed to write scratch image for OCR")?;

        self.engine.recognize_file(scratch.path())
    }
}

/// Full OCR over a PDF: render each page to PNG, recognize each page.
///
/// A page that fails to recognize is skipped; the rest still count.
pub struct PdfPageOcr {
    engine: Tesseract,
    pdftoppm_cmd: String,
}

impl PdfPageOcr {
    pub fn new(engine: Tesseract, pdftoppm_cmd: &str) -> Self {
        Self {
            engine,
            pdftoppm_cmd: pdftoppm_cmd.to_string(),
        }
    }

    /// Rasterize every page into `dir`, returning the page images in order.
    fn render_pages(&self, pdf_path: &Path, dir: &Path) -> Result<Vec<PathBuf>> {
        let output = Command::new(&self.pdftoppm_cmd)
            .arg("-r")
            .arg(RENDER_DPI)
            .arg("-png")
            .arg(pdf_path)
            .arg(dir.join("page"))
            .output()
            .with_context(|| format!("PDF renderer '{}' is unavailable", self.pdftoppm_cmd))?;

        if !output.status.success() {
            anyhow::bail!(
                "pdftoppm exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        // pdftoppm zero-pads page numbers, so name order is page order.
        let mut pages: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
            .collect();
        pages.sort();
        Ok(pages)
    }
}

impl ExtractionStrategy for PdfPageOcr {
    fn name(&self) -> &'static str {
        "pdf-page-ocr"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let dir = tempfile::tempdir().context("Failed to create scratch directory for OCR")?;
        let pdf_path = dir.path().join("input.pdf");
        fs::write(&pdf_path, bytes).context("Failed to write scratch PDF for OCR")?;

        let pages = self.render_pages(&pdf_path, dir.path())?;
        let mut parts = Vec::with_capacity(pages.len());
        for page in &pages {
            match self.engine.recognize_file(page) {
                Ok(text) if !text.trim().is_empty() => parts.push(text),
                Ok(_) => {}
                Err(e) => debug!(page = %page.display(), error = %e, "Skipping page OCR"),
            }
        }
        Ok(parts.join("\n"))
    }
}
