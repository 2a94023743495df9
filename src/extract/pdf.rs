// PDF text-layer extraction.
//
// Two independent parsers: lopdf reads the text layer page by page (so one
// broken page only loses that page), pdf-extract is the second opinion for
// documents lopdf can't make sense of.

use anyhow::{Context, Result};
use lopdf::{Document, Object};
use tracing::debug;

use super::{contain_panics, ExtractionStrategy};

/// Per-page text layer via lopdf. Pages are joined with newlines; pages that
/// fail to decode are skipped.
pub struct LopdfTextLayer;

impl ExtractionStrategy for LopdfTextLayer {
    fn name(&self) -> &'static str {
        "lopdf-text-layer"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        contain_panics(self.name(), || {
            let doc = Document::load_mem(bytes).context("Not a readable PDF")?;
            Ok(page_texts(&doc).join("\n"))
        })
    }
}

/// Whole-document text layer via pdf-extract.
pub struct PdfExtractTextLayer;

impl ExtractionStrategy for PdfExtractTextLayer {
    fn name(&self) -> &'static str {
        "pdf-extract-text-layer"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        contain_panics(self.name(), || {
            pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| anyhow::anyhow!("pdf-extract failed: {e}"))
        })
    }
}

/// Text of every page that decodes, in page order. Empty pages are dropped.
fn page_texts(doc: &Document) -> Vec<String> {
    let mut parts = Vec::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) if !text.is_empty() => parts.push(text),
            Ok(_) => {}
            Err(e) => debug!(page = page_number, error = %e, "Skipping unreadable page"),
        }
    }
    parts
}

/// Read the `/Title` entry from the PDF info dictionary, if there is one.
pub fn metadata_title(bytes: &[u8]) -> Option<String> {
    contain_panics("pdf-metadata", || {
        let doc = Document::load_mem(bytes)?;
        let info = match doc.trailer.get(b"Info")? {
            Object::Reference(id) => doc.get_dictionary(*id)?,
            Object::Dictionary(dict) => dict,
            _ => anyhow::bail!("Info entry is not a dictionary"),
        };
        match info.get(b"Title")? {
            Object::String(raw, _) => Ok(decode_text_string(raw)),
            _ => anyhow::bail!("Title is not a string"),
        }
    })
    .ok()
    .map(|title| title.trim().to_string())
    .filter(|title| !title.is_empty())
}

/// Decode a PDF text string: UTF-16BE when it carries a byte-order mark,
/// otherwise treated as a single-byte encoding.
fn decode_text_string(raw: &[u8]) -> String {
    if let Some(utf16) = raw.strip_prefix(&[0xFE, 0xFF]) {
        let units = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        return char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
    }
    raw.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_an_error_not_a_panic() {
        assert!(LopdfTextLayer.extract(b"definitely not a pdf").is_err());
        assert!(PdfExtractTextLayer.extract(b"definitely not a pdf").is_err());
    }

    #[test]
    fn test_decode_utf16_title() {
        let raw = [0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_string(&raw), "Hi");
    }

    #[test]
    fn test_decode_single_byte_title() {
        assert_eq!(decode_text_string(b"Invoice"), "Invoice");
    }

    #[test]
    fn test_metadata_title_missing_for_garbage() {
        assert_eq!(metadata_title(b"%PDF-garbage"), None);
    }
}
