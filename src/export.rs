// Export: copy a document's stored file back out of the upload directory.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::db::models::Document;

/// Where an export of `doc` to `dest` lands. A directory destination gets
/// the document's original file name.
pub fn destination(doc: &Document, dest: &Path) -> PathBuf {
    if dest.is_dir() {
        // Only the final component, so a stored name can't climb out of `dest`
        let name = Path::new(&doc.file_name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "document".into());
        dest.join(name)
    } else {
        dest.to_path_buf()
    }
}

/// Copy the stored file to `dest` and return the path written.
///
/// Never overwrites an existing file.
pub fn export_document(doc: &Document, dest: &Path) -> Result<PathBuf> {
    let source = match doc.file_path.as_deref().filter(|p| !p.is_empty()) {
        Some(path) => Path::new(path),
        None => bail!("Document {} has no stored file", doc.id),
    };
    if !source.exists() {
        bail!("Stored file for {} is missing: {}", doc.id, source.display());
    }

    let target = destination(doc, dest);
    if target.exists() {
        bail!("Refusing to overwrite {}", target.display());
    }

    let bytes = std::fs::copy(source, &target).with_context(|| {
        format!("Failed to copy {} to {}", source.display(), target.display())
    })?;
    info!(id = %doc.id, target = %target.display(), bytes, "Exported document");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordSet;

    fn stored_doc(file_name: &str, file_path: Option<&Path>) -> Document {
        Document {
            id: "doc-1".to_string(),
            file_name: file_name.to_string(),
            file_path: file_path.map(|p| p.to_string_lossy().into_owned()),
            content_type: "application/pdf".to_string(),
            file_size: None,
            title: None,
            text: String::new(),
            keyword_set: KeywordSet::default(),
            created_at: String::new(),
            processed_at: None,
        }
    }

    #[test]
    fn test_export_into_directory_uses_original_name() {
        let uploads = tempfile::tempdir().unwrap();
        let stored = uploads.path().join("0f3a-invoice.pdf");
        std::fs::write(&stored, b"%PDF-1.5 body").unwrap();

        let out = tempfile::tempdir().unwrap();
        let doc = stored_doc("invoice.pdf", Some(&stored));
        let target = export_document(&doc, out.path()).unwrap();

        assert_eq!(target, out.path().join("invoice.pdf"));
        assert_eq!(std::fs::read(&target).unwrap(), b"%PDF-1.5 body");
    }

    #[test]
    fn test_export_to_explicit_file_path() {
        let uploads = tempfile::tempdir().unwrap();
        let stored = uploads.path().join("scan.png");
        std::fs::write(&stored, b"png").unwrap();

        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("copy.png");
        let target = export_document(&stored_doc("scan.png", Some(&stored)), &dest).unwrap();
        assert_eq!(target, dest);
        assert_eq!(std::fs::read(&dest).unwrap(), b"png");
    }

    #[test]
    fn test_export_never_overwrites() {
        let uploads = tempfile::tempdir().unwrap();
        let stored = uploads.path().join("a.pdf");
        std::fs::write(&stored, b"new").unwrap();

        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("a.pdf");
        std::fs::write(&dest, b"old").unwrap();

        assert!(export_document(&stored_doc("a.pdf", Some(&stored)), out.path()).is_err());
        assert_eq!(std::fs::read(&dest).unwrap(), b"old");
    }

    #[test]
    fn test_export_without_stored_file_fails() {
        let out = tempfile::tempdir().unwrap();
        assert!(export_document(&stored_doc("a.pdf", None), out.path()).is_err());

        let gone = out.path().join("gone.pdf");
        assert!(export_document(&stored_doc("a.pdf", Some(&gone)), out.path()).is_err());
    }

    #[test]
    fn test_directory_destination_strips_path_components() {
        let out = tempfile::tempdir().unwrap();
        let doc = stored_doc("../../etc/passwd", None);
        assert_eq!(destination(&doc, out.path()), out.path().join("passwd"));
    }
}
