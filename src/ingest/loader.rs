// PDF discovery and text extraction
use std::path::{Path, PathBuf};

use crate::errors::{MedQueryError, Result};

/// Extracted text of one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub source: String,
}

/// `*.pdf` files directly inside `dir`, sorted by name
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        MedQueryError::IngestError(format!("Cannot read data directory {}: {}", dir.display(), e))
    })?;

    let mut pdfs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if path.is_file() && is_pdf {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

/// Extract all text from one PDF
pub fn load_pdf(path: &Path) -> Result<Document> {
    let text = pdf_extract::extract_text(path).map_err(|e| {
        MedQueryError::IngestError(format!("Failed to extract {}: {}", path.display(), e))
    })?;

    Ok(Document {
        text,
        source: path.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_only_top_level_pdfs_sorted() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b_book.pdf"), b"%PDF-1.4").unwrap();
        std::fs::write(dir.path().join("a_book.PDF"), b"%PDF-1.4").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"skip").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.pdf"), b"%PDF-1.4").unwrap();

        let found = discover_pdfs(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a_book.PDF", "b_book.pdf"]);
    }

    #[test]
    fn test_missing_directory_is_ingest_error() {
        let result = discover_pdfs(Path::new("/definitely/not/a/dir"));
        assert!(matches!(result, Err(MedQueryError::IngestError(_))));
    }

    #[test]
    fn test_corrupt_pdf_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();
        assert!(load_pdf(&path).is_err());
    }
}
