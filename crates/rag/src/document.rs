//! PDF page extraction.
//!
//! Wraps the `pdf-extract` crate to turn a PDF file into one opaque text
//! string per page, in page order. Page text is treated as-is downstream:
//! no cleaning, chunking, or layout analysis happens here.

use askpdf_core::{AppError, AppResult};
use std::path::Path;

/// Extract the text of every page in a PDF, in page order.
///
/// Blank pages are preserved as empty strings so page numbering stays
/// aligned with the source document.
pub fn extract_pages(path: &Path) -> AppResult<Vec<String>> {
    if !path.exists() {
        return Err(AppError::Document(format!(
            "PDF file not found: {:?}",
            path
        )));
    }

    tracing::debug!("Extracting page texts from {:?}", path);

    let pages = pdf_extract::extract_text_by_pages(path)
        .map_err(|e| AppError::Document(format!("Failed to extract text from {:?}: {}", path, e)))?;

    tracing::info!("Extracted {} pages from {:?}", pages.len(), path);

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_document_error() {
        let result = extract_pages(Path::new("/nonexistent/file.pdf"));
        assert!(matches!(result, Err(AppError::Document(_))));
    }

    #[test]
    fn test_garbage_file_is_document_error() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), b"not a pdf at all").unwrap();

        let result = extract_pages(temp.path());
        assert!(matches!(result, Err(AppError::Document(_))));
    }
}
