//! Text extraction for ingestion.
//!
//! PDFs go through `pdf-extract`; everything else is read as UTF-8 text.
//! OCR and vision-model extraction are left to callers.

use std::path::Path;

use thiserror::Error;

/// MIME type of PDF input.
pub const MIME_PDF: &str = "application/pdf";
/// MIME type of plain-text input.
pub const MIME_TEXT: &str = "text/plain";

/// Extraction error; the document is skipped, nothing is stored.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("input is not valid UTF-8 text")]
    NotUtf8,
}

/// Guess a content type from a file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => MIME_PDF,
        _ => MIME_TEXT,
    }
}

/// Extract plain text from in-memory content.
pub fn extract_text(bytes: &[u8], content_type: &str) -> Result<String, ExtractError> {
    match content_type {
        MIME_PDF => extract_pdf(bytes),
        _ => String::from_utf8(bytes.to_vec()).map_err(|_| ExtractError::NotUtf8),
    }
}

/// Read `path` and extract its text, choosing the extractor by extension.
pub fn extract_file(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Read {
        path: path.display().to_string(),
        source,
    })?;
    extract_text(&bytes, content_type_for(path))
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map(|text| text.trim().to_string())
        .map_err(|e| ExtractError::Pdf(e.to_string()))
}
