//! Résumé text extraction from uploaded PDF and plain-text files.

use std::path::Path;

use thiserror::Error;

pub mod handlers;

const PDF_SIGNATURE: &[u8] = b"%PDF";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unsupported file format: '{0}'")]
    UnsupportedFormat(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("file looks like a PDF but has a .txt extension")]
    DisguisedPdf,

    #[error("document contains no text")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    Text,
}

/// PDF signature wins over the extension; otherwise the extension decides.
fn detect_kind(file_name: &str, bytes: &[u8]) -> Result<DocumentKind, DocumentError> {
    if bytes.starts_with(PDF_SIGNATURE) {
        return Ok(DocumentKind::Pdf);
    }
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => Ok(DocumentKind::Pdf),
        "txt" => Ok(DocumentKind::Text),
        _ => Err(DocumentError::UnsupportedFormat(ext)),
    }
}

/// Extracts trimmed text from `bytes`. CPU-bound for PDFs; call it off the async runtime.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, DocumentError> {
    let text = match detect_kind(file_name, bytes)? {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| DocumentError::Pdf(e.to_string()))?,
        DocumentKind::Text => decode_text(bytes)?,
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(DocumentError::Empty);
    }
    Ok(text.to_string())
}

/// UTF-8 first, Latin-1 otherwise (every byte sequence is valid Latin-1).
fn decode_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    };
    if text.trim_start().as_bytes().starts_with(PDF_SIGNATURE) {
        return Err(DocumentError::DisguisedPdf);
    }
    Ok(text)
}
