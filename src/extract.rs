//! PDF text extraction.
//!
//! Uses [`pdf_extract`] to pull text out of in-memory PDF bytes, one page
//! at a time. The library can panic on malformed input rather than
//! returning an error, so the call is wrapped in
//! [`std::panic::catch_unwind`].

use std::panic::{self, AssertUnwindSafe};

use anyhow::{anyhow, Result};

/// Turns one uploaded document's bytes into its plain-text content.
pub trait Extractor {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// Extractor for PDF documents.
pub struct PdfExtractor;

impl Extractor for PdfExtractor {
    /// Extract the full text of a PDF: every page's text in physical page
    /// order, with a newline appended after each page.
    ///
    /// A page without extractable text (scanned or image-only) contributes
    /// an empty string plus its newline; only a document that cannot be
    /// parsed at all is an error.
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let pages = extract_pages(bytes)?;
        Ok(join_pages(&pages))
    }
}

/// Extract one `String` per page, converting panics from the underlying
/// library into errors.
fn extract_pages(bytes: &[u8]) -> Result<Vec<String>> {
    let data = bytes.to_vec(); // owned data crosses the unwind boundary
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(&data)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(anyhow!("PDF extraction failed: {e}")),
        Err(_) => Err(anyhow!("PDF extraction panicked (malformed document)")),
    }
}

/// Concatenate page texts, appending a newline after each page.
fn join_pages(pages: &[String]) -> String {
    let mut text = String::with_capacity(pages.iter().map(|p| p.len() + 1).sum());
    for page in pages {
        text.push_str(page);
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_pages_appends_newline_per_page() {
        let pages = vec!["Hello".to_string(), "World".to_string()];
        assert_eq!(join_pages(&pages), "Hello\nWorld\n");
    }

    #[test]
    fn join_pages_keeps_empty_page_as_bare_newline() {
        let pages = vec!["Intro".to_string(), String::new(), "Outro".to_string()];
        assert_eq!(join_pages(&pages), "Intro\n\nOutro\n");
    }

    #[test]
    fn join_pages_empty_document() {
        assert_eq!(join_pages(&[]), "");
    }

    #[test]
    fn garbage_bytes_return_error() {
        let result = PdfExtractor.extract(b"not a pdf at all");
        assert!(result.is_err());
    }

    #[test]
    fn truncated_pdf_header_returns_error() {
        let result = PdfExtractor.extract(b"%PDF-1.4\n%%EOF\n");
        assert!(result.is_err());
    }
}
