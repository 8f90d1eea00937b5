use docqa_core::traits::TextExtractor;
use docqa_core::types::DocumentFormat;
use docqa_core::{Error, Result};

use crate::pdf::extract_pdf_text;

/// Accepts plain text, markdown and PDF. Invalid UTF-8 in text files is
/// decoded lossily rather than rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct UploadExtractor;

impl TextExtractor for UploadExtractor {
    fn extract_text(&self, raw: &[u8], format: &DocumentFormat) -> Result<String> {
        match format {
            DocumentFormat::PlainText | DocumentFormat::Markdown => Ok(match std::str::from_utf8(raw) {
                Ok(s) => s.to_string(),
                Err(_) => String::from_utf8_lossy(raw).into_owned(),
            }),
            DocumentFormat::Pdf => extract_pdf_text(raw),
            DocumentFormat::Other(ext) if ext.is_empty() => Err(Error::UnsupportedDocument("file has no extension; use .pdf, .txt or .md".into())),
            DocumentFormat::Other(ext) => Err(Error::UnsupportedDocument(format!("unsupported file type '.{ext}'; use .pdf, .txt or .md"))),
        }
    }
}
