//! Text layer extraction for PDF uploads.

use lopdf::Document;
use tracing::debug;

use docqa_core::{Error, Result};

/// Concatenate the text of every page, in page order, one page per paragraph.
///
/// Unreadable or encrypted files, and pages whose text cannot be decoded,
/// are reported as `UnsupportedDocument`. A PDF with no text layer (a scan)
/// yields an empty string and is rejected later as an empty corpus.
pub fn extract_pdf_text(raw: &[u8]) -> Result<String> {
    let doc = Document::load_mem(raw).map_err(|e| Error::UnsupportedDocument(format!("not a readable PDF: {e}")))?;
    if doc.is_encrypted() {
        return Err(Error::UnsupportedDocument("encrypted PDFs are not supported".into()));
    }
    let pages = doc.get_pages();
    let mut text = String::new();
    for page_number in pages.keys() {
        let page_text = doc
            .extract_text(&[*page_number])
            .map_err(|e| Error::UnsupportedDocument(format!("page {page_number}: {e}")))?;
        if !text.is_empty() { text.push_str("\n\n"); }
        text.push_str(page_text.trim());
    }
    debug!(pages = pages.len(), chars = text.len(), "pdf text extracted");
    Ok(text)
}
