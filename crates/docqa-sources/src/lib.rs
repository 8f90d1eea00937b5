//! Corpus sources: upload text extraction and encyclopedia lookup.

pub mod extract;
pub mod pdf;
pub mod wikipedia;

pub use extract::UploadExtractor;
pub use pdf::extract_pdf_text;
pub use wikipedia::WikipediaSource;
