//! Article sources: PDF text extraction and bibliographic DOI lookup.

#![warn(missing_docs)]

pub mod pdf;
pub mod crossref;

pub use pdf::{extract_text, split_sentences, trim_to_sentences, TextSource, PdfTextSource};
pub use crossref::{CrossrefClient, DoiLookup, lookup_with_retry};

/// Error type for article sources.
pub type Result<T> = std::result::Result<T, PaperError>;

/// Errors from PDF extraction and bibliographic lookup.
#[derive(Debug, thiserror::Error)]
pub enum PaperError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The PDF could not be parsed
    #[error("PDF extraction failed for {path}: {message}")]
    Pdf {
        /// File being read
        path: String,
        /// Extractor message
        message: String,
    },

    /// Transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the lookup service
    #[error("lookup service returned status {0}")]
    Status(u16),

    /// Blocking extraction task failed
    #[error("extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
