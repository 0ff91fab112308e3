//! PDF text extraction.
//!
//! Wraps the pdf-extract crate and trims the text to a sentence budget so
//! excerpts stay small enough for a single prompt.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::{PaperError, Result};

/// Rough characters-per-sentence ratio used to turn a character budget into
/// a sentence count.
const CHARS_PER_SENTENCE: usize = 20;

/// Tokens that end in a period without ending a sentence.
const ABBREVIATIONS: [&str; 8] = ["e.g.", "i.e.", "al.", "fig.", "cf.", "vs.", "eq.", "no."];

fn sentence_end() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[.!?]+["'”’)\]]*\s+"#).expect("valid sentence regex"))
}

/// Split text into sentences, collapsing internal whitespace.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in sentence_end().find_iter(text) {
        let candidate = &text[start..m.end()];
        let last_word = candidate.split_whitespace().last().unwrap_or("").to_lowercase();
        if ABBREVIATIONS.contains(&last_word.as_str()) {
            continue;
        }
        push_sentence(&mut sentences, candidate);
        start = m.end();
    }
    push_sentence(&mut sentences, &text[start..]);

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let sentence = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !sentence.is_empty() {
        sentences.push(sentence);
    }
}

/// Keep the first `max_chars / 20` sentences, joined by single spaces.
pub fn trim_to_sentences(text: &str, max_chars: usize) -> String {
    let budget = max_chars / CHARS_PER_SENTENCE;
    split_sentences(text)
        .into_iter()
        .take(budget)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract the text of a PDF and trim it to `max_chars`' sentence budget.
pub fn extract_text(path: &Path, max_chars: usize) -> Result<String> {
    let text = pdf_extract::extract_text(path).map_err(|e| PaperError::Pdf {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    debug!("Extracted {} characters from {}", text.len(), path.display());
    Ok(trim_to_sentences(&text, max_chars))
}

/// Source of article text excerpts.
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Excerpt of the article at `path` within a `max_chars` budget.
    async fn excerpt(&self, path: &Path, max_chars: usize) -> Result<String>;
}

/// Text source reading PDFs with pdf-extract on a blocking thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextSource;

#[async_trait]
impl TextSource for PdfTextSource {
    async fn excerpt(&self, path: &Path, max_chars: usize) -> Result<String> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || extract_text(&path, max_chars)).await?
    }
}
