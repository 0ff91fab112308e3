//! Pipeline settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings shared by the pipeline and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory scanned for PDF files
    pub articles_dir: PathBuf,

    /// Directory holding one `<method>.csv` criteria file per research method
    pub criteria_dir: PathBuf,

    /// Root of the JSON document store
    pub store_dir: PathBuf,

    /// Chat model used for classification and criteria checks
    pub model: String,

    /// Characters of article text used to find the title
    pub title_excerpt_chars: usize,

    /// Characters of article text used to classify the method
    pub method_excerpt_chars: usize,

    /// Contact address for the Crossref polite pool
    pub crossref_mailto: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            articles_dir: PathBuf::from("./articles"),
            criteria_dir: PathBuf::from("csv"),
            store_dir: PathBuf::from(".rmq"),
            model: "gpt-4-turbo".to_string(),
            title_excerpt_chars: 1000,
            method_excerpt_chars: 5000,
            crossref_mailto: None,
        }
    }
}

impl Settings {
    /// Defaults overridden by `RMQ_*` environment variables.
    ///
    /// Unparseable numeric values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        if let Some(v) = lookup("RMQ_ARTICLES_DIR") {
            settings.articles_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("RMQ_CRITERIA_DIR") {
            settings.criteria_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("RMQ_STORE_DIR") {
            settings.store_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("RMQ_MODEL") {
            settings.model = v;
        }
        if let Some(n) = lookup("RMQ_TITLE_EXCERPT_CHARS").and_then(|v| v.parse().ok()) {
            settings.title_excerpt_chars = n;
        }
        if let Some(n) = lookup("RMQ_METHOD_EXCERPT_CHARS").and_then(|v| v.parse().ok()) {
            settings.method_excerpt_chars = n;
        }
        if let Some(v) = lookup("RMQ_CROSSREF_MAILTO").filter(|v| !v.is_empty()) {
            settings.crossref_mailto = Some(v);
        }
        settings
    }
}
