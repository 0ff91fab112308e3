//! Article model - a classified research article and its quality record.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use crate::id::ArticleKey;
use crate::quality::QualityReport;
use crate::Time;

/// A research article as persisted in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Article title
    pub name: String,

    /// Classified research method (free text as returned by the classifier)
    pub research_method: String,

    /// Digital Object Identifier, if the bibliographic lookup found one
    pub doi: Option<String>,

    /// Generic article-level quality data
    #[serde(rename = "articleQuality", default)]
    pub article_quality: serde_json::Value,

    /// Method-specific quality report
    #[serde(rename = "rmQuality", default)]
    pub rm_quality: QualityReport,

    /// Source files linked to this article
    #[serde(default)]
    pub filenames: BTreeSet<String>,

    /// Last updated
    pub updated_at: Time,
}

impl Article {
    /// Create a new article with no files and empty quality data.
    pub fn new(
        name: impl Into<String>,
        research_method: impl Into<String>,
        doi: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            research_method: research_method.into(),
            doi,
            article_quality: serde_json::Value::Object(Default::default()),
            rm_quality: QualityReport::new(),
            filenames: BTreeSet::new(),
            updated_at: chrono::Utc::now(),
        }
    }

    /// Attach the method quality report.
    pub fn with_rm_quality(mut self, report: QualityReport) -> Self {
        self.rm_quality = report;
        self
    }

    /// Link a source file.
    pub fn add_filename(&mut self, filename: impl Into<String>) {
        self.filenames.insert(filename.into());
    }

    /// Unlink a source file if present.
    pub fn remove_filename(&mut self, filename: &str) {
        self.filenames.remove(filename);
    }

    /// Key a new document for this article is created under.
    pub fn key(&self) -> ArticleKey {
        ArticleKey::new(self.name.clone())
    }
}

impl std::fmt::Display for Article {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string_pretty(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(std::fmt::Error),
        }
    }
}
