//! rmq core data models.
//!
//! This crate defines the records shared by the article quality pipeline:
//! articles, quality verdicts, the research-method catalogue and settings.

#![warn(missing_docs)]

// Core identities
mod id;

// Classification
mod method;

// Articles and their quality assessment
mod article;
mod quality;

// Configuration
mod settings;

// Re-exports
pub use id::*;

pub use method::{ResearchMethod, UnknownMethod, RESEARCH_METHODS, MIXED_METHOD, method_list};
pub use article::Article;
pub use quality::{Verdict, CriterionVerdict, QualityReport};
pub use settings::Settings;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
