//! Criteria repository.
//!
//! Per-research-method quality criteria loaded from CSV files, grouped by
//! description, and rendered into Yes/No questions for the reasoning service.

#![warn(missing_docs)]

pub mod criterion;
pub mod store;
pub mod prompt;

pub use criterion::{Attribute, Criterion, CriterionRecord, CriteriaSet, MUST_HAVE};
pub use store::{CriteriaStore, CriteriaError, LoadStats, Result};
pub use prompt::{CriterionPrompt, render_prompt};
