//! Document storage for classified articles.
//!
//! This crate provides a trait-based article store with upsert-by-DOI
//! semantics and a JSON file reference implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;

pub use trait_::{ArticleStore, StorageError, Result, SaveOutcome};
pub use json_storage::JsonStorage;
