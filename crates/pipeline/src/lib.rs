//! Article pipeline - classification, criteria checks and persistence.

#![warn(missing_docs)]

pub mod engine;

pub use engine::{ArticlePipeline, BatchSummary, PipelineConfig, ProcessOutcome};
