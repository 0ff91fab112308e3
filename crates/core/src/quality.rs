//! Quality model - per-criterion verdicts and the method quality report.

use serde::{Deserialize, Serialize};

/// Answer of the reasoning service to a single criterion question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Criterion met
    Yes,
    /// Criterion not met
    No,
    /// Reply could not be interpreted
    Unknown,
}

impl Verdict {
    /// Interpret a free-text reply.
    ///
    /// Only the last line counts, and it must read exactly `Yes` or `No`
    /// once surrounding whitespace is removed.
    pub fn from_reply(reply: &str) -> Self {
        let last = reply.trim().lines().last().unwrap_or("").trim();
        match last {
            "Yes" => Self::Yes,
            "No" => Self::No,
            _ => Self::Unknown,
        }
    }

    /// Display label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict recorded for one criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionVerdict {
    /// Criterion description
    pub description: String,

    /// Outcome
    pub verdict: Verdict,
}

/// Method-specific quality report of an article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Verdicts in evaluation order
    pub verdicts: Vec<CriterionVerdict>,
}

impl QualityReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one answer into the report.
    pub fn record(&mut self, description: impl Into<String>, verdict: Verdict) {
        self.verdicts.push(CriterionVerdict {
            description: description.into(),
            verdict,
        });
    }

    /// Whether no criterion was evaluated.
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    /// Number of verdicts equal to `verdict`.
    pub fn count(&self, verdict: Verdict) -> usize {
        self.verdicts.iter().filter(|v| v.verdict == verdict).count()
    }

    /// One `"<description> <verdict>"` line per criterion.
    pub fn summary(&self) -> String {
        self.verdicts
            .iter()
            .map(|v| format!("{} {}\n", v.description, v.verdict))
            .collect()
    }
}
