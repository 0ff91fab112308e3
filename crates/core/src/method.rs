//! Research method catalogue.

use serde::{Deserialize, Serialize};

/// Labels the classifier chooses from, in prompt order.
pub const RESEARCH_METHODS: [&str; 16] = [
    "Data Science",
    "Engineering Research",
    "Design Science",
    "Experiments",
    "Grounded Theory",
    "Longitudinal",
    "Meta Science",
    "Optimization",
    "Qualitative Survey",
    "Quantitative Survey",
    "Quantitative Simulation",
    "Qualitative Simulation",
    "Questionnaire Survey",
    "Replication",
    "Repository Mining",
    "Systematic Review",
];

/// Label returned when an article fits none of the catalogue entries.
pub const MIXED_METHOD: &str = "mixed method";

/// The catalogue joined for inclusion in a prompt.
pub fn method_list() -> String {
    RESEARCH_METHODS.join(", ")
}

/// A research method from the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResearchMethod {
    /// Data Science
    DataScience,
    /// Engineering Research
    EngineeringResearch,
    /// Design Science
    DesignScience,
    /// Experiments
    Experiments,
    /// Grounded Theory
    GroundedTheory,
    /// Longitudinal
    Longitudinal,
    /// Meta Science
    MetaScience,
    /// Optimization
    Optimization,
    /// Qualitative Survey
    QualitativeSurvey,
    /// Quantitative Survey
    QuantitativeSurvey,
    /// Quantitative Simulation
    QuantitativeSimulation,
    /// Qualitative Simulation
    QualitativeSimulation,
    /// Questionnaire Survey
    QuestionnaireSurvey,
    /// Replication
    Replication,
    /// Repository Mining
    RepositoryMining,
    /// Systematic Review
    SystematicReview,
}

impl ResearchMethod {
    /// All methods, in catalogue order.
    pub const ALL: [ResearchMethod; 16] = [
        Self::DataScience,
        Self::EngineeringResearch,
        Self::DesignScience,
        Self::Experiments,
        Self::GroundedTheory,
        Self::Longitudinal,
        Self::MetaScience,
        Self::Optimization,
        Self::QualitativeSurvey,
        Self::QuantitativeSurvey,
        Self::QuantitativeSimulation,
        Self::QualitativeSimulation,
        Self::QuestionnaireSurvey,
        Self::Replication,
        Self::RepositoryMining,
        Self::SystematicReview,
    ];

    /// The catalogue label, which is also the criteria file stem.
    pub fn label(self) -> &'static str {
        RESEARCH_METHODS[self as usize]
    }

    /// Map a free-text label onto the catalogue (case and surrounding
    /// whitespace ignored).
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(label))
    }
}

impl std::fmt::Display for ResearchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error for labels outside the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown research method: {0}")]
pub struct UnknownMethod(pub String);

impl std::str::FromStr for ResearchMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownMethod(s.to_string()))
    }
}
