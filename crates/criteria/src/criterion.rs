//! Criteria and their prioritized attributes.

use serde::{Deserialize, Serialize};

/// The only priority with special meaning when prompts are rendered.
pub const MUST_HAVE: &str = "must have";

/// A (priority, text) pair attached to a criterion.
///
/// The priority is normally a MoSCoW label but any string is accepted.
/// Equality is on the raw pair, so `"Must Have"` and `"must have"` are
/// distinct attributes even though both count as Must-Have.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    /// MoSCoW priority label
    pub priority: String,

    /// Attribute text
    pub text: String,
}

impl Attribute {
    /// Create an attribute.
    pub fn new(priority: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            priority: priority.into(),
            text: text.into(),
        }
    }

    /// Whether the priority reads "must have", ignoring case.
    pub fn is_must_have(&self) -> bool {
        self.priority.to_lowercase() == MUST_HAVE
    }
}

/// A named quality check for a research method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criterion {
    description: String,
    level: String,
    attributes: Vec<Attribute>,
}

impl Criterion {
    /// Create a criterion without attributes.
    pub fn new(description: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            level: level.into(),
            attributes: Vec::new(),
        }
    }

    /// Description, unique within a method.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Importance tier recorded when the criterion was first seen.
    pub fn level(&self) -> &str {
        &self.level
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Add an attribute; inserting an existing pair is a no-op.
    ///
    /// Returns whether the attribute was new.
    pub fn add_attribute(&mut self, priority: impl Into<String>, text: impl Into<String>) -> bool {
        let attribute = Attribute::new(priority, text);
        if self.attributes.contains(&attribute) {
            return false;
        }
        self.attributes.push(attribute);
        true
    }

    /// Split attribute texts into (Must-Have, everything else).
    pub fn partition(&self) -> (Vec<&str>, Vec<&str>) {
        let (must, other): (Vec<&Attribute>, Vec<&Attribute>) =
            self.attributes.iter().partition(|a| a.is_must_have());
        (
            must.into_iter().map(|a| a.text.as_str()).collect(),
            other.into_iter().map(|a| a.text.as_str()).collect(),
        )
    }

    /// Plain projection of this criterion.
    pub fn to_dict(&self) -> CriterionRecord {
        CriterionRecord {
            description: self.description.clone(),
            level: self.level.clone(),
            attributes: self
                .attributes
                .iter()
                .map(|a| (a.priority.clone(), a.text.clone()))
                .collect(),
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  - Description: {}", self.description)?;
        writeln!(f, "    Level: {}", self.level)?;
        writeln!(f, "    Attributes:")?;
        for attribute in &self.attributes {
            writeln!(f, "      - {}: {}", attribute.priority, attribute.text)?;
        }
        Ok(())
    }
}

/// Serializable view of a criterion.
///
/// Attribute order follows the underlying set and carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionRecord {
    /// Criterion description
    pub description: String,

    /// Importance tier
    pub level: String,

    /// (priority, text) pairs
    pub attributes: Vec<(String, String)>,
}

/// The criteria of one research method, deduplicated by description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaSet {
    criteria: Vec<Criterion>,
}

impl CriteriaSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a criterion by exact description.
    pub fn get(&self, description: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.description == description)
    }

    /// Merge one row into the set.
    ///
    /// A repeated description only gains the attribute; its `level` argument
    /// is discarded so the first-seen level wins.
    pub fn add(&mut self, description: &str, level: &str, moscow: &str, attribute: &str) {
        match self.criteria.iter_mut().find(|c| c.description == description) {
            Some(existing) => {
                existing.add_attribute(moscow, attribute);
            }
            None => {
                let mut criterion = Criterion::new(description, level);
                criterion.add_attribute(moscow, attribute);
                self.criteria.push(criterion);
            }
        }
    }

    /// Iterate criteria.
    pub fn iter(&self) -> std::slice::Iter<'_, Criterion> {
        self.criteria.iter()
    }

    /// Number of criteria.
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Whether the set holds no criteria.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Projections of every criterion.
    pub fn records(&self) -> Vec<CriterionRecord> {
        self.criteria.iter().map(Criterion::to_dict).collect()
    }
}

impl<'a> IntoIterator for &'a CriteriaSet {
    type Item = &'a Criterion;
    type IntoIter = std::slice::Iter<'a, Criterion>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_attribute_is_idempotent() {
        let mut criterion = Criterion::new("Randomization", "High");
        assert!(criterion.add_attribute("Must Have", "random assignment used"));
        assert!(!criterion.add_attribute("Must Have", "random assignment used"));
        assert_eq!(criterion.attributes().len(), 1);
    }

    #[test]
    fn test_priority_case_makes_distinct_pairs() {
        let mut criterion = Criterion::new("Randomization", "High");
        criterion.add_attribute("Must Have", "random assignment used");
        criterion.add_attribute("must have", "random assignment used");
        assert_eq!(criterion.attributes().len(), 2);
    }

    #[test]
    fn test_must_have_ignores_case() {
        for label in ["Must Have", "must have", "MUST HAVE"] {
            assert!(Attribute::new(label, "x").is_must_have(), "{label}");
        }
        assert!(!Attribute::new("Must Have!", "x").is_must_have());
        assert!(!Attribute::new("Should Have", "x").is_must_have());
    }

    #[test]
    fn test_partition() {
        let mut criterion = Criterion::new("Design", "Medium");
        criterion.add_attribute("Must Have", "A");
        criterion.add_attribute("Could Have", "B");
        criterion.add_attribute("Won't Have", "C");

        let (must, other) = criterion.partition();
        assert_eq!(must, vec!["A"]);
        assert_eq!(other.len(), 2);
        assert!(other.contains(&"B") && other.contains(&"C"));
    }

    #[test]
    fn test_set_keeps_first_level() {
        let mut set = CriteriaSet::new();
        set.add("Randomization", "High", "Must Have", "random assignment used");
        set.add("Randomization", "Low", "Could Have", "blinding applied");

        assert_eq!(set.len(), 1);
        let criterion = set.get("Randomization").unwrap();
        assert_eq!(criterion.level(), "High");
        assert_eq!(criterion.attributes().len(), 2);
    }

    #[test]
    fn test_to_dict() {
        let mut criterion = Criterion::new("Randomization", "High");
        criterion.add_attribute("Must Have", "random assignment used");

        let record = criterion.to_dict();
        assert_eq!(record.description, "Randomization");
        assert_eq!(record.level, "High");
        assert_eq!(
            record.attributes,
            vec![("Must Have".to_string(), "random assignment used".to_string())]
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["attributes"][0][1], "random assignment used");
    }
}
