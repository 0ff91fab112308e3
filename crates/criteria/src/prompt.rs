//! Prompt rendering for criterion checks.

use crate::criterion::Criterion;

/// Outcome of looking up a criterion for prompt generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriterionPrompt {
    /// The criterion exists; carries the rendered question.
    Found(String),
    /// No criterion matched; carries a placeholder question that can still
    /// be sent onward.
    NotFound(String),
}

impl CriterionPrompt {
    /// Placeholder for a description missing under `method`.
    pub fn not_found(method: &str, description: &str) -> Self {
        Self::NotFound(format!("No criterion found for {description} under {method}."))
    }

    /// Whether a criterion matched.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Prompt text, whichever variant.
    pub fn text(&self) -> &str {
        match self {
            Self::Found(text) | Self::NotFound(text) => text,
        }
    }

    /// Consume into the prompt text.
    pub fn into_text(self) -> String {
        match self {
            Self::Found(text) | Self::NotFound(text) => text,
        }
    }
}

/// Render the Yes/No question for one criterion.
pub fn render_prompt(criterion: &Criterion) -> String {
    let (must_have, other_criteria) = criterion.partition();

    let mut prompt = format!(
        "Please check if the article meets the following criterion:\n{}\n\n",
        criterion.description()
    );
    prompt.push_str("It must at least meet the following Must Have criteria:\n");

    if must_have.is_empty() {
        prompt.push_str("- No explicitly defined 'Must Have' criteria.\n");
    } else {
        prompt.push_str(&bullets(&must_have));
        prompt.push('\n');
    }

    if !other_criteria.is_empty() {
        prompt.push_str("\nIf one of these is missing, it can be replaced by at least two of the following:\n");
        prompt.push_str(&bullets(&other_criteria));
    }

    prompt.push_str("\n\nPlease return only the following: Yes or No, depending on the outcome.");
    prompt
}

fn bullets(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTRUCTION: &str = "Please return only the following: Yes or No, depending on the outcome.";

    #[test]
    fn test_prompt_with_must_have_and_others() {
        let mut criterion = Criterion::new("Randomization is performed", "High");
        criterion.add_attribute("Must Have", "A uses randomization");
        criterion.add_attribute("Should Have", "B has control group");
        criterion.add_attribute("Could Have", "C reports effect size");

        let prompt = render_prompt(&criterion);
        assert!(prompt.starts_with(
            "Please check if the article meets the following criterion:\nRandomization is performed\n\n"
        ));
        assert!(prompt.contains("- A uses randomization\n"));
        assert!(prompt.contains("replaced by at least two of the following:\n"));
        assert!(prompt.contains("- B has control group"));
        assert!(prompt.contains("- C reports effect size"));
        assert!(prompt.ends_with(INSTRUCTION));
    }

    #[test]
    fn test_prompt_without_must_have() {
        let mut criterion = Criterion::new("Reporting", "Low");
        criterion.add_attribute("Could Have", "effect sizes reported");

        let prompt = render_prompt(&criterion);
        assert!(prompt.contains("- No explicitly defined 'Must Have' criteria.\n"));
        assert!(prompt.contains("- effect sizes reported"));
    }

    #[test]
    fn test_prompt_without_others_has_no_substitution_clause() {
        let mut criterion = Criterion::new("Ethics", "High");
        criterion.add_attribute("MUST HAVE", "ethics approval stated");

        let prompt = render_prompt(&criterion);
        assert_eq!(
            prompt,
            "Please check if the article meets the following criterion:\nEthics\n\n\
             It must at least meet the following Must Have criteria:\n\
             - ethics approval stated\n\n\n\
             Please return only the following: Yes or No, depending on the outcome."
        );
    }

    #[test]
    fn test_not_found_placeholder() {
        let prompt = CriterionPrompt::not_found("Experiments", "Telepathy");
        assert!(!prompt.is_found());
        assert_eq!(prompt.text(), "No criterion found for Telepathy under Experiments.");
    }
}
