//! Prompt mutation.

use std::collections::BTreeSet;

use crate::classify;
use vguard_models::{Issue, IssueTag};

const CONTINUITY_CONSTRAINT: &str =
    "Keep timing and action continuous with the previous scene; events must follow logically.";

const STYLE_CONSTRAINT: &str =
    "Match the previous scene's art style, color palette, and visual treatment.";

const SUBJECT_CONSTRAINT: &str =
    "Keep the subjects consistent across scenes, including characters, objects, and setting.";

/// Appends targeted natural-language constraints to a prompt based on
/// which issues were raised. The language model refines the result
/// afterwards; this local text is also the fallback when refinement is
/// unavailable.
#[derive(Debug, Default, Clone)]
pub struct PromptMutator;

impl PromptMutator {
    pub fn new() -> Self {
        Self
    }

    /// Append the constraints warranted by `issues` to `prompt`.
    pub fn apply_constraints(&self, prompt: &str, issues: &[Issue]) -> String {
        let mut tags: BTreeSet<IssueTag> = BTreeSet::new();
        let mut mentions_subject = false;
        for issue in issues {
            tags.extend(classify::effective_tags(issue));
            if issue.message.to_lowercase().contains("subject") {
                mentions_subject = true;
            }
        }

        let mut mutated = prompt.to_string();
        if tags.contains(&IssueTag::Temporal) {
            mutated.push_str("\n\n");
            mutated.push_str(CONTINUITY_CONSTRAINT);
        }
        if tags.contains(&IssueTag::Style) {
            mutated.push_str("\n\n");
            mutated.push_str(STYLE_CONSTRAINT);
        }
        if mentions_subject || tags.contains(&IssueTag::Semantic) {
            mutated.push_str("\n\n");
            mutated.push_str(SUBJECT_CONSTRAINT);
        }
        mutated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_issues_leaves_prompt_unchanged() {
        let mutator = PromptMutator::new();
        assert_eq!(mutator.apply_constraints("a harbor", &[]), "a harbor");
    }

    #[test]
    fn test_temporal_issue_appends_continuity_constraint() {
        let mutator = PromptMutator::new();
        let mutated = mutator.apply_constraints(
            "a harbor",
            &[Issue::new(IssueTag::Temporal, "timing drift between scenes")],
        );
        assert!(mutated.starts_with("a harbor"));
        assert!(mutated.contains(CONTINUITY_CONSTRAINT));
        assert!(!mutated.contains(STYLE_CONSTRAINT));
    }

    #[test]
    fn test_subject_mention_appends_subject_constraint() {
        let mutator = PromptMutator::new();
        let mutated = mutator.apply_constraints(
            "a harbor",
            &[Issue::untagged("the main subject changes between scenes")],
        );
        assert!(mutated.contains(SUBJECT_CONSTRAINT));
    }

    #[test]
    fn test_multiple_tags_stack_constraints() {
        let mutator = PromptMutator::new();
        let mutated = mutator.apply_constraints(
            "a harbor",
            &[
                Issue::new(IssueTag::Style, "art style varies between scenes"),
                Issue::new(IssueTag::Temporal, "motion is not smooth"),
            ],
        );
        assert!(mutated.contains(CONTINUITY_CONSTRAINT));
        assert!(mutated.contains(STYLE_CONSTRAINT));
    }
}
