//! Feedback generation: mutated prompts, mutated parameters, and
//! human-readable suggestions for a failed report.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::classify;
use crate::config::AgentConfig;
use vguard_ml::LanguageModel;
use vguard_models::{ConsistencyReport, GenerationParams, Issue, IssueTag};

pub mod params;
pub mod prompt;

pub use params::ParamMutator;
pub use prompt::PromptMutator;

/// What the feedback stage hands back to the retry controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub optimized_prompt: String,
    pub optimized_params: GenerationParams,
    pub suggestions: Vec<String>,
}

/// Produces a mutated prompt and parameter set for a failed report.
pub struct FeedbackGenerator {
    language: Arc<dyn LanguageModel>,
    prompt_mutator: PromptMutator,
    param_mutator: ParamMutator,
}

impl FeedbackGenerator {
    pub fn new(config: &AgentConfig, language: Arc<dyn LanguageModel>) -> Self {
        Self {
            language,
            prompt_mutator: PromptMutator::new(),
            param_mutator: ParamMutator::new(config),
        }
    }

    /// Generate feedback for `report`. With no issues the inputs come back
    /// unchanged.
    pub async fn generate(
        &self,
        report: &ConsistencyReport,
        original_prompt: &str,
        original_params: &GenerationParams,
    ) -> Feedback {
        if report.issues.is_empty() {
            return Feedback {
                optimized_prompt: original_prompt.to_string(),
                optimized_params: original_params.clone(),
                suggestions: Vec::new(),
            };
        }

        let locally_mutated = self
            .prompt_mutator
            .apply_constraints(original_prompt, &report.issues);

        // The language model gets the final word on the prompt; when it is
        // unavailable the locally appended constraints stand.
        let issue_texts: Vec<String> = report
            .issues
            .iter()
            .map(|issue| issue.message.clone())
            .collect();
        let optimized_prompt = match self
            .language
            .refine_prompt(original_prompt, &issue_texts)
            .await
        {
            Ok(refined) if !refined.trim().is_empty() => refined,
            Ok(_) => locally_mutated,
            Err(e) => {
                warn!(error = %e, "Prompt refinement unavailable; using local constraints");
                locally_mutated
            }
        };

        let optimized_params = self.param_mutator.adjust(original_params, &report.issues);
        let suggestions = self.suggestions_for(&report.issues);

        debug!(
            issues = report.issues.len(),
            suggestions = suggestions.len(),
            "Feedback generated"
        );

        Feedback {
            optimized_prompt,
            optimized_params,
            suggestions,
        }
    }

    /// Per-issue remediation suggestions from fixed templates. Pure; the
    /// controller also uses it to annotate exhausted outcomes.
    pub fn suggestions_for(&self, issues: &[Issue]) -> Vec<String> {
        issues
            .iter()
            .filter_map(|issue| suggestion_for(issue))
            .collect()
    }
}

fn suggestion_for(issue: &Issue) -> Option<String> {
    let text = issue.message.to_lowercase();
    let suggestion = match classify::effective_primary(issue) {
        IssueTag::Visual => {
            if text.contains("keyframe") {
                "Increase keyframe weight so consecutive scenes stay anchored to the same frames."
            } else if text.contains("resolution") {
                "Render every scene at the same resolution."
            } else if text.contains("color") {
                "Align color grading with the previous scene."
            } else if text.contains("lighting") {
                "Keep lighting direction and intensity consistent."
            } else {
                "Tighten visual parameters to improve scene-to-scene consistency."
            }
        }
        IssueTag::Temporal => {
            if text.contains("motion") || text.contains("smooth") {
                "Smooth the action across the scene boundary."
            } else if text.contains("timing") || text.contains("timeline") {
                "Align timing parameters so the timeline stays continuous."
            } else if text.contains("logic") {
                "Restructure the scene so events follow logically from the previous one."
            } else {
                "Tune temporal parameters to improve flow between scenes."
            }
        }
        IssueTag::Semantic => {
            if text.contains("subject") {
                "Keep the same subjects across scenes, including characters and objects."
            } else if text.contains("relationship") {
                "Keep relationships between subjects consistent across scenes."
            } else if text.contains("content") {
                "Align scene content with the running theme."
            } else {
                "Strengthen content coherence with the previous scene."
            }
        }
        IssueTag::Style => {
            if text.contains("tone") || text.contains("palette") {
                "Match the previous scene's palette and tonal treatment."
            } else if text.contains("style") {
                "Raise style strength so scenes share one art style."
            } else {
                "Tune style parameters to unify the look across scenes."
            }
        }
        IssueTag::Other => return None,
    };
    Some(suggestion.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeLanguage;
    use vguard_models::ConsistencyReport;

    fn failing_report(issues: Vec<Issue>) -> ConsistencyReport {
        let mut report = ConsistencyReport::vacuous_pass();
        report.passed = false;
        report.issues = issues;
        report
    }

    #[tokio::test]
    async fn test_clean_report_returns_inputs_unchanged() {
        let generator = FeedbackGenerator::new(
            &AgentConfig::default(),
            Arc::new(FakeLanguage::scoring(95.0)),
        );
        let report = ConsistencyReport::vacuous_pass();
        let params = GenerationParams::default();

        let feedback = generator.generate(&report, "a harbor", &params).await;
        assert_eq!(feedback.optimized_prompt, "a harbor");
        assert_eq!(feedback.optimized_params, params);
        assert!(feedback.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_refined_prompt_wins_when_model_answers() {
        let generator = FeedbackGenerator::new(
            &AgentConfig::default(),
            Arc::new(FakeLanguage::scoring(50.0)),
        );
        let report = failing_report(vec![Issue::new(
            IssueTag::Style,
            "art style varies between scenes",
        )]);

        let feedback = generator
            .generate(&report, "a harbor", &GenerationParams::default())
            .await;
        assert_eq!(feedback.optimized_prompt, "a harbor [refined]");
    }

    #[tokio::test]
    async fn test_local_constraints_survive_model_failure() {
        let generator = FeedbackGenerator::new(
            &AgentConfig::default(),
            Arc::new(FakeLanguage::scoring(50.0).with_failing_refinement()),
        );
        let report = failing_report(vec![Issue::new(
            IssueTag::Style,
            "art style varies between scenes",
        )]);

        let feedback = generator
            .generate(&report, "a harbor", &GenerationParams::default())
            .await;
        assert!(feedback.optimized_prompt.starts_with("a harbor"));
        assert!(feedback
            .optimized_prompt
            .contains("art style, color palette"));
    }

    #[tokio::test]
    async fn test_suggestions_follow_issue_keywords() {
        let generator = FeedbackGenerator::new(
            &AgentConfig::default(),
            Arc::new(FakeLanguage::scoring(50.0)),
        );
        let suggestions = generator.suggestions_for(&[
            Issue::new(IssueTag::Visual, "keyframe continuity broke"),
            Issue::new(IssueTag::Temporal, "motion is not smooth"),
            Issue::untagged("nothing matches here"),
        ]);

        assert_eq!(suggestions.len(), 2);
        assert!(suggestions[0].contains("keyframe weight"));
        assert!(suggestions[1].contains("Smooth the action"));
    }
}
