//! Deterministic generation-parameter mutation.

use std::collections::BTreeSet;

use crate::classify;
use crate::config::AgentConfig;
use vguard_models::{GenerationParams, Issue, IssueTag};

/// Applies bounded additive nudges to generation parameters per issue tag.
/// Every nudge stays inside [0, 1]; the step sizes come from configuration.
#[derive(Debug, Clone)]
pub struct ParamMutator {
    style_strength_step: f64,
    keyframe_weight_step: f64,
    motion_blur_step: f64,
    content_weight_step: f64,
    context_weight_step: f64,
}

impl ParamMutator {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            style_strength_step: config.style_strength_step,
            keyframe_weight_step: config.keyframe_weight_step,
            motion_blur_step: config.motion_blur_step,
            content_weight_step: config.content_weight_step,
            context_weight_step: config.context_weight_step,
        }
    }

    /// Derive adjusted parameters from `params` for the given issues.
    ///
    /// Tags resolve through the single-tag classifier (first keyword match
    /// wins for untagged text); each triggered tag nudges its own knobs.
    pub fn adjust(&self, params: &GenerationParams, issues: &[Issue]) -> GenerationParams {
        if issues.is_empty() {
            return params.clone();
        }

        let tags: BTreeSet<IssueTag> = issues.iter().map(classify::effective_primary).collect();
        let mentions_keyframe = issues
            .iter()
            .any(|issue| issue.message.to_lowercase().contains("keyframe"));

        let mut adjusted = params.clone();

        if tags.contains(&IssueTag::Visual) || tags.contains(&IssueTag::Style) {
            adjusted = adjusted.boost_style_strength(self.style_strength_step);
            if mentions_keyframe {
                adjusted = adjusted.boost_keyframe_weight(self.keyframe_weight_step);
            }
        }
        if tags.contains(&IssueTag::Temporal) {
            adjusted = adjusted.boost_motion_blur(self.motion_blur_step);
        }
        if tags.contains(&IssueTag::Semantic) {
            adjusted = adjusted
                .boost_content_weight(self.content_weight_step)
                .boost_context_weight(self.context_weight_step);
        }

        adjusted
    }
}
