//! Semantic consistency checker.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::KeyframeCache;
use crate::checkers::resolve_own_keyframes;
use crate::error::AgentResult;
use vguard_media::FrameSource;
use vguard_ml::{LanguageModel, VisionLanguage};
use vguard_models::{Dimension, DimensionResult, DimensionScores, Issue, IssueTag, Scene};

/// Scores content coherence between two scenes' textual descriptions via
/// the language model. Scenes without a description get one from the
/// vision-language collaborator using the first own keyframe.
pub struct SemanticChecker {
    language: Arc<dyn LanguageModel>,
    vision: Arc<dyn VisionLanguage>,
    frames: Arc<dyn FrameSource>,
    cache: Arc<KeyframeCache>,
    threshold: f64,
    num_keyframes: usize,
}

impl SemanticChecker {
    pub fn new(
        language: Arc<dyn LanguageModel>,
        vision: Arc<dyn VisionLanguage>,
        frames: Arc<dyn FrameSource>,
        cache: Arc<KeyframeCache>,
        threshold: f64,
        num_keyframes: usize,
    ) -> Self {
        Self {
            language,
            vision,
            frames,
            cache,
            threshold,
            num_keyframes,
        }
    }

    /// Run the check. Collaborator failures degrade to a failed result.
    pub async fn check(&self, current: &Scene, previous: &Scene) -> DimensionResult {
        match self.evaluate(current, previous).await {
            Ok(result) => result,
            Err(e) => DimensionResult::degraded(
                Dimension::Semantic,
                format!("semantic consistency check failed: {}", e),
            ),
        }
    }

    async fn evaluate(&self, current: &Scene, previous: &Scene) -> AgentResult<DimensionResult> {
        let current_desc = self.description_for(current).await;
        let previous_desc = self.description_for(previous).await;

        let coherence = self
            .language
            .score_coherence(&previous_desc, &current_desc)
            .await?;
        // The model scores 0-100; normalize into the unit interval.
        let score = (coherence.score / 100.0).clamp(0.0, 1.0);

        debug!(
            scene = current.order,
            score,
            suggestions = coherence.suggestions.len(),
            "Semantic check complete"
        );

        let passed = score >= self.threshold;
        let mut issues = Vec::new();
        if !passed {
            // Model suggestions are free text; they enter untagged so the
            // keyword fallback classifies them downstream.
            issues.extend(coherence.suggestions.into_iter().map(Issue::untagged));
            issues.push(Issue::new(
                IssueTag::Semantic,
                "scene content coherence below threshold",
            ));
        }

        Ok(DimensionResult {
            dimension: Dimension::Semantic,
            score,
            success: true,
            passed,
            issues,
            scores: Some(DimensionScores::Semantic { coherence: score }),
        })
    }

    /// The scene's description, or a vision-language description of its
    /// first keyframe when none was recorded. Description failures fall
    /// back to empty text rather than failing the whole check.
    async fn description_for(&self, scene: &Scene) -> String {
        if !scene.description.is_empty() {
            return scene.description.clone();
        }

        let frames =
            match resolve_own_keyframes(scene, &self.cache, &self.frames, self.num_keyframes).await
            {
                Ok(frames) => frames,
                Err(e) => {
                    warn!(scene = scene.order, error = %e, "No keyframes for description");
                    return String::new();
                }
            };

        let Some(first) = frames.first() else {
            return String::new();
        };

        match self.vision.describe(first).await {
            Ok(description) => description.description,
            Err(e) => {
                warn!(scene = scene.order, error = %e, "Frame description failed");
                String::new()
            }
        }
    }
}
