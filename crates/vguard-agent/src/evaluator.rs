//! Consistency evaluator: concurrent fan-out over the four dimension
//! checkers, fan-in, weighted aggregation, and the pass/fail gate.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::cache::KeyframeCache;
use crate::checkers::{SemanticChecker, StyleChecker, TemporalChecker, VisualChecker};
use crate::config::AgentConfig;
use crate::error::AgentResult;
use vguard_media::FrameSource;
use vguard_ml::{ImageSimilarity, LanguageModel, MotionAnalyzer, VisionLanguage};
use vguard_models::{ConsistencyReport, ConsistencyWeights, Dimension, DimensionResult, Scene};

/// External collaborators the evaluator fans out to.
#[derive(Clone)]
pub struct Collaborators {
    pub frames: Arc<dyn FrameSource>,
    pub similarity: Arc<dyn ImageSimilarity>,
    pub language: Arc<dyn LanguageModel>,
    pub vision: Arc<dyn VisionLanguage>,
    pub motion: Arc<dyn MotionAnalyzer>,
}

/// Evaluates scene-to-scene consistency across all four dimensions.
pub struct ConsistencyEvaluator {
    visual: VisualChecker,
    temporal: TemporalChecker,
    semantic: SemanticChecker,
    style: StyleChecker,
    weights: ConsistencyWeights,
    threshold: f64,
    check_timeout: Duration,
}

impl ConsistencyEvaluator {
    /// Build an evaluator. Rejects invalid configuration (weights that do
    /// not sum to 1.0, thresholds outside [0, 1]) instead of normalizing.
    pub fn new(
        config: &AgentConfig,
        collaborators: Collaborators,
        cache: Arc<KeyframeCache>,
    ) -> AgentResult<Self> {
        config.validate()?;

        let Collaborators {
            frames,
            similarity,
            language,
            vision,
            motion,
        } = collaborators;

        Ok(Self {
            visual: VisualChecker::new(
                Arc::clone(&similarity),
                Arc::clone(&frames),
                Arc::clone(&cache),
                config.visual_threshold,
                config.num_keyframes,
            ),
            temporal: TemporalChecker::new(
                Arc::clone(&frames),
                Arc::clone(&motion),
                config.temporal_threshold,
            ),
            semantic: SemanticChecker::new(
                language,
                vision,
                Arc::clone(&frames),
                Arc::clone(&cache),
                config.semantic_threshold,
                config.num_keyframes,
            ),
            style: StyleChecker::new(
                similarity,
                motion,
                frames,
                cache,
                config.style_threshold,
                config.num_keyframes,
            ),
            weights: config.weights,
            threshold: config.consistency_threshold,
            check_timeout: config.check_timeout,
        })
    }

    /// Evaluate a scene against its predecessor.
    ///
    /// Without a predecessor the report is a vacuous pass. Otherwise all
    /// four checks run concurrently and the result is assembled once every
    /// check has settled; a slow or failed check degrades its own
    /// dimension without blocking the others.
    pub async fn evaluate(&self, current: &Scene, previous: Option<&Scene>) -> ConsistencyReport {
        let Some(previous) = previous else {
            debug!(scene = current.order, "No predecessor; vacuous pass");
            return ConsistencyReport::vacuous_pass();
        };

        let (visual, temporal, semantic, style) = tokio::join!(
            self.with_deadline(Dimension::Visual, self.visual.check(current, previous)),
            self.with_deadline(Dimension::Temporal, self.temporal.check(current, previous)),
            self.with_deadline(Dimension::Semantic, self.semantic.check(current, previous)),
            self.with_deadline(Dimension::Style, self.style.check(current, previous)),
        );

        let overall_score = self.weights.apply(
            visual.score,
            temporal.score,
            semantic.score,
            style.score,
        );
        let passed = overall_score >= self.threshold;

        // Union of issues from non-passing checkers, in dimension order.
        let mut issues = Vec::new();
        for result in [&visual, &temporal, &semantic, &style] {
            if !result.passed {
                issues.extend(result.issues.iter().cloned());
            }
        }

        info!(
            scene = current.order,
            overall = overall_score,
            passed,
            issues = issues.len(),
            "Consistency evaluation complete"
        );

        ConsistencyReport {
            visual,
            temporal,
            semantic,
            style,
            overall_score,
            passed,
            issues,
        }
    }

    /// Bound a checker with the configured deadline; a timeout degrades
    /// that dimension instead of hanging the evaluation.
    async fn with_deadline(
        &self,
        dimension: Dimension,
        check: impl Future<Output = DimensionResult>,
    ) -> DimensionResult {
        match timeout(self.check_timeout, check).await {
            Ok(result) => result,
            Err(_) => DimensionResult::degraded(
                dimension,
                format!(
                    "{} check timed out after {:?}",
                    dimension, self.check_timeout
                ),
            ),
        }
    }
}
