//! Retry controller: the top-level accept/regenerate loop.
//!
//! States: evaluating, then either accepted, or optimizing and
//! regenerating before the next evaluation, until the retry budget runs
//! out. The loop is strictly sequential; attempt n+1 never starts before
//! attempt n's evaluation and regeneration settle.

use std::sync::Arc;
use tracing::Instrument;

use crate::cache::KeyframeCache;
use crate::evaluator::ConsistencyEvaluator;
use crate::feedback::FeedbackGenerator;
use crate::logging::SceneLogger;
use crate::pipeline::GenerationPipeline;
use crate::planner::StrategyPlanner;
use vguard_models::{AcceptanceStatus, ConsistencyReport, Scene, SceneAcceptance};

/// Drives one scene through evaluation and bounded regeneration.
pub struct RetryController {
    evaluator: ConsistencyEvaluator,
    planner: StrategyPlanner,
    feedback: FeedbackGenerator,
    pipeline: Arc<dyn GenerationPipeline>,
    cache: Arc<KeyframeCache>,
    max_retries: u32,
}

/// Loop-local state for one scene's acceptance process. Discarded once the
/// scene is accepted or the budget is exhausted.
struct RetryState {
    scene: Scene,
    attempts: u32,
    last_report: Option<ConsistencyReport>,
}

impl RetryController {
    pub fn new(
        evaluator: ConsistencyEvaluator,
        feedback: FeedbackGenerator,
        pipeline: Arc<dyn GenerationPipeline>,
        cache: Arc<KeyframeCache>,
        max_retries: u32,
    ) -> Self {
        Self {
            evaluator,
            planner: StrategyPlanner::new(),
            feedback,
            pipeline,
            cache,
            max_retries,
        }
    }

    /// Run the acceptance loop for one scene.
    ///
    /// Terminates after at most `max_retries + 1` evaluations. Failures
    /// inside an iteration (predecessor lookup, regeneration) are logged,
    /// consume the attempt, and never escape; repeated regeneration
    /// failure therefore surfaces as exhaustion rather than looping
    /// forever.
    pub async fn run(&self, scene: Scene) -> SceneAcceptance {
        let logger = SceneLogger::new(scene.order, "acceptance");
        let span = logger.create_span();
        self.run_inner(scene, &logger).instrument(span).await
    }

    async fn run_inner(&self, scene: Scene, logger: &SceneLogger) -> SceneAcceptance {
        logger.log_start("consistency acceptance loop");

        let mut state = RetryState {
            scene,
            attempts: 0,
            last_report: None,
        };

        loop {
            let previous = match state.scene.order.checked_sub(1) {
                None => None,
                Some(prev_order) => match self.pipeline.previous_scene(prev_order).await {
                    Ok(previous) => previous,
                    Err(e) => {
                        logger.log_warning(&format!("predecessor lookup failed: {}", e));
                        if state.attempts >= self.max_retries {
                            return self.exhausted(state, logger);
                        }
                        state.attempts += 1;
                        continue;
                    }
                },
            };

            let report = self
                .evaluator
                .evaluate(&state.scene, previous.as_ref())
                .await;
            logger.log_attempt(state.attempts, report.overall_score, report.passed);

            if report.passed {
                logger.log_completion("scene accepted");
                let strategy = self.planner.plan(&report);
                let suggestions = self.feedback.suggestions_for(&report.issues);
                return SceneAcceptance {
                    status: AcceptanceStatus::Accepted,
                    scene: state.scene,
                    retry_count: state.attempts,
                    last_report: Some(report),
                    strategy: Some(strategy),
                    suggestions,
                };
            }

            if state.attempts >= self.max_retries {
                state.last_report = Some(report);
                return self.exhausted(state, logger);
            }

            let feedback = self
                .feedback
                .generate(
                    &report,
                    state.scene.prompt.effective_prompt(),
                    &state.scene.prompt.params,
                )
                .await;

            match self
                .pipeline
                .regenerate(
                    state.scene.order,
                    &feedback.optimized_prompt,
                    &feedback.optimized_params,
                )
                .await
            {
                Ok(mut regenerated) => {
                    // A re-render may reuse the video identity; stale frames
                    // must not survive it.
                    self.cache.invalidate(&state.scene.video).await;
                    // The replacement scene records the mutated state that
                    // produced it, whatever the pipeline filled in.
                    regenerated.prompt.optimized_prompt =
                        Some(feedback.optimized_prompt.clone());
                    regenerated.prompt.params = feedback.optimized_params.clone();
                    state.scene = regenerated;
                }
                Err(e) => {
                    logger.log_error(&format!("regeneration failed: {}", e));
                    // The rejected scene stays; the budget still burns down.
                }
            }

            state.last_report = Some(report);
            state.attempts += 1;
        }
    }

    fn exhausted(&self, state: RetryState, logger: &SceneLogger) -> SceneAcceptance {
        logger.log_completion("retry budget exhausted");
        let strategy = state.last_report.as_ref().map(|r| self.planner.plan(r));
        let suggestions = state
            .last_report
            .as_ref()
            .map(|r| self.feedback.suggestions_for(&r.issues))
            .unwrap_or_default();

        SceneAcceptance {
            status: AcceptanceStatus::Exhausted,
            scene: state.scene,
            retry_count: state.attempts,
            last_report: state.last_report,
            strategy,
            suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::KeyframeCache;
    use crate::config::AgentConfig;
    use crate::error::{AgentError, AgentResult};
    use crate::evaluator::Collaborators;
    use crate::testutil::{
        make_scene, FakeFrameSource, FakeLanguage, FakeMotion, FakeSimilarity, FakeVision,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use vguard_models::GenerationParams;

    /// Pipeline whose regenerated scenes can be good or bad; counts calls.
    struct FakePipeline {
        predecessor: Option<Scene>,
        regenerated_video: String,
        regenerations: AtomicU32,
        fail_regeneration: bool,
    }

    impl FakePipeline {
        fn new(predecessor: Option<Scene>, regenerated_video: &str) -> Self {
            Self {
                predecessor,
                regenerated_video: regenerated_video.to_string(),
                regenerations: AtomicU32::new(0),
                fail_regeneration: false,
            }
        }

        fn failing(predecessor: Option<Scene>) -> Self {
            Self {
                predecessor,
                regenerated_video: String::new(),
                regenerations: AtomicU32::new(0),
                fail_regeneration: true,
            }
        }
    }

    #[async_trait]
    impl GenerationPipeline for FakePipeline {
        async fn regenerate(
            &self,
            order: u32,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> AgentResult<Scene> {
            self.regenerations.fetch_add(1, Ordering::SeqCst);
            if self.fail_regeneration {
                return Err(AgentError::regeneration_failed("render farm offline"));
            }
            Ok(make_scene(order, &self.regenerated_video, "the harbor again"))
        }

        async fn previous_scene(&self, _order: u32) -> AgentResult<Option<Scene>> {
            Ok(self.predecessor.clone())
        }
    }

    fn controller(similarity_score: f64, pipeline: Arc<FakePipeline>) -> RetryController {
        let config = AgentConfig::default();
        let cache = Arc::new(KeyframeCache::new(config.cache_expiry));
        let collaborators = Collaborators {
            frames: Arc::new(FakeFrameSource::default()),
            similarity: Arc::new(FakeSimilarity::fixed(similarity_score)),
            language: Arc::new(FakeLanguage::scoring(95.0)),
            vision: Arc::new(FakeVision::default()),
            motion: Arc::new(FakeMotion::default()),
        };
        let evaluator =
            ConsistencyEvaluator::new(&config, collaborators, Arc::clone(&cache)).unwrap();
        let feedback =
            FeedbackGenerator::new(&config, Arc::new(FakeLanguage::scoring(95.0)));
        RetryController::new(evaluator, feedback, pipeline, cache, config.max_retries)
    }

    #[tokio::test]
    async fn test_first_scene_accepted_without_retries() {
        let pipeline = Arc::new(FakePipeline::new(None, "/videos/unused.mp4"));
        let controller = controller(0.1, Arc::clone(&pipeline));
        let scene = make_scene(0, "/videos/scene_000.mp4", "opening shot");

        let outcome = controller.run(scene).await;
        assert_eq!(outcome.status, AcceptanceStatus::Accepted);
        assert_eq!(outcome.retry_count, 0);
        assert_eq!(outcome.last_report.unwrap().overall_score, 1.0);
        assert_eq!(pipeline.regenerations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exhaustion_is_bounded_by_the_budget() {
        let predecessor = make_scene(0, "/videos/scene_000.mp4", "opening shot");
        let pipeline = Arc::new(FakePipeline::new(
            Some(predecessor),
            "/videos/still_bad.mp4",
        ));
        // Similarity low enough that every attempt fails.
        let controller = controller(0.2, Arc::clone(&pipeline));
        let scene = make_scene(1, "/videos/scene_001.mp4", "second shot");

        let outcome = controller.run(scene).await;
        assert_eq!(outcome.status, AcceptanceStatus::Exhausted);
        assert_eq!(outcome.retry_count, 3);
        assert_eq!(pipeline.regenerations.load(Ordering::SeqCst), 3);
        let report = outcome.last_report.expect("exhaustion keeps the last report");
        assert!(!report.passed);
        assert!(!outcome.suggestions.is_empty());
        assert!(matches!(
            outcome.strategy,
            Some(vguard_models::OptimizationStrategy::Optimize { .. })
        ));
    }

    #[tokio::test]
    async fn test_repeated_regeneration_failure_exhausts() {
        let predecessor = make_scene(0, "/videos/scene_000.mp4", "opening shot");
        let pipeline = Arc::new(FakePipeline::failing(Some(predecessor)));
        let controller = controller(0.2, Arc::clone(&pipeline));
        let scene = make_scene(1, "/videos/scene_001.mp4", "second shot");

        let outcome = controller.run(scene).await;
        assert_eq!(outcome.status, AcceptanceStatus::Exhausted);
        // The loop never hangs on a dead pipeline.
        assert_eq!(pipeline.regenerations.load(Ordering::SeqCst), 3);
        // The original scene is kept when regeneration never succeeds.
        assert_eq!(outcome.scene.video.as_str(), "/videos/scene_001.mp4");
    }
}
