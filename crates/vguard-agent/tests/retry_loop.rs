//! End-to-end acceptance loop against deterministic collaborators.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use vguard_agent::{
    AgentConfig, AgentResult, Collaborators, ConsistencyEvaluator, FeedbackGenerator,
    GenerationPipeline, KeyframeCache, RetryController,
};
use vguard_media::{MediaResult, FrameSource};
use vguard_ml::{
    CoherenceScore, FrameDescription, ImageSimilarity, LanguageModel, MlResult, MotionAnalyzer,
    VisionLanguage,
};
use vguard_models::{
    AcceptanceStatus, FrameRef, GenerationParams, PromptState, Scene, VideoId, VideoInfo,
};

struct SyntheticFrames;

#[async_trait]
impl FrameSource for SyntheticFrames {
    async fn extract_keyframes(&self, video: &VideoId, count: usize) -> MediaResult<Vec<FrameRef>> {
        Ok((0..count)
            .map(|i| FrameRef::new(format!("{}/kf_{}.jpg", video, i)))
            .collect())
    }

    async fn video_info(&self, _video: &VideoId) -> MediaResult<VideoInfo> {
        Ok(VideoInfo {
            width: 1920,
            height: 1080,
            fps: 30.0,
            duration: 5.0,
        })
    }
}

/// Frames from videos whose name contains "drifted" score low against
/// anything; all other pairs score high.
struct ContentSimilarity;

fn pair_score(a: &FrameRef, b: &FrameRef) -> f64 {
    let drifted = |f: &FrameRef| f.path().to_string_lossy().contains("drifted");
    if drifted(a) || drifted(b) {
        0.4
    } else {
        0.95
    }
}

#[async_trait]
impl ImageSimilarity for ContentSimilarity {
    async fn embedding_similarity(&self, a: &FrameRef, b: &FrameRef) -> MlResult<f64> {
        Ok(pair_score(a, b))
    }

    async fn visual_similarity(&self, a: &FrameRef, b: &FrameRef) -> MlResult<f64> {
        Ok(pair_score(a, b))
    }
}

/// Coherence keyed on the description text; counts calls so tests can
/// assert the evaluation bound.
struct ContentLanguage {
    coherence_calls: Arc<AtomicU32>,
}

#[async_trait]
impl LanguageModel for ContentLanguage {
    async fn score_coherence(&self, _previous: &str, current: &str) -> MlResult<CoherenceScore> {
        self.coherence_calls.fetch_add(1, Ordering::SeqCst);
        if current.contains("unrelated") {
            Ok(CoherenceScore {
                score: 55.0,
                suggestions: vec!["keep the subject consistent across scenes".to_string()],
            })
        } else {
            Ok(CoherenceScore {
                score: 92.0,
                suggestions: Vec::new(),
            })
        }
    }

    async fn refine_prompt(&self, original: &str, _issues: &[String]) -> MlResult<String> {
        Ok(format!("{} (hold continuity with the previous scene)", original))
    }
}

struct StaticVision;

#[async_trait]
impl VisionLanguage for StaticVision {
    async fn describe(&self, _frame: &FrameRef) -> MlResult<FrameDescription> {
        Ok(FrameDescription {
            description: "a harbor at dawn".to_string(),
            subjects: BTreeSet::from(["harbor".to_string()]),
            style: "watercolor".to_string(),
        })
    }
}

struct StaticMotion;

#[async_trait]
impl MotionAnalyzer for StaticMotion {
    async fn action_smoothness(&self, _c: &Scene, _p: &Scene) -> MlResult<f64> {
        Ok(0.85)
    }

    async fn event_logic(&self, _c: &Scene, _p: &Scene) -> MlResult<f64> {
        Ok(0.90)
    }

    async fn action_style(&self, _c: &Scene, _p: &Scene) -> MlResult<f64> {
        Ok(0.85)
    }
}

/// Pipeline whose regenerations converge (or refuse to converge).
struct ScriptedPipeline {
    predecessor: Scene,
    regenerations: AtomicU32,
    converges: bool,
}

#[async_trait]
impl GenerationPipeline for ScriptedPipeline {
    async fn regenerate(
        &self,
        order: u32,
        prompt: &str,
        params: &GenerationParams,
    ) -> AgentResult<Scene> {
        self.regenerations.fetch_add(1, Ordering::SeqCst);
        let (video, description) = if self.converges {
            ("/videos/scene_001_take2.mp4", "the harbor as the sun rises")
        } else {
            ("/videos/scene_001_drifted.mp4", "an unrelated city street")
        };
        let mut scene = Scene::new(
            order,
            VideoId::from(video),
            PromptState::new(prompt, params.clone()),
        );
        scene.description = description.to_string();
        scene.video_info = Some(VideoInfo {
            width: 1920,
            height: 1080,
            fps: 30.0,
            duration: 5.0,
        });
        Ok(scene)
    }

    async fn previous_scene(&self, _order: u32) -> AgentResult<Option<Scene>> {
        Ok(Some(self.predecessor.clone()))
    }
}

fn scene(order: u32, video: &str, description: &str) -> Scene {
    let mut scene = Scene::new(
        order,
        VideoId::from(video),
        PromptState::new("a quiet harbor at dawn", GenerationParams::default()),
    );
    scene.description = description.to_string();
    scene.video_info = Some(VideoInfo {
        width: 1920,
        height: 1080,
        fps: 30.0,
        duration: 5.0,
    });
    scene
}

fn build_controller(
    pipeline: Arc<ScriptedPipeline>,
    coherence_calls: Arc<AtomicU32>,
) -> RetryController {
    let config = AgentConfig::default();
    let cache = Arc::new(KeyframeCache::new(config.cache_expiry));
    let language: Arc<dyn LanguageModel> = Arc::new(ContentLanguage {
        coherence_calls: Arc::clone(&coherence_calls),
    });
    let collaborators = Collaborators {
        frames: Arc::new(SyntheticFrames),
        similarity: Arc::new(ContentSimilarity),
        language: Arc::clone(&language),
        vision: Arc::new(StaticVision),
        motion: Arc::new(StaticMotion),
    };
    let evaluator =
        ConsistencyEvaluator::new(&config, collaborators, Arc::clone(&cache)).unwrap();
    let feedback = FeedbackGenerator::new(&config, language);
    RetryController::new(evaluator, feedback, pipeline, cache, config.max_retries)
}

#[tokio::test]
async fn drifted_scene_is_regenerated_and_accepted() {
    let pipeline = Arc::new(ScriptedPipeline {
        predecessor: scene(0, "/videos/scene_000.mp4", "boats resting in the harbor"),
        regenerations: AtomicU32::new(0),
        converges: true,
    });
    let coherence_calls = Arc::new(AtomicU32::new(0));
    let controller = build_controller(Arc::clone(&pipeline), Arc::clone(&coherence_calls));

    let drifted = scene(
        1,
        "/videos/scene_001_drifted.mp4",
        "an unrelated city street",
    );
    let outcome = controller.run(drifted).await;

    assert_eq!(outcome.status, AcceptanceStatus::Accepted);
    assert_eq!(outcome.retry_count, 1);
    assert_eq!(pipeline.regenerations.load(Ordering::SeqCst), 1);

    // The accepted scene carries the mutated prompt state that produced it.
    let optimized = outcome.scene.prompt.optimized_prompt.as_deref().unwrap();
    assert!(optimized.contains("hold continuity"));

    let report = outcome.last_report.unwrap();
    assert!(report.passed);
    assert!(report.overall_score >= 0.85);
}

#[tokio::test]
async fn non_converging_pipeline_exhausts_within_budget() {
    let pipeline = Arc::new(ScriptedPipeline {
        predecessor: scene(0, "/videos/scene_000.mp4", "boats resting in the harbor"),
        regenerations: AtomicU32::new(0),
        converges: false,
    });
    let coherence_calls = Arc::new(AtomicU32::new(0));
    let controller = build_controller(Arc::clone(&pipeline), Arc::clone(&coherence_calls));

    let drifted = scene(
        1,
        "/videos/scene_001_drifted.mp4",
        "an unrelated city street",
    );
    let outcome = controller.run(drifted).await;

    assert_eq!(outcome.status, AcceptanceStatus::Exhausted);
    assert_eq!(outcome.retry_count, 3);
    assert_eq!(pipeline.regenerations.load(Ordering::SeqCst), 3);
    // At most max_retries + 1 evaluations; semantic coherence runs exactly
    // once per evaluation.
    assert_eq!(coherence_calls.load(Ordering::SeqCst), 4);

    let report = outcome.last_report.unwrap();
    assert!(!report.passed);
    assert!(!report.issues.is_empty());
    assert!(!outcome.suggestions.is_empty());
}

#[tokio::test]
async fn opening_scene_needs_no_predecessor() {
    let pipeline = Arc::new(ScriptedPipeline {
        predecessor: scene(0, "/videos/scene_000.mp4", "boats resting in the harbor"),
        regenerations: AtomicU32::new(0),
        converges: true,
    });
    let coherence_calls = Arc::new(AtomicU32::new(0));
    let controller = build_controller(Arc::clone(&pipeline), Arc::clone(&coherence_calls));

    let opening = scene(0, "/videos/scene_000_drifted.mp4", "an unrelated city street");
    let outcome = controller.run(opening).await;

    // Order 0 has no predecessor, so even a drifted scene passes vacuously.
    assert_eq!(outcome.status, AcceptanceStatus::Accepted);
    assert_eq!(outcome.retry_count, 0);
    assert_eq!(coherence_calls.load(Ordering::SeqCst), 0);
    assert_eq!(outcome.last_report.unwrap().overall_score, 1.0);
}
