//! Deterministic fakes shared by unit tests.

use async_trait::async_trait;
use std::collections::BTreeSet;

use vguard_media::{FrameSource, MediaResult};
use vguard_ml::{
    CoherenceScore, FrameDescription, ImageSimilarity, LanguageModel, MlError, MlResult,
    MotionAnalyzer, VisionLanguage,
};
use vguard_models::{
    FrameRef, GenerationParams, PromptState, Scene, VideoId, VideoInfo,
};

/// Frame source returning synthetic frame paths and fixed stream info.
#[derive(Debug, Default)]
pub(crate) struct FakeFrameSource;

#[async_trait]
impl FrameSource for FakeFrameSource {
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

/// Similarity service returning a fixed score for every pair.
#[derive(Debug)]
pub(crate) struct FakeSimilarity {
    score: f64,
}

impl FakeSimilarity {
    pub(crate) fn fixed(score: f64) -> Self {
        Self { score }
    }
}

#[async_trait]
impl ImageSimilarity for FakeSimilarity {
    async fn embedding_similarity(&self, _a: &FrameRef, _b: &FrameRef) -> MlResult<f64> {
        Ok(self.score)
    }

    async fn visual_similarity(&self, _a: &FrameRef, _b: &FrameRef) -> MlResult<f64> {
        Ok(self.score)
    }
}

/// Language model returning a fixed coherence score; prompt refinement can
/// be made to fail to exercise the local fallback.
#[derive(Debug)]
pub(crate) struct FakeLanguage {
    score: f64,
    suggestions: Vec<String>,
    refine_fails: bool,
}

impl FakeLanguage {
    pub(crate) fn scoring(score: f64) -> Self {
        Self {
            score,
            suggestions: Vec::new(),
            refine_fails: false,
        }
    }

    pub(crate) fn with_failing_refinement(mut self) -> Self {
        self.refine_fails = true;
        self
    }
}

#[async_trait]
impl LanguageModel for FakeLanguage {
    async fn score_coherence(&self, _previous: &str, _current: &str) -> MlResult<CoherenceScore> {
        Ok(CoherenceScore {
            score: self.score,
            suggestions: self.suggestions.clone(),
        })
    }

    async fn refine_prompt(&self, original: &str, _issues: &[String]) -> MlResult<String> {
        if self.refine_fails {
            return Err(MlError::request_failed("refinement unavailable"));
        }
        Ok(format!("{} [refined]", original))
    }
}

/// Vision-language service with a canned description.
#[derive(Debug, Default)]
pub(crate) struct FakeVision;

#[async_trait]
impl VisionLanguage for FakeVision {
    async fn describe(&self, _frame: &FrameRef) -> MlResult<FrameDescription> {
        Ok(FrameDescription {
            description: "a harbor at dawn".to_string(),
            subjects: BTreeSet::from(["harbor".to_string()]),
            style: "watercolor".to_string(),
        })
    }
}

/// Motion analyzer with fixed estimates.
#[derive(Debug)]
pub(crate) struct FakeMotion {
    pub(crate) smoothness: f64,
    pub(crate) logic: f64,
    pub(crate) action_style: f64,
}

impl Default for FakeMotion {
    fn default() -> Self {
        Self {
            smoothness: 0.85,
            logic: 0.90,
            action_style: 0.85,
        }
    }
}

#[async_trait]
impl MotionAnalyzer for FakeMotion {
    async fn action_smoothness(&self, _current: &Scene, _previous: &Scene) -> MlResult<f64> {
        Ok(self.smoothness)
    }

    async fn event_logic(&self, _current: &Scene, _previous: &Scene) -> MlResult<f64> {
        Ok(self.logic)
    }

    async fn action_style(&self, _current: &Scene, _previous: &Scene) -> MlResult<f64> {
        Ok(self.action_style)
    }
}

pub(crate) fn make_scene(order: u32, video: &str, description: &str) -> Scene {
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

/// A scene at order 1 and its predecessor at order 0.
pub(crate) fn scene_with_predecessor_chain() -> (Scene, Scene) {
    let previous = make_scene(0, "/videos/scene_000.mp4", "boats resting in the harbor");
    let current = make_scene(1, "/videos/scene_001.mp4", "the harbor as the sun rises");
    (current, previous)
}
