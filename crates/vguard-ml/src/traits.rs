//! Collaborator contracts for model-backed scoring.
//!
//! The core never talks to an inference backend directly; it consumes these
//! traits so any backend (or a deterministic test fake) can slot in.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::error::MlResult;
use vguard_models::{FrameRef, Scene};

/// Pairwise image similarity in `[0, 1]`.
#[async_trait]
pub trait ImageSimilarity: Send + Sync {
    /// Embedding-level similarity between two frames. Used for keyframe
    /// continuity and multi-source comparisons.
    async fn embedding_similarity(&self, a: &FrameRef, b: &FrameRef) -> MlResult<f64>;

    /// Overall visual similarity between two frames: a blend of color
    /// histogram and structural similarity. Used for color/lighting and
    /// art-style comparisons.
    async fn visual_similarity(&self, a: &FrameRef, b: &FrameRef) -> MlResult<f64>;
}

/// What a vision-language model sees in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDescription {
    pub description: String,
    pub subjects: BTreeSet<String>,
    pub style: String,
}

/// Vision-language description of frames.
#[async_trait]
pub trait VisionLanguage: Send + Sync {
    async fn describe(&self, frame: &FrameRef) -> MlResult<FrameDescription>;
}

/// Coherence verdict from the language model.
#[derive(Debug, Clone, PartialEq)]
pub struct CoherenceScore {
    /// Coherence in `[0, 100]`
    pub score: f64,
    /// Remediation suggestions, most important first
    pub suggestions: Vec<String>,
}

/// Text-level scoring and prompt refinement.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Score narrative coherence between two scene descriptions.
    async fn score_coherence(&self, previous: &str, current: &str) -> MlResult<CoherenceScore>;

    /// Produce a refined generation prompt that addresses the given issues.
    async fn refine_prompt(&self, original: &str, issues: &[String]) -> MlResult<String>;
}

/// Opaque motion/logic estimators consumed by the temporal and style
/// checkers. Scores are in `[0, 1]`.
#[async_trait]
pub trait MotionAnalyzer: Send + Sync {
    /// How smoothly action carries across the scene boundary.
    async fn action_smoothness(&self, current: &Scene, previous: &Scene) -> MlResult<f64>;

    /// Whether events develop logically from the previous scene.
    async fn event_logic(&self, current: &Scene, previous: &Scene) -> MlResult<f64>;

    /// Whether the manner of motion matches the previous scene.
    async fn action_style(&self, current: &Scene, previous: &Scene) -> MlResult<f64>;
}
