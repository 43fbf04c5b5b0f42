//! Generated scenes and their prompt state.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::keyframe::{KeyframeProvenance, KeyframeSet};
use crate::params::GenerationParams;
use crate::video::{VideoId, VideoInfo};

/// Unique identifier for a generated scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SceneId(pub String);

impl SceneId {
    /// Generate a new random scene ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SceneId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The prompt and parameters that produced a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PromptState {
    pub original_prompt: String,
    /// Mutated prompt from the feedback loop, if any retry has run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimized_prompt: Option<String>,
    pub params: GenerationParams,
}

impl PromptState {
    pub fn new(prompt: impl Into<String>, params: GenerationParams) -> Self {
        Self {
            original_prompt: prompt.into(),
            optimized_prompt: None,
            params,
        }
    }

    /// The prompt the next generation attempt should use.
    pub fn effective_prompt(&self) -> &str {
        self.optimized_prompt
            .as_deref()
            .unwrap_or(&self.original_prompt)
    }
}

/// One ordered unit of generated video in a sequence.
///
/// A scene is immutable once evaluated for a given retry attempt; a
/// regeneration produces a replacement scene at the same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Scene {
    pub id: SceneId,
    /// Sequence order, strictly increasing across a run
    pub order: u32,
    /// Identity of the rendered video data
    pub video: VideoId,
    /// Resolved stream info; probed on demand when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_info: Option<VideoInfo>,
    /// Textual description of the scene's content
    #[serde(default)]
    pub description: String,
    /// Keyframe sets by provenance (own / slice-original / predecessor)
    #[serde(default)]
    pub keyframes: Vec<KeyframeSet>,
    pub prompt: PromptState,
    pub created_at: DateTime<Utc>,
}

impl Scene {
    pub fn new(order: u32, video: VideoId, prompt: PromptState) -> Self {
        Self {
            id: SceneId::new(),
            order,
            video,
            video_info: None,
            description: String::new(),
            keyframes: Vec::new(),
            prompt,
            created_at: Utc::now(),
        }
    }

    /// Keyframe set from the given provenance, if one was attached.
    pub fn keyframes_from(&self, provenance: KeyframeProvenance) -> Option<&KeyframeSet> {
        self.keyframes.iter().find(|s| s.provenance == provenance)
    }

    /// The scene's own keyframes.
    pub fn own_keyframes(&self) -> Option<&KeyframeSet> {
        self.keyframes_from(KeyframeProvenance::Own)
    }

    /// Keyframes of the unedited source slice this scene came from.
    pub fn slice_keyframes(&self) -> Option<&KeyframeSet> {
        self.keyframes_from(KeyframeProvenance::SliceOriginal)
    }

    /// Attach a keyframe set, replacing any existing set from the same
    /// provenance.
    pub fn attach_keyframes(&mut self, set: KeyframeSet) {
        self.keyframes.retain(|s| s.provenance != set.provenance);
        self.keyframes.push(set);
    }
}
