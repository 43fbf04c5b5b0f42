//! Generation parameters and their bounded mutations.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Numeric/categorical knobs handed to the generation pipeline.
///
/// Every numeric knob lives in `[0, 1]`. Mutation methods consume the value
/// and return a new one; a scene's params are never edited in place, so a
/// prior scene's recorded params stay untouched across retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GenerationParams {
    /// How strongly the style reference constrains generation
    pub style_strength: f64,
    /// Weight of keyframe anchors during generation
    pub keyframe_weight: f64,
    /// Motion blur amount
    pub motion_blur: f64,
    /// Weight of the scene's own content description
    pub content_weight: f64,
    /// Weight of surrounding-scene context
    pub context_weight: f64,
    /// Random seed; `None` lets the pipeline pick a fresh one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            style_strength: 0.5,
            keyframe_weight: 0.5,
            motion_blur: 0.3,
            content_weight: 0.5,
            context_weight: 0.3,
            seed: None,
        }
    }
}

fn clamp_unit(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

impl GenerationParams {
    /// Raise style strength by `step`, clamped to `[0, 1]`.
    pub fn boost_style_strength(mut self, step: f64) -> Self {
        self.style_strength = clamp_unit(self.style_strength + step);
        self
    }

    /// Raise keyframe weight by `step`, clamped to `[0, 1]`.
    pub fn boost_keyframe_weight(mut self, step: f64) -> Self {
        self.keyframe_weight = clamp_unit(self.keyframe_weight + step);
        self
    }

    /// Raise motion blur by `step`, clamped to `[0, 1]`.
    pub fn boost_motion_blur(mut self, step: f64) -> Self {
        self.motion_blur = clamp_unit(self.motion_blur + step);
        self
    }

    /// Raise content weight by `step`, clamped to `[0, 1]`.
    pub fn boost_content_weight(mut self, step: f64) -> Self {
        self.content_weight = clamp_unit(self.content_weight + step);
        self
    }

    /// Raise context weight by `step`, clamped to `[0, 1]`.
    pub fn boost_context_weight(mut self, step: f64) -> Self {
        self.context_weight = clamp_unit(self.context_weight + step);
        self
    }

    /// Reset the knobs that drive diversity for a fresh retry: clear the
    /// seed and restore baseline strength and keyframe weight.
    pub fn reset_for_retry(mut self) -> Self {
        let baseline = GenerationParams::default();
        self.seed = None;
        self.style_strength = baseline.style_strength;
        self.keyframe_weight = baseline.keyframe_weight;
        self
    }
}
