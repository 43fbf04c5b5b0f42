//! Agent configuration.

use std::time::Duration;

use crate::error::{AgentError, AgentResult};
use vguard_models::ConsistencyWeights;

/// Configuration for the consistency agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Minimum weighted overall score to accept a scene
    pub consistency_threshold: f64,
    /// Per-dimension aggregation weights; must sum to 1.0
    pub weights: ConsistencyWeights,
    /// Per-dimension pass thresholds
    pub visual_threshold: f64,
    pub temporal_threshold: f64,
    pub semantic_threshold: f64,
    pub style_threshold: f64,
    /// Keyframes extracted per video
    pub num_keyframes: usize,
    /// Maximum regeneration attempts before giving up
    pub max_retries: u32,
    /// Parameter-mutation step sizes, all applied within [0, 1]
    pub style_strength_step: f64,
    pub keyframe_weight_step: f64,
    pub motion_blur_step: f64,
    pub content_weight_step: f64,
    pub context_weight_step: f64,
    /// Deadline for a single dimension check, external calls included
    pub check_timeout: Duration,
    /// Advisory keyframe-cache expiry; the cache itself never self-expires
    pub cache_expiry: Duration,
    /// Work directory for extracted frames
    pub work_dir: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            consistency_threshold: 0.85,
            weights: ConsistencyWeights::default(),
            visual_threshold: 0.8,
            temporal_threshold: 0.8,
            semantic_threshold: 0.85,
            style_threshold: 0.8,
            num_keyframes: 2,
            max_retries: 3,
            style_strength_step: 0.1,
            keyframe_weight_step: 0.2,
            motion_blur_step: 0.1,
            content_weight_step: 0.1,
            context_weight_step: 0.2,
            check_timeout: Duration::from_secs(30),
            cache_expiry: Duration::from_secs(3600),
            work_dir: "/tmp/vguard".to_string(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl AgentConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            consistency_threshold: env_parse(
                "VGUARD_CONSISTENCY_THRESHOLD",
                defaults.consistency_threshold,
            ),
            weights: ConsistencyWeights {
                visual: env_parse("VGUARD_WEIGHT_VISUAL", defaults.weights.visual),
                temporal: env_parse("VGUARD_WEIGHT_TEMPORAL", defaults.weights.temporal),
                semantic: env_parse("VGUARD_WEIGHT_SEMANTIC", defaults.weights.semantic),
                style: env_parse("VGUARD_WEIGHT_STYLE", defaults.weights.style),
            },
            visual_threshold: env_parse("VGUARD_VISUAL_THRESHOLD", defaults.visual_threshold),
            temporal_threshold: env_parse("VGUARD_TEMPORAL_THRESHOLD", defaults.temporal_threshold),
            semantic_threshold: env_parse("VGUARD_SEMANTIC_THRESHOLD", defaults.semantic_threshold),
            style_threshold: env_parse("VGUARD_STYLE_THRESHOLD", defaults.style_threshold),
            num_keyframes: env_parse("VGUARD_NUM_KEYFRAMES", defaults.num_keyframes),
            max_retries: env_parse("VGUARD_MAX_RETRIES", defaults.max_retries),
            style_strength_step: env_parse(
                "VGUARD_STYLE_STRENGTH_STEP",
                defaults.style_strength_step,
            ),
            keyframe_weight_step: env_parse(
                "VGUARD_KEYFRAME_WEIGHT_STEP",
                defaults.keyframe_weight_step,
            ),
            motion_blur_step: env_parse("VGUARD_MOTION_BLUR_STEP", defaults.motion_blur_step),
            content_weight_step: env_parse(
                "VGUARD_CONTENT_WEIGHT_STEP",
                defaults.content_weight_step,
            ),
            context_weight_step: env_parse(
                "VGUARD_CONTEXT_WEIGHT_STEP",
                defaults.context_weight_step,
            ),
            check_timeout: Duration::from_secs(env_parse("VGUARD_CHECK_TIMEOUT_SECS", 30)),
            cache_expiry: Duration::from_secs(env_parse("VGUARD_CACHE_EXPIRY_SECS", 3600)),
            work_dir: std::env::var("VGUARD_WORK_DIR")
                .unwrap_or_else(|_| defaults.work_dir.clone()),
        }
    }

    /// Validate the configuration. Invalid weights or thresholds are
    /// rejected here, never silently normalized.
    pub fn validate(&self) -> AgentResult<()> {
        self.weights
            .validate()
            .map_err(|e| AgentError::config_error(e.to_string()))?;

        for (name, value) in [
            ("consistency_threshold", self.consistency_threshold),
            ("visual_threshold", self.visual_threshold),
            ("temporal_threshold", self.temporal_threshold),
            ("semantic_threshold", self.semantic_threshold),
            ("style_threshold", self.style_threshold),
            ("style_strength_step", self.style_strength_step),
            ("keyframe_weight_step", self.keyframe_weight_step),
            ("motion_blur_step", self.motion_blur_step),
            ("content_weight_step", self.content_weight_step),
            ("context_weight_step", self.context_weight_step),
        ] {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(AgentError::config_error(format!(
                    "{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.num_keyframes == 0 {
            return Err(AgentError::config_error("num_keyframes must be at least 1"));
        }

        Ok(())
    }
}
