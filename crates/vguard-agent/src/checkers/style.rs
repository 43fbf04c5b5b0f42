//! Style consistency checker.

use std::sync::Arc;
use tracing::debug;

use crate::cache::KeyframeCache;
use crate::checkers::{resolve_own_keyframes, resolve_predecessor_keyframes, resolve_video_info};
use crate::error::{AgentError, AgentResult};
use vguard_media::FrameSource;
use vguard_ml::{ImageSimilarity, MotionAnalyzer};
use vguard_models::{Dimension, DimensionResult, DimensionScores, Issue, IssueTag, Scene, VideoInfo};

const ART_STYLE_WEIGHT: f64 = 0.5;
const ACTION_STYLE_WEIGHT: f64 = 0.3;
const TECH_PARAMS_WEIGHT: f64 = 0.2;

/// Frame rates closer than this count as matching.
const FPS_TOLERANCE: f64 = 1.0;

/// Scores stylistic agreement between a scene and its predecessor: art
/// style from anchor frames, action style from the motion analyzer, and
/// technical parameters from stream info.
pub struct StyleChecker {
    similarity: Arc<dyn ImageSimilarity>,
    motion: Arc<dyn MotionAnalyzer>,
    frames: Arc<dyn FrameSource>,
    cache: Arc<KeyframeCache>,
    threshold: f64,
    num_keyframes: usize,
}

impl StyleChecker {
    pub fn new(
        similarity: Arc<dyn ImageSimilarity>,
        motion: Arc<dyn MotionAnalyzer>,
        frames: Arc<dyn FrameSource>,
        cache: Arc<KeyframeCache>,
        threshold: f64,
        num_keyframes: usize,
    ) -> Self {
        Self {
            similarity,
            motion,
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
                Dimension::Style,
                format!("style consistency check failed: {}", e),
            ),
        }
    }

    async fn evaluate(&self, current: &Scene, previous: &Scene) -> AgentResult<DimensionResult> {
        let current_frames =
            resolve_own_keyframes(current, &self.cache, &self.frames, self.num_keyframes).await?;
        let previous_frames = resolve_predecessor_keyframes(
            current,
            previous,
            &self.cache,
            &self.frames,
            self.num_keyframes,
        )
        .await?;

        let (curr_first, prev_last) = match (current_frames.first(), previous_frames.last()) {
            (Some(c), Some(p)) => (c, p),
            _ => {
                return Err(AgentError::evaluation_failed(
                    "scene is missing keyframes for the style anchors",
                ))
            }
        };

        let art_style = self
            .similarity
            .visual_similarity(prev_last, curr_first)
            .await?;
        let action_style = self.motion.action_style(current, previous).await?;

        let curr_info = resolve_video_info(current, &self.frames).await?;
        let prev_info = resolve_video_info(previous, &self.frames).await?;
        let tech_params = tech_param_consistency(&curr_info, &prev_info);

        let score = ART_STYLE_WEIGHT * art_style
            + ACTION_STYLE_WEIGHT * action_style
            + TECH_PARAMS_WEIGHT * tech_params;

        debug!(
            scene = current.order,
            art_style, action_style, tech_params, score, "Style check complete"
        );

        let passed = score >= self.threshold;
        let mut issues = Vec::new();
        if !passed {
            if art_style < self.threshold {
                issues.push(Issue::new(
                    IssueTag::Style,
                    "art style varies between scenes; keep one palette and tone",
                ));
            }
            if action_style < self.threshold {
                issues.push(Issue::new(
                    IssueTag::Style,
                    "action style varies between scenes",
                ));
            }
            if tech_params < self.threshold {
                issues.push(Issue::new(
                    IssueTag::Style,
                    "technical parameters differ between scenes (resolution or frame rate)",
                ));
            }
            if issues.is_empty() {
                issues.push(Issue::new(
                    IssueTag::Style,
                    "style consistency below threshold",
                ));
            }
        }

        Ok(DimensionResult {
            dimension: Dimension::Style,
            score,
            success: true,
            passed,
            issues,
            scores: Some(DimensionScores::Style {
                art_style,
                action_style,
                tech_params,
            }),
        })
    }
}

/// Technical-parameter agreement: the average of an exact resolution match
/// and a near-match on frame rate. A mismatch on either axis still scores
/// 0.8, not 0 — technical drift is recoverable.
fn tech_param_consistency(current: &VideoInfo, previous: &VideoInfo) -> f64 {
    let resolution_match = if current.resolution_matches(previous) {
        1.0
    } else {
        0.8
    };
    let fps_match = if current.fps_within(previous, FPS_TOLERANCE) {
        1.0
    } else {
        0.8
    };
    (resolution_match + fps_match) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(width: u32, height: u32, fps: f64) -> VideoInfo {
        VideoInfo {
            width,
            height,
            fps,
            duration: 5.0,
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum = ART_STYLE_WEIGHT + ACTION_STYLE_WEIGHT + TECH_PARAMS_WEIGHT;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_tech_params_full_match() {
        let score = tech_param_consistency(&info(1920, 1080, 30.0), &info(1920, 1080, 30.0));
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_tech_params_fps_mismatch() {
        // fps 30 vs 24 exceeds the 1 fps tolerance, so the fps side drops
        // to 0.8 while resolution stays 1.0.
        let score = tech_param_consistency(&info(1920, 1080, 30.0), &info(1920, 1080, 24.0));
        assert!((score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_tech_params_near_fps_counts_as_match() {
        let score = tech_param_consistency(&info(1920, 1080, 29.97), &info(1920, 1080, 30.0));
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_tech_params_both_mismatched() {
        let score = tech_param_consistency(&info(1280, 720, 24.0), &info(1920, 1080, 30.0));
        assert!((score - 0.8).abs() < 1e-9);
    }
}
