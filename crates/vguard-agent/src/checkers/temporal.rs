//! Temporal consistency checker.

use std::sync::Arc;
use tracing::debug;

use crate::checkers::resolve_video_info;
use crate::error::AgentResult;
use vguard_media::FrameSource;
use vguard_ml::MotionAnalyzer;
use vguard_models::{Dimension, DimensionResult, DimensionScores, Issue, IssueTag, Scene, VideoInfo};

const TIMELINE_WEIGHT: f64 = 0.4;
const SMOOTHNESS_WEIGHT: f64 = 0.3;
const EVENT_LOGIC_WEIGHT: f64 = 0.3;

/// Scores the temporal relationship between a scene and its predecessor:
/// timeline continuity from stream info plus motion estimates from an
/// opaque analyzer.
pub struct TemporalChecker {
    frames: Arc<dyn FrameSource>,
    motion: Arc<dyn MotionAnalyzer>,
    threshold: f64,
}

impl TemporalChecker {
    pub fn new(
        frames: Arc<dyn FrameSource>,
        motion: Arc<dyn MotionAnalyzer>,
        threshold: f64,
    ) -> Self {
        Self {
            frames,
            motion,
            threshold,
        }
    }

    /// Run the check. Collaborator failures degrade to a failed result.
    pub async fn check(&self, current: &Scene, previous: &Scene) -> DimensionResult {
        match self.evaluate(current, previous).await {
            Ok(result) => result,
            Err(e) => DimensionResult::degraded(
                Dimension::Temporal,
                format!("temporal consistency check failed: {}", e),
            ),
        }
    }

    async fn evaluate(&self, current: &Scene, previous: &Scene) -> AgentResult<DimensionResult> {
        let curr_info = resolve_video_info(current, &self.frames).await?;
        let prev_info = resolve_video_info(previous, &self.frames).await?;

        let timeline = timeline_consistency(&curr_info, &prev_info);
        let smoothness = self.motion.action_smoothness(current, previous).await?;
        let event_logic = self.motion.event_logic(current, previous).await?;

        let score = TIMELINE_WEIGHT * timeline
            + SMOOTHNESS_WEIGHT * smoothness
            + EVENT_LOGIC_WEIGHT * event_logic;

        debug!(
            scene = current.order,
            timeline, smoothness, event_logic, score, "Temporal check complete"
        );

        let passed = score >= self.threshold;
        let mut issues = Vec::new();
        if !passed {
            if timeline < self.threshold {
                issues.push(Issue::new(
                    IssueTag::Temporal,
                    "timing drift between scenes breaks the shared timeline",
                ));
            }
            if smoothness < self.threshold {
                issues.push(Issue::new(
                    IssueTag::Temporal,
                    "motion across the scene boundary is not smooth",
                ));
            }
            if event_logic < self.threshold {
                issues.push(Issue::new(
                    IssueTag::Temporal,
                    "event logic does not follow from the previous scene",
                ));
            }
            if issues.is_empty() {
                issues.push(Issue::new(
                    IssueTag::Temporal,
                    "temporal consistency below threshold",
                ));
            }
        }

        Ok(DimensionResult {
            dimension: Dimension::Temporal,
            score,
            success: true,
            passed,
            issues,
            scores: Some(DimensionScores::Temporal {
                timeline_consistency: timeline,
                action_smoothness: smoothness,
                event_logic,
            }),
        })
    }
}

/// Timeline continuity from stream info.
///
/// Frame-rate agreement carries 0.6, duration agreement 0.4. Duration
/// differences beyond 50% floor their contribution at zero.
fn timeline_consistency(current: &VideoInfo, previous: &VideoInfo) -> f64 {
    if current.fps == 0.0 || previous.fps == 0.0 {
        return 0.0;
    }

    let fps_diff = (current.fps - previous.fps).abs() / current.fps.max(previous.fps);
    let fps_score = 1.0 - fps_diff;

    let duration_score = if current.duration == 0.0 || previous.duration == 0.0 {
        0.0
    } else {
        let duration_diff = (current.duration - previous.duration).abs()
            / current.duration.max(previous.duration);
        1.0 - duration_diff.min(0.5) * 2.0
    };

    fps_score * 0.6 + duration_score * 0.4
}
