//! Visual consistency checker.

use futures::future::join_all;
use std::sync::Arc;
use tracing::debug;

use crate::cache::KeyframeCache;
use crate::checkers::{resolve_own_keyframes, resolve_predecessor_keyframes, resolve_video_info};
use crate::error::{AgentError, AgentResult};
use vguard_media::FrameSource;
use vguard_ml::ImageSimilarity;
use vguard_models::{
    Dimension, DimensionResult, DimensionScores, FrameRef, Issue, IssueTag, Scene, VideoInfo,
};

/// Sub-score weights. They sum to 1.0; `test_weights_sum_to_one` guards
/// against drift.
const CONTINUITY_WEIGHT: f64 = 0.40;
const RESOLUTION_WEIGHT: f64 = 0.15;
const COLOR_WEIGHT: f64 = 0.25;
const MULTI_SOURCE_WEIGHT: f64 = 0.20;

/// Scores visual continuity between a scene and its predecessor: anchor
/// keyframe similarity, resolution drift, color/lighting drift, and
/// agreement across keyframe provenances.
pub struct VisualChecker {
    similarity: Arc<dyn ImageSimilarity>,
    frames: Arc<dyn FrameSource>,
    cache: Arc<KeyframeCache>,
    threshold: f64,
    num_keyframes: usize,
}

impl VisualChecker {
    pub fn new(
        similarity: Arc<dyn ImageSimilarity>,
        frames: Arc<dyn FrameSource>,
        cache: Arc<KeyframeCache>,
        threshold: f64,
        num_keyframes: usize,
    ) -> Self {
        Self {
            similarity,
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
                Dimension::Visual,
                format!("visual consistency check failed: {}", e),
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
                    "scene is missing keyframes for the continuity anchors",
                ))
            }
        };

        let continuity = self
            .similarity
            .embedding_similarity(prev_last, curr_first)
            .await?;

        let curr_info = resolve_video_info(current, &self.frames).await?;
        let prev_info = resolve_video_info(previous, &self.frames).await?;
        let resolution = resolution_consistency(&curr_info, &prev_info);

        let color = self
            .similarity
            .visual_similarity(prev_last, curr_first)
            .await?;

        let multi_source = self
            .multi_source_consistency(current, &current_frames, &previous_frames)
            .await?;

        let score = CONTINUITY_WEIGHT * continuity
            + RESOLUTION_WEIGHT * resolution
            + COLOR_WEIGHT * color
            + MULTI_SOURCE_WEIGHT * multi_source;

        debug!(
            scene = current.order,
            continuity, resolution, color, multi_source, score, "Visual check complete"
        );

        let passed = score >= self.threshold;
        let mut issues = Vec::new();
        if !passed {
            if continuity < self.threshold {
                issues.push(Issue::new(
                    IssueTag::Visual,
                    "keyframe transition from the previous scene is not continuous",
                ));
            }
            if resolution < self.threshold {
                issues.push(Issue::new(
                    IssueTag::Visual,
                    "resolution differs between consecutive scenes",
                ));
            }
            if color < self.threshold {
                issues.push(Issue::new(
                    IssueTag::Visual,
                    "color and lighting drift between consecutive scenes",
                ));
            }
            if multi_source < self.threshold {
                issues.push(Issue::new(
                    IssueTag::Visual,
                    "keyframe sources disagree about the scene's content",
                ));
            }
            if issues.is_empty() {
                issues.push(Issue::new(
                    IssueTag::Visual,
                    "visual consistency below threshold",
                ));
            }
        }

        Ok(DimensionResult {
            dimension: Dimension::Visual,
            score,
            success: true,
            passed,
            issues,
            scores: Some(DimensionScores::Visual {
                keyframe_continuity: continuity,
                resolution_consistency: resolution,
                color_consistency: color,
                multi_source_consistency: multi_source,
            }),
        })
    }

    /// Average pairwise similarity across keyframe provenances: own vs
    /// slice-original, own vs predecessor, slice-original vs predecessor.
    /// Only pairs with both sides non-empty count; with no usable pair the
    /// score defaults to 1.0 (no evidence of inconsistency).
    async fn multi_source_consistency(
        &self,
        current: &Scene,
        own: &[FrameRef],
        predecessor: &[FrameRef],
    ) -> AgentResult<f64> {
        let slice = current
            .slice_keyframes()
            .map(|s| s.frames.as_slice())
            .unwrap_or(&[]);

        let mut total = 0.0;
        let mut pairs = 0usize;

        if let Some(own_first) = own.first() {
            if !slice.is_empty() {
                // Compare the scene's opening frame against every slice frame.
                let comparisons = join_all(
                    slice
                        .iter()
                        .map(|frame| self.similarity.embedding_similarity(own_first, frame)),
                )
                .await;
                let mut sum = 0.0;
                for comparison in comparisons {
                    sum += comparison?;
                }
                total += sum / slice.len() as f64;
                pairs += 1;
            }
        }

        if let (Some(own_first), Some(prev_last)) = (own.first(), predecessor.last()) {
            total += self
                .similarity
                .embedding_similarity(prev_last, own_first)
                .await?;
            pairs += 1;
        }

        if let (Some(slice_first), Some(prev_last)) = (slice.first(), predecessor.last()) {
            total += self
                .similarity
                .embedding_similarity(prev_last, slice_first)
                .await?;
            pairs += 1;
        }

        if pairs == 0 {
            return Ok(1.0);
        }
        Ok(total / pairs as f64)
    }
}

/// Resolution consistency: 1.0 on exact match, otherwise one minus the
/// average relative difference per axis.
fn resolution_consistency(current: &VideoInfo, previous: &VideoInfo) -> f64 {
    if current.width == 0 || current.height == 0 || previous.width == 0 || previous.height == 0 {
        return 0.0;
    }
    if current.resolution_matches(previous) {
        return 1.0;
    }
    let width_diff = (current.width as f64 - previous.width as f64).abs()
        / current.width.max(previous.width) as f64;
    let height_diff = (current.height as f64 - previous.height as f64).abs()
        / current.height.max(previous.height) as f64;
    1.0 - (width_diff + height_diff) / 2.0
}
