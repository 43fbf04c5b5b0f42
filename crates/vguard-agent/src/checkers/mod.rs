//! Dimension checkers.
//!
//! Each checker scores one axis of scene-to-scene consistency and never
//! lets a collaborator failure escape: errors degrade to a zero-score
//! failed result so the evaluator always receives four well-formed
//! `DimensionResult`s.

use std::sync::Arc;

use crate::cache::KeyframeCache;
use crate::error::AgentResult;
use vguard_media::FrameSource;
use vguard_models::{FrameRef, KeyframeProvenance, Scene, VideoInfo};

pub mod semantic;
pub mod style;
pub mod temporal;
pub mod visual;

pub use semantic::SemanticChecker;
pub use style::StyleChecker;
pub use temporal::TemporalChecker;
pub use visual::VisualChecker;

/// Resolve a scene's own keyframes: scene-attached frames win, otherwise
/// extraction goes through the shared cache.
pub(crate) async fn resolve_own_keyframes(
    scene: &Scene,
    cache: &KeyframeCache,
    source: &Arc<dyn FrameSource>,
    count: usize,
) -> AgentResult<Arc<Vec<FrameRef>>> {
    if let Some(set) = scene.own_keyframes() {
        if !set.is_empty() {
            return Ok(Arc::new(set.frames.clone()));
        }
    }
    let frames = cache.get_or_extract(source.as_ref(), &scene.video, count).await?;
    Ok(frames)
}

/// Keyframes of the prior scene as seen from `current`: a carried
/// predecessor set wins, otherwise the predecessor's own frames resolve.
pub(crate) async fn resolve_predecessor_keyframes(
    current: &Scene,
    previous: &Scene,
    cache: &KeyframeCache,
    source: &Arc<dyn FrameSource>,
    count: usize,
) -> AgentResult<Arc<Vec<FrameRef>>> {
    if let Some(set) = current.keyframes_from(KeyframeProvenance::Predecessor) {
        if !set.is_empty() {
            return Ok(Arc::new(set.frames.clone()));
        }
    }
    resolve_own_keyframes(previous, cache, source, count).await
}

/// Resolve stream info: the scene's recorded info wins, otherwise probe.
pub(crate) async fn resolve_video_info(
    scene: &Scene,
    source: &Arc<dyn FrameSource>,
) -> AgentResult<VideoInfo> {
    if let Some(info) = &scene.video_info {
        return Ok(info.clone());
    }
    let info = source.video_info(&scene.video).await?;
    Ok(info)
}
