//! Keyframe extraction and the frame-source collaborator trait.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;
use vguard_models::{FrameRef, VideoId, VideoInfo};

/// Width keyframe images are scaled to; height keeps aspect.
const KEYFRAME_SCALE_WIDTH: u32 = 480;

/// Collaborator contract for resolving video identities into frames and
/// stream info. Injected into the core so tests can substitute a
/// deterministic fake.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Extract `count` keyframes for the given video identity, in timeline
    /// order. Must fail with a distinguishable "not found" error when the
    /// identity is invalid.
    async fn extract_keyframes(&self, video: &VideoId, count: usize) -> MediaResult<Vec<FrameRef>>;

    /// Resolve stream information for the given video identity.
    async fn video_info(&self, video: &VideoId) -> MediaResult<VideoInfo>;
}

/// Timestamps to sample for `count` keyframes of a `duration`-second video.
///
/// One frame samples the midpoint; two sample one second in from each end
/// (the continuity anchors); more spread evenly across the interior.
fn keyframe_timestamps(duration: f64, count: usize) -> Vec<f64> {
    let clamp = |t: f64| t.clamp(0.0, (duration - 0.05).max(0.0));
    match count {
        0 => Vec::new(),
        1 => vec![clamp(duration / 2.0)],
        2 => vec![clamp(1.0), clamp(duration - 1.0)],
        n => (1..=n)
            .map(|i| clamp(i as f64 * duration / (n + 1) as f64))
            .collect(),
    }
}

/// Extract `count` keyframes from a video file into `out_dir`.
///
/// Frames are written as scaled JPEGs named `keyframe_<n>.jpg` and returned
/// in timeline order.
pub async fn extract_keyframes(
    video_path: impl AsRef<Path>,
    count: usize,
    out_dir: impl AsRef<Path>,
) -> MediaResult<Vec<FrameRef>> {
    let video_path = video_path.as_ref();
    let out_dir = out_dir.as_ref();

    let info = probe_video(video_path).await?;
    let timestamps = keyframe_timestamps(info.duration, count);

    tokio::fs::create_dir_all(out_dir).await?;

    let runner = FfmpegRunner::new();
    let filter = format!("scale={}:-2", KEYFRAME_SCALE_WIDTH);
    let mut frames = Vec::with_capacity(timestamps.len());

    for (i, timestamp) in timestamps.iter().enumerate() {
        let frame_path = out_dir.join(format!("keyframe_{}.jpg", i + 1));
        let cmd = FfmpegCommand::new(video_path, &frame_path)
            .seek(*timestamp)
            .single_frame()
            .video_filter(&filter)
            .log_level("error");
        runner.run(&cmd).await?;

        if !frame_path.exists() {
            return Err(MediaError::ffmpeg_failed(
                format!("keyframe was not written: {}", frame_path.display()),
                None,
                None,
            ));
        }
        frames.push(FrameRef::new(frame_path));
    }

    debug!(
        video = %video_path.display(),
        frames = frames.len(),
        "Extracted keyframes"
    );
    Ok(frames)
}

/// `FrameSource` backed by the FFmpeg CLI.
///
/// Treats the video identity as a filesystem path and writes extracted
/// frames under `work_dir`, one subdirectory per (video, count) pair.
#[derive(Debug, Clone)]
pub struct FfmpegFrameSource {
    work_dir: PathBuf,
}

impl FfmpegFrameSource {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    fn frame_dir(&self, video: &VideoId, count: usize) -> PathBuf {
        let stem = Path::new(video.as_str())
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        self.work_dir.join(format!("{}_{}", stem, count))
    }
}

#[async_trait]
impl FrameSource for FfmpegFrameSource {
    async fn extract_keyframes(&self, video: &VideoId, count: usize) -> MediaResult<Vec<FrameRef>> {
        let path = Path::new(video.as_str());
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        let out_dir = self.frame_dir(video, count);
        let frames = extract_keyframes(path, count, &out_dir).await?;
        info!(video = %video, frames = frames.len(), "Keyframe extraction complete");
        Ok(frames)
    }

    async fn video_info(&self, video: &VideoId) -> MediaResult<VideoInfo> {
        probe_video(Path::new(video.as_str())).await
    }
}
