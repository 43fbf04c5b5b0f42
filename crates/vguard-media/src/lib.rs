//! FFmpeg CLI wrapper for the vguard consistency agent.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Video probing via FFprobe
//! - Keyframe extraction at evenly spaced timestamps
//! - The `FrameSource` collaborator trait consumed by the core

pub mod command;
pub mod error;
pub mod keyframes;
pub mod probe;

pub use command::{FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use keyframes::{extract_keyframes, FfmpegFrameSource, FrameSource};
pub use probe::probe_video;
