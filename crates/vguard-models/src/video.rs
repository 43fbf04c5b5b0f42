//! Video identity and resolved stream information.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a piece of video footage.
///
/// For locally rendered scenes this is the path of the rendered file; the
/// frame source resolves it however its backend requires. Two scenes that
/// reference the same footage share the same `VideoId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Resolved video stream information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Duration in seconds
    pub duration: f64,
}

impl VideoInfo {
    /// True when both dimensions match exactly.
    pub fn resolution_matches(&self, other: &VideoInfo) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// True when frame rates are within the given tolerance.
    pub fn fps_within(&self, other: &VideoInfo, tolerance: f64) -> bool {
        (self.fps - other.fps).abs() < tolerance
    }
}
