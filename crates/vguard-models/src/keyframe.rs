//! Keyframe sets and their provenance.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Reference to a single extracted frame (an image file on disk).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct FrameRef(pub PathBuf);

impl FrameRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&str> for FrameRef {
    fn from(s: &str) -> Self {
        Self(PathBuf::from(s))
    }
}

/// Which footage a keyframe set was drawn from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum KeyframeProvenance {
    /// Extracted from the scene's own rendered video
    Own,
    /// Extracted from the unedited source footage the scene was sliced from
    SliceOriginal,
    /// Carried over from the prior scene
    Predecessor,
}

impl KeyframeProvenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyframeProvenance::Own => "own",
            KeyframeProvenance::SliceOriginal => "slice_original",
            KeyframeProvenance::Predecessor => "predecessor",
        }
    }
}

impl fmt::Display for KeyframeProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An ordered sequence of frames from a single provenance.
///
/// A non-empty set always has a well-defined first and last frame; those are
/// the continuity anchors the checkers compare across scene boundaries.
/// Sets are never mutated after creation — a fresh extraction produces a new
/// set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeyframeSet {
    pub provenance: KeyframeProvenance,
    pub frames: Vec<FrameRef>,
}

impl KeyframeSet {
    pub fn new(provenance: KeyframeProvenance, frames: Vec<FrameRef>) -> Self {
        Self { provenance, frames }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// First frame of the set, the opening continuity anchor.
    pub fn first(&self) -> Option<&FrameRef> {
        self.frames.first()
    }

    /// Last frame of the set, the closing continuity anchor.
    pub fn last(&self) -> Option<&FrameRef> {
        self.frames.last()
    }
}
