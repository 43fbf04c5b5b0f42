//! Shared data models for the vguard consistency agent.
//!
//! This crate provides Serde-serializable types for:
//! - Scenes, video metadata and keyframe sets (with provenance)
//! - Dimension results and consistency reports
//! - Generation parameters and their bounded mutations
//! - Optimization strategies and scene acceptance outcomes

pub mod issue;
pub mod keyframe;
pub mod outcome;
pub mod params;
pub mod report;
pub mod scene;
pub mod strategy;
pub mod video;
pub mod weights;

// Re-export common types
pub use issue::{Issue, IssueTag};
pub use keyframe::{FrameRef, KeyframeProvenance, KeyframeSet};
pub use outcome::{AcceptanceStatus, SceneAcceptance};
pub use params::GenerationParams;
pub use report::{ConsistencyReport, Dimension, DimensionResult, DimensionScores};
pub use scene::{PromptState, Scene, SceneId};
pub use strategy::{OptimizationStrategy, OptimizerKind};
pub use video::{VideoId, VideoInfo};
pub use weights::{ConsistencyWeights, WeightsError};
