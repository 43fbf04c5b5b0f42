//! Consistency evaluation and adaptive regeneration for generated video
//! scenes.
//!
//! This crate provides:
//! - A keyframe cache memoizing extraction per (video, count)
//! - Four dimension checkers (visual, temporal, semantic, style)
//! - A consistency evaluator with concurrent fan-out and a pass/fail gate
//! - Issue classification, strategy planning and feedback generation
//! - The bounded retry controller driving the generation pipeline

pub mod cache;
pub mod checkers;
pub mod classify;
pub mod config;
pub mod controller;
pub mod error;
pub mod evaluator;
pub mod feedback;
pub mod logging;
pub mod pipeline;
pub mod planner;

#[cfg(test)]
pub(crate) mod testutil;

pub use cache::{CacheStats, KeyframeCache};
pub use checkers::{SemanticChecker, StyleChecker, TemporalChecker, VisualChecker};
pub use config::AgentConfig;
pub use controller::RetryController;
pub use error::{AgentError, AgentResult};
pub use evaluator::{Collaborators, ConsistencyEvaluator};
pub use feedback::{Feedback, FeedbackGenerator, ParamMutator, PromptMutator};
pub use logging::SceneLogger;
pub use pipeline::GenerationPipeline;
pub use planner::StrategyPlanner;
