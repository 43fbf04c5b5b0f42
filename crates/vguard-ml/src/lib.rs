//! Model-service collaborators for the vguard consistency agent.
//!
//! This crate provides:
//! - Trait contracts for image similarity, vision-language description,
//!   language-model scoring/refinement, and motion estimation
//! - A DashScope (Qwen) HTTP client implementing the language contracts
//! - Heuristic motion estimators used until a dedicated motion model exists

pub mod dashscope;
pub mod error;
pub mod heuristic;
pub mod traits;

pub use dashscope::DashScopeClient;
pub use error::{MlError, MlResult};
pub use heuristic::HeuristicMotionAnalyzer;
pub use traits::{
    CoherenceScore, FrameDescription, ImageSimilarity, LanguageModel, MotionAnalyzer,
    VisionLanguage,
};
