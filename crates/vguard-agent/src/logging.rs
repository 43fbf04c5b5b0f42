//! Structured scene logging utilities.
//!
//! Provides consistent, structured logging for the acceptance loop with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};

/// Scene logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct SceneLogger {
    scene_order: u32,
    operation: String,
}

impl SceneLogger {
    /// Create a new logger for a scene and operation (e.g. "acceptance").
    pub fn new(scene_order: u32, operation: &str) -> Self {
        Self {
            scene_order,
            operation: operation.to_string(),
        }
    }

    /// Log the start of the operation.
    pub fn log_start(&self, message: &str) {
        info!(
            scene = self.scene_order,
            operation = %self.operation,
            "Scene started: {}", message
        );
    }

    /// Log one attempt's evaluation outcome.
    pub fn log_attempt(&self, attempt: u32, score: f64, passed: bool) {
        info!(
            scene = self.scene_order,
            operation = %self.operation,
            attempt,
            score,
            passed,
            "Scene attempt evaluated"
        );
    }

    /// Log a warning during the operation.
    pub fn log_warning(&self, message: &str) {
        warn!(
            scene = self.scene_order,
            operation = %self.operation,
            "Scene warning: {}", message
        );
    }

    /// Log an error during the operation.
    pub fn log_error(&self, message: &str) {
        error!(
            scene = self.scene_order,
            operation = %self.operation,
            "Scene error: {}", message
        );
    }

    /// Log the completion of the operation.
    pub fn log_completion(&self, message: &str) {
        info!(
            scene = self.scene_order,
            operation = %self.operation,
            "Scene completed: {}", message
        );
    }

    pub fn scene_order(&self) -> u32 {
        self.scene_order
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this scene's acceptance process.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "scene",
            scene = self.scene_order,
            operation = %self.operation
        )
    }
}
