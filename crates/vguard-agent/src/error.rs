//! Agent error types.

use thiserror::Error;

pub type AgentResult<T> = Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Regeneration failed: {0}")]
    RegenerationFailed(String),

    #[error("Media error: {0}")]
    Media(#[from] vguard_media::MediaError),

    #[error("Model service error: {0}")]
    Ml(#[from] vguard_ml::MlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn evaluation_failed(msg: impl Into<String>) -> Self {
        Self::EvaluationFailed(msg.into())
    }

    pub fn regeneration_failed(msg: impl Into<String>) -> Self {
        Self::RegenerationFailed(msg.into())
    }
}
