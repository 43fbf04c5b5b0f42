//! Dimension weights for the overall consistency score.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::ConsistencyReport;

/// Tolerance when checking that weights sum to 1.0.
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum WeightsError {
    #[error("consistency weights must sum to 1.0, got {0}")]
    BadSum(f64),

    #[error("consistency weight for {dimension} is out of range: {value}")]
    OutOfRange { dimension: &'static str, value: f64 },
}

/// Per-dimension weights used to aggregate the four checker scores.
///
/// Invalid configurations are rejected by [`ConsistencyWeights::validate`]
/// at setup; weights are never silently normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConsistencyWeights {
    pub visual: f64,
    pub temporal: f64,
    pub semantic: f64,
    pub style: f64,
}

impl Default for ConsistencyWeights {
    fn default() -> Self {
        Self {
            visual: 0.30,
            temporal: 0.20,
            semantic: 0.30,
            style: 0.20,
        }
    }
}

impl ConsistencyWeights {
    pub fn validate(&self) -> Result<(), WeightsError> {
        for (dimension, value) in [
            ("visual", self.visual),
            ("temporal", self.temporal),
            ("semantic", self.semantic),
            ("style", self.style),
        ] {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(WeightsError::OutOfRange { dimension, value });
            }
        }

        let sum = self.visual + self.temporal + self.semantic + self.style;
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(WeightsError::BadSum(sum));
        }
        Ok(())
    }

    /// Weighted aggregate of the four dimension scores.
    pub fn apply(&self, visual: f64, temporal: f64, semantic: f64, style: f64) -> f64 {
        visual * self.visual + temporal * self.temporal + semantic * self.semantic + style * self.style
    }

    /// Aggregate straight from a report's dimension results.
    pub fn overall(&self, report: &ConsistencyReport) -> f64 {
        self.apply(
            report.visual.score,
            report.temporal.score,
            report.semantic.score,
            report.style.score,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_valid() {
        ConsistencyWeights::default().validate().unwrap();
    }

    #[test]
    fn test_bad_sum_is_rejected() {
        let weights = ConsistencyWeights {
            visual: 0.5,
            temporal: 0.5,
            semantic: 0.5,
            style: 0.5,
        };
        assert!(matches!(
            weights.validate(),
            Err(WeightsError::BadSum(sum)) if (sum - 2.0).abs() < 1e-9
        ));
    }

    #[test]
    fn test_negative_weight_is_rejected() {
        let weights = ConsistencyWeights {
            visual: -0.1,
            temporal: 0.4,
            semantic: 0.4,
            style: 0.3,
        };
        assert!(matches!(
            weights.validate(),
            Err(WeightsError::OutOfRange { dimension: "visual", .. })
        ));
    }

    #[test]
    fn test_weighted_aggregate_example() {
        // visual 0.9, temporal 0.8, semantic 0.95, style 0.7 with default
        // weights lands exactly on 0.855.
        let overall = ConsistencyWeights::default().apply(0.9, 0.8, 0.95, 0.7);
        assert!((overall - 0.855).abs() < 1e-9);
    }
}
