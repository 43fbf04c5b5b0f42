//! Terminal outcome of one scene's acceptance process.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::report::ConsistencyReport;
use crate::scene::Scene;
use crate::strategy::OptimizationStrategy;

/// How the retry loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceStatus {
    /// The scene cleared the consistency gate
    Accepted,
    /// The retry budget ran out before a passing evaluation
    Exhausted,
}

impl AcceptanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcceptanceStatus::Accepted => "accepted",
            AcceptanceStatus::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for AcceptanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result record returned by the retry controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneAcceptance {
    pub status: AcceptanceStatus,
    /// The accepted scene, or the last rejected one at exhaustion
    pub scene: Scene,
    /// Regeneration attempts consumed (0 when accepted first try)
    pub retry_count: u32,
    /// The final evaluation report. Absent only when every iteration died
    /// before its evaluation could run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_report: Option<ConsistencyReport>,
    /// Strategy chosen for the final report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<OptimizationStrategy>,
    /// Human-readable remediation suggestions for the final report
    pub suggestions: Vec<String>,
}

impl SceneAcceptance {
    pub fn accepted(&self) -> bool {
        self.status == AcceptanceStatus::Accepted
    }
}
