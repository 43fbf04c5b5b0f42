//! Optimization strategies produced by the planner.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::issue::IssueTag;

/// Which mutators the feedback stage should invoke.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    /// Mutates the generation prompt (may consult the language model)
    Prompt,
    /// Deterministic numeric parameter mutation
    Params,
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerKind::Prompt => write!(f, "prompt"),
            OptimizerKind::Params => write!(f, "params"),
        }
    }
}

/// The planner's decision for a failed (or passed) report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum OptimizationStrategy {
    /// The report passed; keep the scene as-is
    Accept,
    /// Mutate and regenerate
    Optimize {
        /// Dimensions to address, ranked by classified-issue count descending
        targets: Vec<IssueTag>,
        /// De-duplicated set of mutators to invoke
        optimizers: BTreeSet<OptimizerKind>,
    },
}

impl OptimizationStrategy {
    pub fn is_accept(&self) -> bool {
        matches!(self, OptimizationStrategy::Accept)
    }
}
