//! Dimension results and the aggregated consistency report.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::issue::{Issue, IssueTag};

/// One independent axis of scene-to-scene consistency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Visual,
    Temporal,
    Semantic,
    Style,
}

impl Dimension {
    /// Canonical evaluation order. Issue unions and tie-breaks follow it.
    pub const ALL: [Dimension; 4] = [
        Dimension::Visual,
        Dimension::Temporal,
        Dimension::Semantic,
        Dimension::Style,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Visual => "visual",
            Dimension::Temporal => "temporal",
            Dimension::Semantic => "semantic",
            Dimension::Style => "style",
        }
    }

    /// The issue tag a checker on this dimension emits.
    pub fn issue_tag(&self) -> IssueTag {
        match self {
            Dimension::Visual => IssueTag::Visual,
            Dimension::Temporal => IssueTag::Temporal,
            Dimension::Semantic => IssueTag::Semantic,
            Dimension::Style => IssueTag::Style,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-dimension sub-score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "dimension", rename_all = "snake_case")]
pub enum DimensionScores {
    Visual {
        keyframe_continuity: f64,
        resolution_consistency: f64,
        color_consistency: f64,
        multi_source_consistency: f64,
    },
    Temporal {
        timeline_consistency: f64,
        action_smoothness: f64,
        event_logic: f64,
    },
    Semantic {
        coherence: f64,
    },
    Style {
        art_style: f64,
        action_style: f64,
        tech_params: f64,
    },
}

/// One checker's output for one evaluation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DimensionResult {
    pub dimension: Dimension,
    /// Consistency score in [0, 1]
    pub score: f64,
    /// False when the check itself failed (collaborator error, bad input)
    pub success: bool,
    /// Whether the score cleared this dimension's threshold
    pub passed: bool,
    pub issues: Vec<Issue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<DimensionScores>,
}

impl DimensionResult {
    /// Vacuous pass for a scene with no predecessor.
    pub fn vacuous_pass(dimension: Dimension) -> Self {
        Self {
            dimension,
            score: 1.0,
            success: true,
            passed: true,
            issues: Vec::new(),
            scores: None,
        }
    }

    /// Degraded failure result. Used when a collaborator errors or times
    /// out so one bad dimension never aborts the whole evaluation.
    pub fn degraded(dimension: Dimension, message: impl Into<String>) -> Self {
        Self {
            dimension,
            score: 0.0,
            success: false,
            passed: false,
            issues: vec![Issue::new(dimension.issue_tag(), message)],
            scores: None,
        }
    }
}

/// The evaluator's aggregated output for one scene pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConsistencyReport {
    pub visual: DimensionResult,
    pub temporal: DimensionResult,
    pub semantic: DimensionResult,
    pub style: DimensionResult,
    /// Weighted aggregate in [0, 1]
    pub overall_score: f64,
    /// `overall_score >= gating threshold`
    pub passed: bool,
    /// Union of all non-passing checkers' issues, in dimension order
    pub issues: Vec<Issue>,
}

impl ConsistencyReport {
    /// Report for the first scene in a sequence: no predecessor means
    /// consistency is vacuously satisfied.
    pub fn vacuous_pass() -> Self {
        Self {
            visual: DimensionResult::vacuous_pass(Dimension::Visual),
            temporal: DimensionResult::vacuous_pass(Dimension::Temporal),
            semantic: DimensionResult::vacuous_pass(Dimension::Semantic),
            style: DimensionResult::vacuous_pass(Dimension::Style),
            overall_score: 1.0,
            passed: true,
            issues: Vec::new(),
        }
    }

    /// Dimension results in canonical order.
    pub fn dimension_results(&self) -> [&DimensionResult; 4] {
        [&self.visual, &self.temporal, &self.semantic, &self.style]
    }

    pub fn score_for(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Visual => self.visual.score,
            Dimension::Temporal => self.temporal.score,
            Dimension::Semantic => self.semantic.score,
            Dimension::Style => self.style.score,
        }
    }
}
