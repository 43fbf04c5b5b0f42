//! Classified consistency issues.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dimension tag for a classified issue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum IssueTag {
    Visual,
    Temporal,
    Semantic,
    Style,
    /// Free-text issue that no checker tagged; classified by keywords later
    Other,
}

impl IssueTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueTag::Visual => "visual",
            IssueTag::Temporal => "temporal",
            IssueTag::Semantic => "semantic",
            IssueTag::Style => "style",
            IssueTag::Other => "other",
        }
    }
}

impl fmt::Display for IssueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single consistency problem reported by a checker.
///
/// Checkers tag issues at the source; `Other` only appears on text that
/// entered the system untagged (e.g. verbatim model suggestions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Issue {
    pub tag: IssueTag,
    pub message: String,
}

impl Issue {
    pub fn new(tag: IssueTag, message: impl Into<String>) -> Self {
        Self {
            tag,
            message: message.into(),
        }
    }

    /// Untagged free-text issue.
    pub fn untagged(message: impl Into<String>) -> Self {
        Self::new(IssueTag::Other, message)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.tag, self.message)
    }
}
