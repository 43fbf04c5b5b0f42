//! Keyword-based issue classification.
//!
//! Checkers tag issues at the source, so classification here is the
//! fallback for text that entered the system untagged (verbatim model
//! suggestions, legacy reports). Two variants exist on purpose and must not
//! be merged: the planner tallies with the multi-tag [`classify`], while
//! the parameter mutator resolves a single tag with the order-dependent
//! [`primary_tag`].

use std::collections::BTreeSet;

use vguard_models::{Issue, IssueTag};

const VISUAL_KEYWORDS: &[&str] = &[
    "visual",
    "keyframe",
    "frame",
    "resolution",
    "color",
    "lighting",
];

const TEMPORAL_KEYWORDS: &[&str] = &["temporal", "timing", "timeline", "motion", "smooth", "logic"];

const SEMANTIC_KEYWORDS: &[&str] = &["semantic", "content", "subject", "relationship"];

const STYLE_KEYWORDS: &[&str] = &["style", "tone", "palette", "art"];

fn matches_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Multi-tag classification: every dimension whose keyword list matches.
///
/// An issue may match zero, one, or several tags; the tags are not mutually
/// exclusive.
pub fn classify(text: &str) -> BTreeSet<IssueTag> {
    let text = text.to_lowercase();
    let mut tags = BTreeSet::new();
    if matches_any(&text, VISUAL_KEYWORDS) {
        tags.insert(IssueTag::Visual);
    }
    if matches_any(&text, TEMPORAL_KEYWORDS) {
        tags.insert(IssueTag::Temporal);
    }
    if matches_any(&text, SEMANTIC_KEYWORDS) {
        tags.insert(IssueTag::Semantic);
    }
    if matches_any(&text, STYLE_KEYWORDS) {
        tags.insert(IssueTag::Style);
    }
    tags
}

/// Single-tag classification: tags are tried in priority order (visual,
/// temporal, semantic, style) and the first match wins. Order-dependent by
/// design; text matching several lists resolves to the earliest.
pub fn primary_tag(text: &str) -> IssueTag {
    let text = text.to_lowercase();
    if matches_any(&text, VISUAL_KEYWORDS) {
        IssueTag::Visual
    } else if matches_any(&text, TEMPORAL_KEYWORDS) {
        IssueTag::Temporal
    } else if matches_any(&text, SEMANTIC_KEYWORDS) {
        IssueTag::Semantic
    } else if matches_any(&text, STYLE_KEYWORDS) {
        IssueTag::Style
    } else {
        IssueTag::Other
    }
}

/// Tags for a structured issue: the source tag when present, keyword
/// fallback otherwise.
pub fn effective_tags(issue: &Issue) -> BTreeSet<IssueTag> {
    match issue.tag {
        IssueTag::Other => classify(&issue.message),
        tag => BTreeSet::from([tag]),
    }
}

/// Single tag for a structured issue: the source tag when present,
/// first-match keyword fallback otherwise.
pub fn effective_primary(issue: &Issue) -> IssueTag {
    match issue.tag {
        IssueTag::Other => primary_tag(&issue.message),
        tag => tag,
    }
}
