//! Optimization strategy planner.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::classify;
use vguard_models::{
    ConsistencyReport, Issue, IssueTag, OptimizationStrategy, OptimizerKind,
};

/// Turns a failed report's issue histogram into ranked optimization
/// targets and the set of mutators worth invoking.
#[derive(Debug, Default, Clone)]
pub struct StrategyPlanner;

impl StrategyPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Plan a strategy for a report: accept when it passed, otherwise rank
    /// the failing dimensions and choose mutators.
    pub fn plan(&self, report: &ConsistencyReport) -> OptimizationStrategy {
        if report.passed {
            return OptimizationStrategy::Accept;
        }

        let counts = self.tally(&report.issues);
        let targets = ranked_targets(&counts);
        let optimizers = self.select_optimizers(&counts);

        debug!(
            targets = ?targets,
            optimizers = ?optimizers,
            "Optimization strategy planned"
        );

        OptimizationStrategy::Optimize {
            targets,
            optimizers,
        }
    }

    /// Classified-issue counts per dimension.
    ///
    /// An issue contributes once per matched tag: structured tags count
    /// directly, untagged text goes through the multi-tag keyword
    /// classifier and increments every dimension it matches.
    pub fn tally(&self, issues: &[Issue]) -> BTreeMap<IssueTag, usize> {
        let mut counts = BTreeMap::new();
        for issue in issues {
            for tag in classify::effective_tags(issue) {
                if tag != IssueTag::Other {
                    *counts.entry(tag).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    /// Mutators to invoke for the tallied issues. Visual and style issues
    /// warrant both mutators, semantic issues only the prompt, temporal
    /// issues only the parameters.
    pub fn select_optimizers(
        &self,
        counts: &BTreeMap<IssueTag, usize>,
    ) -> BTreeSet<OptimizerKind> {
        let count = |tag: IssueTag| counts.get(&tag).copied().unwrap_or(0);

        let mut optimizers = BTreeSet::new();
        if count(IssueTag::Visual) > 0 || count(IssueTag::Style) > 0 {
            optimizers.insert(OptimizerKind::Prompt);
            optimizers.insert(OptimizerKind::Params);
        }
        if count(IssueTag::Semantic) > 0 {
            optimizers.insert(OptimizerKind::Prompt);
        }
        if count(IssueTag::Temporal) > 0 {
            optimizers.insert(OptimizerKind::Params);
        }
        optimizers
    }
}

/// Nonzero dimensions ranked by count descending; ties keep canonical
/// dimension order (visual, temporal, semantic, style).
fn ranked_targets(counts: &BTreeMap<IssueTag, usize>) -> Vec<IssueTag> {
    let mut targets: Vec<(IssueTag, usize)> = [
        IssueTag::Visual,
        IssueTag::Temporal,
        IssueTag::Semantic,
        IssueTag::Style,
    ]
    .into_iter()
    .filter_map(|tag| {
        let count = counts.get(&tag).copied().unwrap_or(0);
        (count > 0).then_some((tag, count))
    })
    .collect();

    targets.sort_by(|a, b| b.1.cmp(&a.1));
    targets.into_iter().map(|(tag, _)| tag).collect()
}
