use serde::Serialize;

use crate::merge::MergeOutcome;
use crate::MergePlan;

/// Whether a pass writes its merges or only plans them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Apply,
    DryRun,
}

impl RunMode {
    #[must_use]
    pub fn writes(self) -> bool {
        matches!(self, RunMode::Apply)
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Apply => write!(f, "apply"),
            RunMode::DryRun => write!(f, "dry-run"),
        }
    }
}

/// Summary of one deduplication pass.
///
/// In [`RunMode::DryRun`] the write counters stay at zero and `merges` holds
/// the plan that would have been applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupReport {
    pub mode: RunMode,
    pub products_scanned: usize,
    pub buckets: usize,
    pub comparisons: u64,
    pub clusters_found: usize,
    pub products_merged: u64,
    pub offers_reassigned: u64,
    pub attributes_copied: u64,
    pub attributes_deleted: u64,
    pub merges: Vec<MergePlan>,
}

impl DedupReport {
    pub(crate) fn record(&mut self, outcome: MergeOutcome) {
        self.products_merged += outcome.products_deleted;
        self.offers_reassigned += outcome.offers_reassigned;
        self.attributes_copied += outcome.attributes_copied;
        self.attributes_deleted += outcome.attributes_deleted;
    }

    /// Products the plan folds away, whether or not they were written.
    #[must_use]
    pub fn planned_losers(&self) -> usize {
        self.merges.iter().map(|m| m.losers.len()).sum()
    }
}
