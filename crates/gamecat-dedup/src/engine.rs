use gamecat_core::AppConfig;

use crate::cluster::{find_clusters, ClusterScan};
use crate::merge::{apply_merge, MergeOutcome};
use crate::{
    select_survivor, DedupError, DedupReport, DedupStore, MergePlan, RunMode, SimilarityPolicy,
    Snapshot,
};

/// Plans and executes a deduplication pass over whatever store it is handed.
///
/// The engine never opens or commits a transaction: the caller scopes the
/// store to one unit of work and decides whether to keep it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DedupEngine {
    policy: SimilarityPolicy,
}

impl DedupEngine {
    #[must_use]
    pub fn new(policy: SimilarityPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(SimilarityPolicy::new(config.dedup_fuzzy_threshold))
    }

    #[must_use]
    pub fn policy(&self) -> SimilarityPolicy {
        self.policy
    }

    /// Block, compare, and cluster the snapshot.
    #[must_use]
    pub fn scan(&self, snapshot: &Snapshot) -> ClusterScan {
        find_clusters(&snapshot.candidates, &self.policy)
    }

    /// One plan per duplicate cluster, ordered by survivor id.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError::EmptyCluster`] if clustering produced an empty
    /// group, which indicates a bug upstream.
    pub fn plan(&self, snapshot: &Snapshot) -> Result<Vec<MergePlan>, DedupError> {
        plan_clusters(&self.scan(snapshot).clusters, snapshot)
    }

    /// Apply `plans` in order through `store`.
    ///
    /// # Errors
    ///
    /// Returns the first store failure. Plans before it have been written to
    /// the store's unit of work, so the caller must discard it.
    pub async fn execute<S>(
        &self,
        store: &mut S,
        plans: &[MergePlan],
    ) -> Result<MergeOutcome, DedupError>
    where
        S: DedupStore + ?Sized,
    {
        let mut total = MergeOutcome::default();
        for plan in plans {
            tracing::debug!(
                cluster_size = plan.cluster_size(),
                survivor = plan.survivor,
                losers = ?plan.losers,
                "merging cluster"
            );
            match apply_merge(store, plan).await {
                Ok(outcome) => total.add(outcome),
                Err(e) => {
                    tracing::error!(survivor = plan.survivor, error = %e, "cluster merge failed");
                    return Err(e.into());
                }
            }
        }
        Ok(total)
    }

    /// Read a snapshot, plan, and (unless `mode` is a dry run) execute.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError`] if any read or write fails.
    pub async fn run<S>(&self, store: &mut S, mode: RunMode) -> Result<DedupReport, DedupError>
    where
        S: DedupStore + ?Sized,
    {
        let snapshot = Snapshot::read(store).await?;
        let scan = self.scan(&snapshot);
        let plans = plan_clusters(&scan.clusters, &snapshot)?;

        let mut report = DedupReport {
            mode,
            products_scanned: snapshot.len(),
            buckets: scan.buckets,
            comparisons: scan.comparisons,
            clusters_found: plans.len(),
            ..DedupReport::default()
        };

        if mode.writes() {
            let outcome = self.execute(store, &plans).await?;
            report.record(outcome);
        }
        report.merges = plans;

        tracing::info!(
            %mode,
            products = report.products_scanned,
            buckets = report.buckets,
            comparisons = report.comparisons,
            clusters = report.clusters_found,
            merged = report.products_merged,
            offers_reassigned = report.offers_reassigned,
            attributes_copied = report.attributes_copied,
            "dedup pass finished"
        );
        Ok(report)
    }
}

fn plan_clusters(clusters: &[Vec<i64>], snapshot: &Snapshot) -> Result<Vec<MergePlan>, DedupError> {
    let mut plans = clusters
        .iter()
        .map(|cluster| select_survivor(cluster, &snapshot.offer_counts))
        .collect::<Result<Vec<_>, _>>()?;
    plans.sort_by_key(|p| p.survivor);
    Ok(plans)
}
