//! Duplicate clusters: transitive closure of the match relation per bucket.

use crate::blocking::block_by_year;
use crate::similarity::SimilarityPolicy;
use crate::snapshot::Candidate;
use crate::union_find::partition;

/// Clusters found in one scan plus the work it took to find them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterScan {
    /// Product ids per cluster, ascending; clusters ordered by smallest id.
    pub clusters: Vec<Vec<i64>>,
    pub buckets: usize,
    /// Pairwise comparisons evaluated across all buckets.
    pub comparisons: u64,
}

/// Compare every pair within each year bucket and return the connected
/// components of size two or more.
#[must_use]
pub fn find_clusters(candidates: &[Candidate], policy: &SimilarityPolicy) -> ClusterScan {
    let buckets = block_by_year(candidates);
    let mut scan = ClusterScan {
        buckets: buckets.len(),
        ..ClusterScan::default()
    };

    for (year, members) in &buckets {
        if members.len() < 2 {
            continue;
        }

        let mut pairs = Vec::new();
        for (i, a) in members.iter().enumerate() {
            for (offset, b) in members[i + 1..].iter().enumerate() {
                scan.comparisons += 1;
                if policy.matches(&a.key, &b.key) {
                    pairs.push((i, i + 1 + offset));
                }
            }
        }

        let mut found = 0usize;
        for group in partition(members.len(), pairs) {
            if group.len() < 2 {
                continue;
            }
            let mut ids: Vec<i64> = group.into_iter().map(|idx| members[idx].id()).collect();
            ids.sort_unstable();
            scan.clusters.push(ids);
            found += 1;
        }

        if found > 0 {
            tracing::debug!(%year, bucket_size = members.len(), clusters = found, "bucket scanned");
        }
    }

    scan.clusters.sort_by_key(|ids| ids[0]);
    scan
}
