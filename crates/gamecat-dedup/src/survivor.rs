//! Survivor choice for a duplicate cluster: most offers, then smallest id.

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::Serialize;

use crate::DedupError;

/// What happens to one cluster: `losers` are folded into `survivor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergePlan {
    pub survivor: i64,
    /// Ascending.
    pub losers: Vec<i64>,
}

impl MergePlan {
    #[must_use]
    pub fn cluster_size(&self) -> usize {
        self.losers.len() + 1
    }
}

/// Pick the product with the most offers; ties go to the smallest id. A
/// product missing from `offer_counts` has zero offers.
///
/// # Errors
///
/// Returns [`DedupError::EmptyCluster`] if `cluster` is empty.
pub fn select_survivor(
    cluster: &[i64],
    offer_counts: &HashMap<i64, i64>,
) -> Result<MergePlan, DedupError> {
    let count = |id: &i64| offer_counts.get(id).copied().unwrap_or(0);

    let survivor = cluster
        .iter()
        .copied()
        .max_by_key(|id| (count(id), Reverse(*id)))
        .ok_or(DedupError::EmptyCluster)?;

    let mut losers: Vec<i64> = cluster.iter().copied().filter(|id| *id != survivor).collect();
    losers.sort_unstable();
    losers.dedup();

    Ok(MergePlan { survivor, losers })
}
