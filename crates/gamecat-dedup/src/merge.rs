//! Applies a [`MergePlan`] through a [`DedupStore`].

use crate::{DedupStore, MergePlan, StoreError};

/// Row counts touched while applying one or more plans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub products_deleted: u64,
    pub offers_reassigned: u64,
    pub attributes_copied: u64,
    pub attributes_deleted: u64,
}

impl MergeOutcome {
    pub fn add(&mut self, other: MergeOutcome) {
        self.products_deleted += other.products_deleted;
        self.offers_reassigned += other.offers_reassigned;
        self.attributes_copied += other.attributes_copied;
        self.attributes_deleted += other.attributes_deleted;
    }
}

/// Fold every loser of `plan` into its survivor.
///
/// Per loser: offers are re-pointed, attributes are copied (skipping pairs
/// the survivor already has) and then deleted, and finally the product row is
/// deleted. The loser must own nothing by the time its row goes.
///
/// # Errors
///
/// Returns the first [`StoreError`]; the caller's unit of work must then be
/// discarded, since earlier steps may already have been written to it.
pub async fn apply_merge<S>(store: &mut S, plan: &MergePlan) -> Result<MergeOutcome, StoreError>
where
    S: DedupStore + ?Sized,
{
    let mut outcome = MergeOutcome::default();
    for &loser in &plan.losers {
        let offers = store.reassign_offers(loser, plan.survivor).await?;
        let copied = store
            .copy_attributes_skip_duplicates(loser, plan.survivor)
            .await?;
        let deleted = store.delete_attributes(loser).await?;
        store.delete_product(loser).await?;

        tracing::debug!(
            survivor = plan.survivor,
            loser,
            offers,
            attributes_copied = copied,
            attributes_deleted = deleted,
            "folded product into survivor"
        );

        outcome.add(MergeOutcome {
            products_deleted: 1,
            offers_reassigned: offers,
            attributes_copied: copied,
            attributes_deleted: deleted,
        });
    }
    Ok(outcome)
}
