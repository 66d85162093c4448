//! Point-in-time view of the catalog that a pass plans against.

use std::collections::{BTreeSet, HashMap};

use gamecat_core::{ProductRecord, ReleaseYear};

use crate::similarity::{normalize_name, normalize_platform, MatchKey};
use crate::{DedupStore, StoreError};

/// A product ready for blocking and comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub key: MatchKey,
    pub release_year: ReleaseYear,
}

impl Candidate {
    #[must_use]
    pub fn id(&self) -> i64 {
        self.key.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Ordered by product id.
    pub candidates: Vec<Candidate>,
    pub offer_counts: HashMap<i64, i64>,
}

impl Snapshot {
    /// Assemble a snapshot from the three reads. Platform values for ids that
    /// are not in `products` are dropped.
    #[must_use]
    pub fn from_parts(
        products: Vec<ProductRecord>,
        platform_values: Vec<(i64, String)>,
        offer_counts: HashMap<i64, i64>,
    ) -> Self {
        let mut platforms: HashMap<i64, BTreeSet<String>> = HashMap::new();
        for (product_id, raw) in platform_values {
            if let Some(value) = normalize_platform(&raw) {
                platforms.entry(product_id).or_default().insert(value);
            }
        }

        let mut candidates: Vec<Candidate> = products
            .into_iter()
            .map(|p| Candidate {
                key: MatchKey {
                    id: p.id,
                    name: normalize_name(&p.canonical_name),
                    platforms: platforms.remove(&p.id).unwrap_or_default(),
                },
                release_year: p.release_year,
            })
            .collect();
        candidates.sort_by_key(Candidate::id);

        Self {
            candidates,
            offer_counts,
        }
    }

    /// Read products, platform values, and offer counts through `store`.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError`] raised by any of the reads.
    pub async fn read<S>(store: &mut S) -> Result<Self, StoreError>
    where
        S: DedupStore + ?Sized,
    {
        let products = store.load_products().await?;
        let platform_values = store.load_platform_values().await?;
        let offer_counts = store.load_offer_counts().await?;
        tracing::debug!(
            products = products.len(),
            platform_values = platform_values.len(),
            products_with_offers = offer_counts.len(),
            "snapshot loaded"
        );
        Ok(Self::from_parts(products, platform_values, offer_counts))
    }

    /// Offers attached to `product_id`; absent means zero.
    #[must_use]
    pub fn offer_count(&self, product_id: i64) -> i64 {
        self.offer_counts.get(&product_id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_normalizes_names_and_platforms() {
        let snapshot = Snapshot::from_parts(
            vec![ProductRecord::new(1, "  Half  Life 2 ", ReleaseYear::Known(2004))],
            vec![
                (1, "Windows".to_string()),
                (1, " windows ".to_string()),
                (1, String::new()),
                (1, "Linux".to_string()),
            ],
            HashMap::new(),
        );
        let candidate = &snapshot.candidates[0];
        assert_eq!(candidate.key.name, "half life 2");
        let platforms: Vec<&str> = candidate.key.platforms.iter().map(String::as_str).collect();
        assert_eq!(platforms, vec!["linux", "windows"]);
    }

    #[test]
    fn from_parts_orders_by_id_and_drops_orphan_platforms() {
        let snapshot = Snapshot::from_parts(
            vec![
                ProductRecord::new(9, "Portal", ReleaseYear::Known(2007)),
                ProductRecord::new(3, "Limbo", ReleaseYear::Unknown),
            ],
            vec![(42, "windows".to_string())],
            HashMap::new(),
        );
        let ids: Vec<i64> = snapshot.candidates.iter().map(Candidate::id).collect();
        assert_eq!(ids, vec![3, 9]);
        assert!(snapshot.candidates.iter().all(|c| c.key.platforms.is_empty()));
    }

    #[test]
    fn missing_offer_count_is_zero() {
        let snapshot = Snapshot::from_parts(
            vec![ProductRecord::new(1, "Portal", ReleaseYear::Known(2007))],
            Vec::new(),
            HashMap::from([(1, 4)]),
        );
        assert_eq!(snapshot.offer_count(1), 4);
        assert_eq!(snapshot.offer_count(2), 0);
        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot.is_empty());
    }
}
