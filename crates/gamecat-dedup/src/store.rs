//! The storage contract the deduplication pass runs against.

use std::collections::HashMap;

use async_trait::async_trait;
use gamecat_core::ProductRecord;

use crate::StoreError;

/// Data access for one deduplication pass.
///
/// An implementation is already scoped to a single unit of work: every call
/// made through one value must land in the same transaction, and nothing is
/// visible to other readers until the driver that created it commits.
#[async_trait]
pub trait DedupStore: Send {
    /// All products with id, title, and release year.
    async fn load_products(&mut self) -> Result<Vec<ProductRecord>, StoreError>;

    /// Raw `platform` attribute values as `(product_id, value)` pairs.
    async fn load_platform_values(&mut self) -> Result<Vec<(i64, String)>, StoreError>;

    /// Offer count per product id. Products without offers may be absent.
    async fn load_offer_counts(&mut self) -> Result<HashMap<i64, i64>, StoreError>;

    /// Move every offer of `from` onto `to`; returns the number moved.
    async fn reassign_offers(&mut self, from: i64, to: i64) -> Result<u64, StoreError>;

    /// Copy every attribute of `from` onto `to` unless `to` already has the
    /// same `(name, value)` pair; returns the number copied.
    async fn copy_attributes_skip_duplicates(
        &mut self,
        from: i64,
        to: i64,
    ) -> Result<u64, StoreError>;

    /// Delete every attribute owned by `product_id`; returns the number deleted.
    async fn delete_attributes(&mut self, product_id: i64) -> Result<u64, StoreError>;

    /// Delete the product row itself.
    async fn delete_product(&mut self, product_id: i64) -> Result<(), StoreError>;
}
