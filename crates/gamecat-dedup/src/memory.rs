//! In-process catalog with the same referential rules as the Postgres schema.
//!
//! Writes go through a [`MemoryTransaction`] that works on a private copy of
//! the catalog; [`MemoryTransaction::commit`] publishes it and dropping the
//! transaction discards it.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use gamecat_core::{Attribute, AttributeName, Offer, ProductRecord};
use gamecat_db::DbError;

use crate::{DedupEngine, DedupError, DedupReport, DedupStore, RunMode, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Catalog {
    products: BTreeMap<i64, ProductRecord>,
    offers: BTreeMap<i64, Offer>,
    attributes: Vec<Attribute>,
}

impl Catalog {
    fn require_product(&self, id: i64) -> Result<(), StoreError> {
        if self.products.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::Constraint(format!(
                "product {id} does not exist"
            )))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    committed: Catalog,
    fail_on_write: Option<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Constraint`] if the id is already taken.
    pub fn insert_product(&mut self, product: ProductRecord) -> Result<(), StoreError> {
        if self.committed.products.contains_key(&product.id) {
            return Err(StoreError::Constraint(format!(
                "duplicate product id {}",
                product.id
            )));
        }
        self.committed.products.insert(product.id, product);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Constraint`] if the owning product is missing or
    /// the id or `(website_name, source_id)` pair is already taken.
    pub fn insert_offer(&mut self, offer: Offer) -> Result<(), StoreError> {
        self.committed.require_product(offer.product_id)?;
        if self.committed.offers.contains_key(&offer.id) {
            return Err(StoreError::Constraint(format!(
                "duplicate offer id {}",
                offer.id
            )));
        }
        let listing_taken = self
            .committed
            .offers
            .values()
            .any(|o| o.website_name == offer.website_name && o.source_id == offer.source_id);
        if listing_taken {
            return Err(StoreError::Constraint(format!(
                "duplicate listing {}/{}",
                offer.website_name, offer.source_id
            )));
        }
        self.committed.offers.insert(offer.id, offer);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Constraint`] if the owning product is missing.
    pub fn insert_attribute(&mut self, attribute: Attribute) -> Result<(), StoreError> {
        self.committed.require_product(attribute.product_id)?;
        self.committed.attributes.push(attribute);
        Ok(())
    }

    /// Make the `n`th write (1-based) of every later transaction fail with
    /// [`StoreError::Unavailable`].
    pub fn fail_on_write(&mut self, n: usize) {
        self.fail_on_write = Some(n);
    }

    pub fn clear_failures(&mut self) {
        self.fail_on_write = None;
    }

    #[must_use]
    pub fn product(&self, id: i64) -> Option<&ProductRecord> {
        self.committed.products.get(&id)
    }

    #[must_use]
    pub fn product_ids(&self) -> Vec<i64> {
        self.committed.products.keys().copied().collect()
    }

    /// Offers attached to `product_id`, ordered by offer id.
    #[must_use]
    pub fn offers_for(&self, product_id: i64) -> Vec<&Offer> {
        self.committed
            .offers
            .values()
            .filter(|o| o.product_id == product_id)
            .collect()
    }

    #[must_use]
    pub fn offer(&self, id: i64) -> Option<&Offer> {
        self.committed.offers.get(&id)
    }

    /// Attributes owned by `product_id`, in insertion order.
    #[must_use]
    pub fn attributes_for(&self, product_id: i64) -> Vec<&Attribute> {
        self.committed
            .attributes
            .iter()
            .filter(|a| a.product_id == product_id)
            .collect()
    }

    /// Start a unit of work over a copy of the current catalog.
    #[must_use]
    pub fn begin(&mut self) -> MemoryTransaction<'_> {
        MemoryTransaction {
            working: self.committed.clone(),
            writes: 0,
            fail_on_write: self.fail_on_write,
            store: self,
        }
    }

    /// Run one pass in its own transaction; commit only an applied, successful
    /// run.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`DedupError`]; the catalog is then unchanged.
    pub async fn run_pass(
        &mut self,
        engine: &DedupEngine,
        mode: RunMode,
    ) -> Result<DedupReport, DedupError> {
        let mut tx = self.begin();
        let report = engine.run(&mut tx, mode).await?;
        if mode.writes() {
            tx.commit();
        }
        Ok(report)
    }
}

/// A pending unit of work against a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryTransaction<'a> {
    store: &'a mut MemoryStore,
    working: Catalog,
    writes: usize,
    fail_on_write: Option<usize>,
}

impl MemoryTransaction<'_> {
    pub fn commit(self) {
        self.store.committed = self.working;
    }

    fn begin_write(&mut self, op: &str) -> Result<(), StoreError> {
        self.writes += 1;
        if self.fail_on_write == Some(self.writes) {
            return Err(StoreError::Unavailable(format!(
                "injected failure on write {} ({op})",
                self.writes
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<'a> DedupStore for MemoryTransaction<'a> {
    async fn load_products(&mut self) -> Result<Vec<ProductRecord>, StoreError> {
        Ok(self.working.products.values().cloned().collect())
    }

    async fn load_platform_values(&mut self) -> Result<Vec<(i64, String)>, StoreError> {
        let platform = AttributeName::Platform.as_str();
        Ok(self
            .working
            .attributes
            .iter()
            .filter(|a| a.name == platform)
            .map(|a| (a.product_id, a.value.clone()))
            .collect())
    }

    async fn load_offer_counts(&mut self) -> Result<HashMap<i64, i64>, StoreError> {
        let mut counts = HashMap::new();
        for offer in self.working.offers.values() {
            *counts.entry(offer.product_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn reassign_offers(&mut self, from: i64, to: i64) -> Result<u64, StoreError> {
        self.begin_write("reassign_offers")?;
        self.working.require_product(to)?;
        let mut moved = 0;
        for offer in self.working.offers.values_mut() {
            if offer.product_id == from {
                offer.product_id = to;
                moved += 1;
            }
        }
        Ok(moved)
    }

    async fn copy_attributes_skip_duplicates(
        &mut self,
        from: i64,
        to: i64,
    ) -> Result<u64, StoreError> {
        self.begin_write("copy_attributes_skip_duplicates")?;
        let source: Vec<Attribute> = self
            .working
            .attributes
            .iter()
            .filter(|a| a.product_id == from)
            .cloned()
            .collect();
        if source.is_empty() {
            return Ok(0);
        }
        self.working.require_product(to)?;

        let mut copied = 0;
        for attribute in source {
            let present = self
                .working
                .attributes
                .iter()
                .any(|a| a.product_id == to && a.same_fact(&attribute));
            if !present {
                self.working
                    .attributes
                    .push(Attribute::new(to, attribute.name, attribute.value));
                copied += 1;
            }
        }
        Ok(copied)
    }

    async fn delete_attributes(&mut self, product_id: i64) -> Result<u64, StoreError> {
        self.begin_write("delete_attributes")?;
        let before = self.working.attributes.len();
        self.working.attributes.retain(|a| a.product_id != product_id);
        Ok((before - self.working.attributes.len()) as u64)
    }

    async fn delete_product(&mut self, product_id: i64) -> Result<(), StoreError> {
        self.begin_write("delete_product")?;
        if !self.working.products.contains_key(&product_id) {
            return Err(StoreError::Db(DbError::NotFound));
        }
        let referenced = self
            .working
            .offers
            .values()
            .any(|o| o.product_id == product_id)
            || self
                .working
                .attributes
                .iter()
                .any(|a| a.product_id == product_id);
        if referenced {
            return Err(StoreError::Constraint(format!(
                "product {product_id} is still referenced"
            )));
        }
        self.working.products.remove(&product_id);
        Ok(())
    }
}
