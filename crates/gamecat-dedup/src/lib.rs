//! Catalog deduplication: find products that describe the same game and fold
//! them into one survivor inside a single unit of work.
//!
//! A pass reads a [`Snapshot`], buckets products by release year, links every
//! matching pair within a bucket, takes connected components as clusters, and
//! merges each cluster's losers into the product with the most offers.

pub mod blocking;
pub mod cluster;
pub mod engine;
pub mod error;
pub mod memory;
pub mod merge;
pub mod pg;
pub mod report;
pub mod similarity;
pub mod snapshot;
pub mod store;
pub mod survivor;
pub mod union_find;

pub use cluster::{find_clusters, ClusterScan};
pub use engine::DedupEngine;
pub use error::{DedupError, StoreError};
pub use memory::{MemoryStore, MemoryTransaction};
pub use merge::MergeOutcome;
pub use pg::{run_dedup_pass, PgDedupStore, DEDUP_LOCK_KEY};
pub use report::{DedupReport, RunMode};
pub use similarity::{fuzzy_ratio, normalize_name, normalize_platform, MatchKey, SimilarityPolicy};
pub use snapshot::{Candidate, Snapshot};
pub use store::DedupStore;
pub use survivor::{select_survivor, MergePlan};
