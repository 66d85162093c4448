//! Blocking by release year.
//!
//! Products are only ever compared inside their own year bucket; unknown
//! years share one bucket that is kept apart from every concrete year. A
//! duplicate whose stored year differs between storefronts is therefore never
//! found.

use std::collections::BTreeMap;

use gamecat_core::ReleaseYear;

use crate::snapshot::Candidate;

/// Bucket candidates by release year. Buckets iterate in key order, and each
/// bucket keeps the input order of its members.
#[must_use]
pub fn block_by_year(candidates: &[Candidate]) -> BTreeMap<ReleaseYear, Vec<&Candidate>> {
    let mut buckets: BTreeMap<ReleaseYear, Vec<&Candidate>> = BTreeMap::new();
    for candidate in candidates {
        buckets
            .entry(candidate.release_year)
            .or_default()
            .push(candidate);
    }
    buckets
}
