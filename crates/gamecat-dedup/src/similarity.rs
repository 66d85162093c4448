//! Pairwise match decision: normalized title similarity AND platform overlap.

use std::collections::BTreeSet;

use gamecat_core::DEFAULT_FUZZY_THRESHOLD;
use rapidfuzz::distance::indel;

/// Lowercase, trim, and collapse internal whitespace runs to one space.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a stored platform value; blank values carry no information and
/// yield `None`.
#[must_use]
pub fn normalize_platform(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// `(matched, total)` for two strings, counted in chars: `total` is the
/// combined length and `matched` is `total` minus the Indel distance, i.e.
/// twice the longest common subsequence.
fn indel_parts(a: &str, b: &str) -> (usize, usize) {
    let total = a.chars().count() + b.chars().count();
    let distance = indel::distance(a.chars(), b.chars());
    (total - distance, total)
}

/// Indel similarity of two strings on a 0–100 scale:
/// `100 * (len(a) + len(b) - indel_distance) / (len(a) + len(b))`.
///
/// Two empty strings are identical (100).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fuzzy_ratio(a: &str, b: &str) -> f64 {
    let (matched, total) = indel_parts(a, b);
    if total == 0 {
        return 100.0;
    }
    100.0 * matched as f64 / total as f64
}

/// Empty platform sets are wildcards; otherwise the sets must intersect.
#[must_use]
pub fn platforms_compatible(a: &BTreeSet<String>, b: &BTreeSet<String>) -> bool {
    a.is_empty() || b.is_empty() || !a.is_disjoint(b)
}

/// A product reduced to the signals the matcher looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchKey {
    pub id: i64,
    /// Output of [`normalize_name`].
    pub name: String,
    /// Outputs of [`normalize_platform`].
    pub platforms: BTreeSet<String>,
}

/// The pairwise match rule. Deterministic and symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityPolicy {
    threshold: u8,
}

impl Default for SimilarityPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

impl SimilarityPolicy {
    /// `threshold` is clamped to 100.
    #[must_use]
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold: threshold.min(100),
        }
    }

    #[must_use]
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Whether two normalized names count as the same title.
    #[must_use]
    pub fn names_match(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        let (len_a, len_b) = (a.chars().count(), b.chars().count());
        let threshold = usize::from(self.threshold);

        // ratio >= threshold  <=>  100 * matched >= threshold * total.
        // matched <= 2 * min(len) bounds it before the distance is computed.
        if 200 * len_a.min(len_b) < threshold * (len_a + len_b) {
            return false;
        }
        let (matched, total) = indel_parts(a, b);
        100 * matched >= threshold * total
    }

    /// Both the name condition and the platform condition must hold.
    #[must_use]
    pub fn matches(&self, a: &MatchKey, b: &MatchKey) -> bool {
        platforms_compatible(&a.platforms, &b.platforms) && self.names_match(&a.name, &b.name)
    }
}

#[cfg(test)]
#[path = "similarity_test.rs"]
mod tests;
