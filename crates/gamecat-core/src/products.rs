use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Release year as stored for a product.
///
/// Stored years are not trusted to be numeric: anything that does not parse
/// as an integer is `Unknown`, which is its own blocking bucket and never
/// compares equal to a concrete year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseYear {
    Known(i32),
    Unknown,
}

impl ReleaseYear {
    /// Parse a stored release-year value, degrading to `Unknown` on `NULL`,
    /// blank, or non-numeric input.
    #[must_use]
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<i32>().ok())
            .map_or(ReleaseYear::Unknown, ReleaseYear::Known)
    }
}

impl From<Option<i32>> for ReleaseYear {
    fn from(value: Option<i32>) -> Self {
        value.map_or(ReleaseYear::Unknown, ReleaseYear::Known)
    }
}

impl std::fmt::Display for ReleaseYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseYear::Known(year) => write!(f, "{year}"),
            ReleaseYear::Unknown => write!(f, "unknown"),
        }
    }
}

/// The attribute kinds recorded per product at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeName {
    Platform,
    Genre,
    Developer,
    Publisher,
    Rating,
}

impl AttributeName {
    /// The value stored in `attributes.attribute_name`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeName::Platform => "platform",
            AttributeName::Genre => "genre",
            AttributeName::Developer => "developer",
            AttributeName::Publisher => "publisher",
            AttributeName::Rating => "rating",
        }
    }
}

impl std::fmt::Display for AttributeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical product as seen by the deduplication pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    /// Display title; non-empty for every ingested product.
    pub canonical_name: String,
    pub release_year: ReleaseYear,
}

impl ProductRecord {
    #[must_use]
    pub fn new(id: i64, canonical_name: impl Into<String>, release_year: ReleaseYear) -> Self {
        Self {
            id,
            canonical_name: canonical_name.into(),
            release_year,
        }
    }
}

/// A listed price in the storefront's currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub amount: Decimal,
    /// Currency code as reported by the storefront, e.g. `"USD"`.
    pub currency: String,
}

/// A price listing from one storefront, attached to exactly one product.
///
/// `(website_name, source_id)` identifies the originating listing and is
/// unique across the whole store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: i64,
    pub product_id: i64,
    pub website_name: String,
    pub source_id: String,
    pub price: Option<Price>,
    pub url: String,
    pub date_parsed: DateTime<Utc>,
}

/// A `(name, value)` fact owned by one product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    pub product_id: i64,
    pub name: String,
    pub value: String,
}

impl Attribute {
    #[must_use]
    pub fn new(product_id: i64, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            product_id,
            name: name.into(),
            value: value.into(),
        }
    }

    /// Whether `self` and `other` carry the same `(name, value)` pair,
    /// regardless of owner.
    #[must_use]
    pub fn same_fact(&self, other: &Attribute) -> bool {
        self.name == other.name && self.value == other.value
    }
}
