//! Core domain types for car listings.
//!
//! Listings arrive from two kinds of backends: document stores that key cars by
//! string ids and relational stores that key them by integer row ids. Both are
//! decoded into the same `ListingId` so nothing downstream depends on which
//! backend produced a listing.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// =============================================================================
// Identifiers
// =============================================================================

/// Unique identifier for a car listing.
///
/// The canonical form is text. Integer ids from relational backends render as
/// their decimal string, so `ListingId::from(7_i64)` equals `ListingId::from("7")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawListingId", into = "String")]
pub struct ListingId(String);

impl ListingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ListingId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for ListingId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<ListingId> for String {
    fn from(id: ListingId) -> Self {
        id.0
    }
}

/// Wire shape of an id: either a JSON string or a JSON integer.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawListingId {
    Text(String),
    Number(i64),
}

impl From<RawListingId> for ListingId {
    fn from(raw: RawListingId) -> Self {
        match raw {
            RawListingId::Text(text) => ListingId(text),
            RawListingId::Number(number) => ListingId::from(number),
        }
    }
}

// =============================================================================
// Listing
// =============================================================================

/// A single car available for browsing and favoriting.
///
/// Read-only reference data: listings are created and updated by the external
/// store and only ever replaced wholesale in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarListing {
    pub id: ListingId,
    pub make: String,
    pub model: String,
    pub year: u16,
    /// Purchase price, or the daily rate for rental catalogs
    #[serde(alias = "daily_rate", alias = "dailyRate")]
    pub price: f64,
    /// Body style tag such as "sedan" or "suv". Empty when the source has none.
    #[serde(default)]
    pub category: String,
    #[serde(default, alias = "fuel_type")]
    pub fuel_type: String,
    #[serde(default)]
    pub transmission: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, alias = "image_url", deserialize_with = "one_or_many")]
    pub images: Vec<String>,
    #[serde(default)]
    pub mileage: Option<u32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default = "default_available", alias = "inStock")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Accepts either a list of strings or a single string (the `image_url`
/// column of relational backends).
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(url) if url.is_empty() => Vec::new(),
        OneOrMany::One(url) => vec![url],
        OneOrMany::Many(urls) => urls,
    })
}

impl CarListing {
    /// Minimal listing with empty optional attributes. Mostly useful for
    /// building fixtures and static catalogs.
    pub fn new(
        id: impl Into<ListingId>,
        make: impl Into<String>,
        model: impl Into<String>,
        year: u16,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            make: make.into(),
            model: model.into(),
            year,
            price,
            category: String::new(),
            fuel_type: String::new(),
            transmission: String::new(),
            features: Vec::new(),
            images: Vec::new(),
            mileage: None,
            description: String::new(),
            rating: None,
            available: true,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_fuel_type(mut self, fuel_type: impl Into<String>) -> Self {
        self.fuel_type = fuel_type.into();
        self
    }

    pub fn with_transmission(mut self, transmission: impl Into<String>) -> Self {
        self.transmission = transmission.into();
        self
    }

    /// "2022 Toyota Camry"
    pub fn title(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }
}

// =============================================================================
// Facets
// =============================================================================

/// Distinct filter options present in a catalog.
///
/// A presentation layer renders its checkboxes and range sliders from this
/// instead of hard-coding makes or fuel types.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogFacets {
    pub makes: Vec<String>,
    pub categories: Vec<String>,
    pub fuel_types: Vec<String>,
    pub transmissions: Vec<String>,
    pub price_bounds: Option<(f64, f64)>,
    pub year_bounds: Option<(u16, u16)>,
}
