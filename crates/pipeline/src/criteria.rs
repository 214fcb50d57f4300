//! User-supplied filter criteria.
//!
//! Every field is independently optional. An absent or empty field imposes no
//! constraint, so `FilterCriteria::default()` matches every listing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Category value the UI sends for "All Categories".
pub const ALL_CATEGORIES: &str = "all";

/// Inclusive numeric bounds. Either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    /// At least one end has been set
    pub fn is_touched(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn contains(&self, value: T) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Constraints used to narrow the listing set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Free text matched against make, model and year
    pub query: Option<String>,
    /// Exact, case-sensitive category tag
    pub category: Option<String>,
    pub makes: BTreeSet<String>,
    pub price: Bounds<f64>,
    pub year: Bounds<u16>,
    pub fuel_types: BTreeSet<String>,
    pub transmissions: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Sets the category; the "all" sentinel clears it.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = (category != ALL_CATEGORIES).then_some(category);
        self
    }

    pub fn with_make(mut self, make: impl Into<String>) -> Self {
        self.makes.insert(make.into());
        self
    }

    pub fn with_price(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.price = Bounds::new(min, max);
        self
    }

    pub fn with_year(mut self, min: Option<u16>, max: Option<u16>) -> Self {
        self.year = Bounds::new(min, max);
        self
    }

    pub fn with_fuel_type(mut self, fuel_type: impl Into<String>) -> Self {
        self.fuel_types.insert(fuel_type.into());
        self
    }

    pub fn with_transmission(mut self, transmission: impl Into<String>) -> Self {
        self.transmissions.insert(transmission.into());
        self
    }

    /// The query if it constrains anything. Blank queries are treated as absent.
    pub fn active_query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .filter(|query| !query.trim().is_empty())
    }

    /// The category if set and not empty.
    pub fn active_category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .filter(|category| !category.is_empty())
    }

    /// No field constrains anything
    pub fn is_unconstrained(&self) -> bool {
        self.active_query().is_none()
            && self.active_category().is_none()
            && active_filter_count(self) == 0
    }

    /// Reset every constraint
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Number of constraint categories currently active, for UI badges.
///
/// Counts the make set, price range, year range, fuel set and transmission
/// set. The free-text query and category are not counted; they have their own
/// controls.
pub fn active_filter_count(criteria: &FilterCriteria) -> usize {
    [
        !criteria.makes.is_empty(),
        criteria.price.is_touched(),
        criteria.year.is_touched(),
        !criteria.fuel_types.is_empty(),
        !criteria.transmissions.is_empty(),
    ]
    .into_iter()
    .filter(|active| *active)
    .count()
}
