//! Exact category match.

use crate::traits::Filter;
use catalog::CarListing;

/// Keeps listings whose category tag equals the requested one.
/// The comparison is case-sensitive.
pub struct CategoryFilter {
    category: String,
}

impl CategoryFilter {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
        }
    }
}

impl Filter for CategoryFilter {
    fn name(&self) -> &str {
        "CategoryFilter"
    }

    fn matches(&self, listing: &CarListing) -> bool {
        listing.category == self.category
    }
}
