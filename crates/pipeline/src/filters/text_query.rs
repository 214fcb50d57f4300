//! Free-text search over make, model and year.

use crate::traits::Filter;
use catalog::CarListing;

/// Keeps listings whose make, model or year contains the query.
///
/// ## Algorithm
/// Lowercase both sides, then substring-match the query against
/// `make`, `model` and the year rendered as text ("2022").
pub struct TextQueryFilter {
    needle: String,
}

impl TextQueryFilter {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.to_lowercase(),
        }
    }
}

impl Filter for TextQueryFilter {
    fn name(&self) -> &str {
        "TextQueryFilter"
    }

    fn matches(&self, listing: &CarListing) -> bool {
        listing.make.to_lowercase().contains(&self.needle)
            || listing.model.to_lowercase().contains(&self.needle)
            || listing.year.to_string().contains(&self.needle)
    }
}
