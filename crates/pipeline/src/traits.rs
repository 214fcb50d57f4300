//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to a listing set.

use catalog::CarListing;
use rayon::prelude::*;

/// Core trait for filtering listings.
///
/// A filter is a pure predicate over a single listing. Filters never fail:
/// criteria that cannot match anything simply produce an empty result.
///
/// `Send + Sync` lets `apply` evaluate the predicate on rayon's pool.
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Whether a single listing satisfies this filter.
    fn matches(&self, listing: &CarListing) -> bool;

    /// Apply this filter to a set of listings, keeping their relative order.
    fn apply(&self, listings: Vec<CarListing>) -> Vec<CarListing> {
        listings
            .into_par_iter()
            .filter(|listing| self.matches(listing))
            .collect()
    }
}
