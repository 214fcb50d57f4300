//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern, and `apply_filter`,
//! the one-call entry point used by the storefront.

use crate::criteria::FilterCriteria;
use crate::filters::*;
use crate::traits::Filter;
use catalog::CarListing;
use tracing;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(TextQueryFilter::new("camry"))
///     .add_filter(PriceRangeFilter::new(Bounds::new(None, Some(30000.0))));
///
/// let filtered = pipeline.apply(listings);
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Build the pipeline for a set of criteria.
    ///
    /// Only active constraints get a filter, so unconstrained criteria produce
    /// an empty pipeline and the listings pass through untouched.
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        let mut pipeline = Self::new();
        if let Some(query) = criteria.active_query() {
            pipeline = pipeline.add_filter(TextQueryFilter::new(query));
        }
        if let Some(category) = criteria.active_category() {
            pipeline = pipeline.add_filter(CategoryFilter::new(category));
        }
        if !criteria.makes.is_empty() {
            pipeline = pipeline.add_filter(MakeFilter::new(criteria.makes.clone()));
        }
        if criteria.price.is_touched() {
            pipeline = pipeline.add_filter(PriceRangeFilter::new(criteria.price));
        }
        if criteria.year.is_touched() {
            pipeline = pipeline.add_filter(YearRangeFilter::new(criteria.year));
        }
        if !criteria.fuel_types.is_empty() {
            pipeline = pipeline.add_filter(FuelTypeFilter::new(criteria.fuel_types.clone()));
        }
        if !criteria.transmissions.is_empty() {
            pipeline = pipeline.add_filter(TransmissionFilter::new(criteria.transmissions.clone()));
        }
        pipeline
    }

    /// Number of filters in the pipeline
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the listings.
    ///
    /// Each filter sees the output of the previous one, and every filter
    /// preserves relative order, so the result is an ordered subsequence of
    /// the input.
    pub fn apply(&self, listings: Vec<CarListing>) -> Vec<CarListing> {
        let mut current = listings;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current);
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        current
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Produce the listings matching every active criterion, in input order.
///
/// Pure: the same arguments always give the same result.
pub fn apply_filter(listings: &[CarListing], criteria: &FilterCriteria) -> Vec<CarListing> {
    FilterPipeline::from_criteria(criteria).apply(listings.to_vec())
}
