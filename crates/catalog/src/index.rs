//! ListingIndex building and validation.
//!
//! The index keeps listings in fetch order (filter output must preserve it)
//! and adds an id lookup table on top for O(1) access by `ListingId`.

use crate::error::{CatalogError, Result};
use crate::types::*;
use std::collections::{BTreeSet, HashMap};

/// Earliest plausible model year; anything outside the range is a data error.
pub const MIN_MODEL_YEAR: u16 = 1886;
pub const MAX_MODEL_YEAR: u16 = 2100;

/// In-memory snapshot of a catalog fetched from a listing source.
#[derive(Debug, Clone, Default)]
pub struct ListingIndex {
    listings: Vec<CarListing>,
    by_id: HashMap<ListingId, usize>,
}

impl ListingIndex {
    /// Creates a new, empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from fetched listings, validating them first.
    ///
    /// Fails on duplicate ids, negative or non-finite prices, and model years
    /// outside `MIN_MODEL_YEAR..=MAX_MODEL_YEAR`.
    pub fn from_listings(listings: Vec<CarListing>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(listings.len());
        for (position, listing) in listings.iter().enumerate() {
            validate_listing(listing)?;
            if by_id.insert(listing.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId {
                    id: listing.id.clone(),
                });
            }
        }
        Ok(Self { listings, by_id })
    }

    /// All listings in fetch order
    pub fn listings(&self) -> &[CarListing] {
        &self.listings
    }

    /// Consume the index, returning the listings in fetch order
    pub fn into_listings(self) -> Vec<CarListing> {
        self.listings
    }

    pub fn get(&self, id: &ListingId) -> Option<&CarListing> {
        self.by_id.get(id).map(|&position| &self.listings[position])
    }

    pub fn contains(&self, id: &ListingId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Distinct, sorted filter options plus the price and year bounds.
    pub fn facets(&self) -> CatalogFacets {
        let mut makes = BTreeSet::new();
        let mut categories = BTreeSet::new();
        let mut fuel_types = BTreeSet::new();
        let mut transmissions = BTreeSet::new();
        let mut price_bounds: Option<(f64, f64)> = None;
        let mut year_bounds: Option<(u16, u16)> = None;

        for listing in &self.listings {
            makes.insert(listing.make.clone());
            insert_non_empty(&mut categories, &listing.category);
            insert_non_empty(&mut fuel_types, &listing.fuel_type);
            insert_non_empty(&mut transmissions, &listing.transmission);

            price_bounds = Some(match price_bounds {
                Some((lo, hi)) => (lo.min(listing.price), hi.max(listing.price)),
                None => (listing.price, listing.price),
            });
            year_bounds = Some(match year_bounds {
                Some((lo, hi)) => (lo.min(listing.year), hi.max(listing.year)),
                None => (listing.year, listing.year),
            });
        }

        CatalogFacets {
            makes: makes.into_iter().collect(),
            categories: categories.into_iter().collect(),
            fuel_types: fuel_types.into_iter().collect(),
            transmissions: transmissions.into_iter().collect(),
            price_bounds,
            year_bounds,
        }
    }
}

fn insert_non_empty(set: &mut BTreeSet<String>, value: &str) {
    if !value.is_empty() {
        set.insert(value.to_string());
    }
}

fn validate_listing(listing: &CarListing) -> Result<()> {
    if !listing.price.is_finite() || listing.price < 0.0 {
        return Err(CatalogError::InvalidValue {
            id: listing.id.clone(),
            field: "price".to_string(),
            value: listing.price.to_string(),
        });
    }
    if !(MIN_MODEL_YEAR..=MAX_MODEL_YEAR).contains(&listing.year) {
        return Err(CatalogError::InvalidValue {
            id: listing.id.clone(),
            field: "year".to_string(),
            value: listing.year.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_listings() -> Vec<CarListing> {
        vec![
            CarListing::new("1", "Toyota", "Camry", 2022, 25000.0)
                .with_category("sedan")
                .with_fuel_type("Petrol")
                .with_transmission("Automatic"),
            CarListing::new("2", "Tesla", "Model 3", 2023, 42000.0)
                .with_category("electric")
                .with_fuel_type("Electric")
                .with_transmission("Automatic"),
            CarListing::new("3", "BMW", "M3", 2019, 61000.0)
                .with_category("sports")
                .with_fuel_type("Petrol")
                .with_transmission("Manual"),
        ]
    }

    #[test]
    fn test_index_preserves_order_and_lookup() {
        let index = ListingIndex::from_listings(sample_listings()).unwrap();

        assert_eq!(index.len(), 3);
        let ids: Vec<&str> = index.listings().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(index.get(&ListingId::from("2")).unwrap().make, "Tesla");
        assert!(index.get(&ListingId::from("99")).is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut listings = sample_listings();
        listings.push(CarListing::new("1", "Honda", "Civic", 2020, 18000.0));

        let result = ListingIndex::from_listings(listings);
        assert!(matches!(result, Err(CatalogError::DuplicateId { .. })));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let negative = vec![CarListing::new("1", "Toyota", "Camry", 2022, -1.0)];
        assert!(matches!(
            ListingIndex::from_listings(negative),
            Err(CatalogError::InvalidValue { ref field, .. }) if field == "price"
        ));

        let ancient = vec![CarListing::new("1", "Benz", "Wagen", 1800, 1.0)];
        assert!(matches!(
            ListingIndex::from_listings(ancient),
            Err(CatalogError::InvalidValue { ref field, .. }) if field == "year"
        ));
    }

    #[test]
    fn test_facets_sorted_and_distinct() {
        let index = ListingIndex::from_listings(sample_listings()).unwrap();
        let facets = index.facets();

        assert_eq!(facets.makes, vec!["BMW", "Tesla", "Toyota"]);
        assert_eq!(facets.fuel_types, vec!["Electric", "Petrol"]);
        assert_eq!(facets.transmissions, vec!["Automatic", "Manual"]);
        assert_eq!(facets.price_bounds, Some((25000.0, 61000.0)));
        assert_eq!(facets.year_bounds, Some((2019, 2023)));
    }

    #[test]
    fn test_empty_index_has_no_bounds() {
        let facets = ListingIndex::new().facets();
        assert!(facets.makes.is_empty());
        assert!(facets.price_bounds.is_none());
        assert!(facets.year_bounds.is_none());
    }
}
