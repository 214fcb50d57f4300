//! Inclusive numeric range filters for price and model year.

use crate::criteria::Bounds;
use crate::traits::Filter;
use catalog::CarListing;

/// Keeps listings with `min <= price <= max`, either end optional.
pub struct PriceRangeFilter {
    bounds: Bounds<f64>,
}

impl PriceRangeFilter {
    pub fn new(bounds: Bounds<f64>) -> Self {
        Self { bounds }
    }
}

impl Filter for PriceRangeFilter {
    fn name(&self) -> &str {
        "PriceRangeFilter"
    }

    fn matches(&self, listing: &CarListing) -> bool {
        self.bounds.contains(listing.price)
    }
}

/// Keeps listings with `min <= year <= max`, either end optional.
pub struct YearRangeFilter {
    bounds: Bounds<u16>,
}

impl YearRangeFilter {
    pub fn new(bounds: Bounds<u16>) -> Self {
        Self { bounds }
    }
}

impl Filter for YearRangeFilter {
    fn name(&self) -> &str {
        "YearRangeFilter"
    }

    fn matches(&self, listing: &CarListing) -> bool {
        self.bounds.contains(listing.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings() -> Vec<CarListing> {
        vec![
            CarListing::new("1", "Toyota", "Camry", 2018, 15000.0),
            CarListing::new("2", "Tesla", "Model 3", 2023, 42000.0),
            CarListing::new("3", "Porsche", "911", 2021, 110000.0),
        ]
    }

    #[test]
    fn test_price_range_inclusive() {
        let filter = PriceRangeFilter::new(Bounds::new(Some(15000.0), Some(42000.0)));
        let filtered = filter.apply(listings());
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[1].id.as_str(), "2");
    }

    #[test]
    fn test_price_min_only() {
        let filter = PriceRangeFilter::new(Bounds::new(Some(50000.0), None));
        let filtered = filter.apply(listings());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].make, "Porsche");
    }

    #[test]
    fn test_inverted_price_range_is_empty() {
        let filter = PriceRangeFilter::new(Bounds::new(Some(50000.0), Some(10000.0)));
        assert!(filter.apply(listings()).is_empty());
    }

    #[test]
    fn test_year_max_only() {
        let filter = YearRangeFilter::new(Bounds::new(None, Some(2021)));
        let filtered = filter.apply(listings());
        let ids: Vec<&str> = filtered.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
