//! Filter to keep only the selected makes.

use crate::traits::Filter;
use catalog::CarListing;
use std::collections::BTreeSet;

/// Keeps listings whose make is one of the selected makes.
pub struct MakeFilter {
    makes: BTreeSet<String>,
}

impl MakeFilter {
    pub fn new(makes: BTreeSet<String>) -> Self {
        Self { makes }
    }
}

impl Filter for MakeFilter {
    fn name(&self) -> &str {
        "MakeFilter"
    }

    fn matches(&self, listing: &CarListing) -> bool {
        self.makes.contains(&listing.make)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_filter() {
        let listings = vec![
            CarListing::new("1", "Toyota", "Camry", 2022, 25000.0),
            CarListing::new("2", "Tesla", "Model 3", 2023, 42000.0),
            CarListing::new("3", "Honda", "Civic", 2021, 21000.0),
        ];
        let makes = BTreeSet::from(["Honda".to_string(), "Toyota".to_string()]);

        let filtered = MakeFilter::new(makes).apply(listings);
        let ids: Vec<&str> = filtered.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
