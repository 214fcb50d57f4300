//! Membership filters over enumerated attributes (fuel type, transmission).

use crate::traits::Filter;
use catalog::CarListing;
use std::collections::BTreeSet;

/// Keeps listings whose fuel type is in the selected set.
pub struct FuelTypeFilter {
    fuel_types: BTreeSet<String>,
}

impl FuelTypeFilter {
    pub fn new(fuel_types: BTreeSet<String>) -> Self {
        Self { fuel_types }
    }
}

impl Filter for FuelTypeFilter {
    fn name(&self) -> &str {
        "FuelTypeFilter"
    }

    fn matches(&self, listing: &CarListing) -> bool {
        self.fuel_types.contains(&listing.fuel_type)
    }
}

/// Keeps listings whose transmission is in the selected set.
pub struct TransmissionFilter {
    transmissions: BTreeSet<String>,
}

impl TransmissionFilter {
    pub fn new(transmissions: BTreeSet<String>) -> Self {
        Self { transmissions }
    }
}

impl Filter for TransmissionFilter {
    fn name(&self) -> &str {
        "TransmissionFilter"
    }

    fn matches(&self, listing: &CarListing) -> bool {
        self.transmissions.contains(&listing.transmission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings() -> Vec<CarListing> {
        vec![
            CarListing::new("1", "Toyota", "Camry", 2022, 25000.0)
                .with_fuel_type("Petrol")
                .with_transmission("Automatic"),
            CarListing::new("2", "Tesla", "Model 3", 2023, 42000.0)
                .with_fuel_type("Electric")
                .with_transmission("Automatic"),
            CarListing::new("3", "Mazda", "MX-5", 2020, 28000.0)
                .with_fuel_type("Petrol")
                .with_transmission("Manual"),
        ]
    }

    #[test]
    fn test_fuel_type_filter() {
        let filter = FuelTypeFilter::new(BTreeSet::from(["Electric".to_string()]));
        let filtered = filter.apply(listings());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id.as_str(), "2");
    }

    #[test]
    fn test_transmission_filter() {
        let filter = TransmissionFilter::new(BTreeSet::from(["Manual".to_string()]));
        let filtered = filter.apply(listings());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].model, "MX-5");
    }
}
