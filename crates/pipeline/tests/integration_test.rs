//! Integration tests for the pipeline.
//!
//! These check the properties every caller relies on: order preservation,
//! the identity law for empty criteria, purity, and the documented scenarios.

use catalog::{CarListing, ListingId};
use pipeline::{apply_filter, active_filter_count, FilterCriteria};

fn create_test_listings() -> Vec<CarListing> {
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
        CarListing::new("4", "Toyota", "RAV4", 2021, 31000.0)
            .with_category("suv")
            .with_fuel_type("Hybrid")
            .with_transmission("Automatic"),
        CarListing::new("5", "Ford", "Mustang Mach-E", 2022, 48000.0)
            .with_category("electric")
            .with_fuel_type("Electric")
            .with_transmission("Automatic"),
    ]
}

fn ids(listings: &[CarListing]) -> Vec<String> {
    listings.iter().map(|l| l.id.to_string()).collect()
}

/// True if `sub` appears in `full` in the same relative order
fn is_subsequence(sub: &[CarListing], full: &[CarListing]) -> bool {
    let mut remaining = full.iter();
    sub.iter()
        .all(|wanted| remaining.any(|candidate| candidate.id == wanted.id))
}

fn sample_criteria() -> Vec<FilterCriteria> {
    vec![
        FilterCriteria::new(),
        FilterCriteria::new().with_query("toyota"),
        FilterCriteria::new().with_query("202"),
        FilterCriteria::new().with_category("electric"),
        FilterCriteria::new().with_make("Toyota").with_make("Ford"),
        FilterCriteria::new().with_price(Some(30000.0), Some(50000.0)),
        FilterCriteria::new().with_year(Some(2021), None),
        FilterCriteria::new()
            .with_fuel_type("Electric")
            .with_transmission("Automatic"),
        FilterCriteria::new()
            .with_query("m")
            .with_price(None, Some(60000.0))
            .with_year(Some(2020), Some(2023)),
    ]
}

#[test]
fn test_result_is_ordered_subsequence() {
    let listings = create_test_listings();
    for criteria in sample_criteria() {
        let filtered = apply_filter(&listings, &criteria);
        assert!(
            is_subsequence(&filtered, &listings),
            "Result for {:?} should preserve input order",
            criteria
        );
    }
}

#[test]
fn test_empty_criteria_is_identity() {
    let listings = create_test_listings();
    assert_eq!(apply_filter(&listings, &FilterCriteria::default()), listings);
    assert!(apply_filter(&[], &FilterCriteria::default()).is_empty());
}

#[test]
fn test_filtering_is_repeatable() {
    let listings = create_test_listings();
    for criteria in sample_criteria() {
        let first = apply_filter(&listings, &criteria);
        let second = apply_filter(&listings, &criteria);
        assert_eq!(first, second, "Filtering should be pure for {:?}", criteria);
    }
}

#[test]
fn test_inverted_price_range_yields_nothing() {
    let listings = create_test_listings();
    let criteria = FilterCriteria::new().with_price(Some(50000.0), Some(20000.0));
    assert!(apply_filter(&listings, &criteria).is_empty());
}

#[test]
fn test_fuel_type_scenario() {
    let listings = vec![
        CarListing::new("1", "Toyota", "Camry", 2022, 25000.0).with_fuel_type("Petrol"),
        CarListing::new("2", "Tesla", "Model 3", 2023, 42000.0).with_fuel_type("Electric"),
    ];
    let criteria: FilterCriteria = serde_json::from_str(r#"{"fuelTypes": ["Electric"]}"#).unwrap();

    let filtered = apply_filter(&listings, &criteria);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, ListingId::from(2_i64));
}

#[test]
fn test_year_as_text_scenario() {
    let listings = vec![
        CarListing::new("1", "Toyota", "Camry", 2022, 25000.0).with_fuel_type("Petrol"),
        CarListing::new("2", "Tesla", "Model 3", 2023, 42000.0).with_fuel_type("Electric"),
    ];
    let criteria = FilterCriteria::new().with_query("2022");

    let filtered = apply_filter(&listings, &criteria);
    assert_eq!(ids(&filtered), vec!["1"]);
}

#[test]
fn test_all_criteria_must_match() {
    let listings = create_test_listings();
    let criteria = FilterCriteria::new()
        .with_make("Toyota")
        .with_fuel_type("Hybrid")
        .with_year(Some(2020), None);

    assert_eq!(ids(&apply_filter(&listings, &criteria)), vec!["4"]);
    assert_eq!(active_filter_count(&criteria), 3);
}

#[test]
fn test_electric_category_and_query_combined() {
    let listings = create_test_listings();
    let criteria = FilterCriteria::new()
        .with_category("electric")
        .with_query("ford");

    assert_eq!(ids(&apply_filter(&listings, &criteria)), vec!["5"]);
}
