//! Parser for JSON listing documents.
//!
//! Two document shapes are accepted:
//! - a bare array of listings: `[{...}, {...}]`
//! - an object wrapping the array: `{ "cars": [{...}] }`
//!
//! Parsed listings are validated through `ListingIndex` before being handed
//! back, so a malformed catalog never reaches the filter.

use crate::error::{CatalogError, Result};
use crate::index::ListingIndex;
use crate::types::CarListing;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum ListingsDocument {
    Bare(Vec<CarListing>),
    Wrapped { cars: Vec<CarListing> },
}

/// Parse and validate a listing document held in memory.
pub fn parse_listings(content: &str) -> Result<Vec<CarListing>> {
    let listings = match serde_json::from_str::<ListingsDocument>(content)? {
        ListingsDocument::Bare(listings) => listings,
        ListingsDocument::Wrapped { cars } => cars,
    };
    Ok(ListingIndex::from_listings(listings)?.into_listings())
}

/// Read, parse and validate a listing file.
pub async fn load_listings_file(path: &Path) -> Result<Vec<CarListing>> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CatalogError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            CatalogError::Io(e)
        }
    })?;
    parse_listings(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ListingId;

    #[test]
    fn test_parse_bare_array() {
        let json = r#"[
            {"id": 1, "make": "Toyota", "model": "Camry", "year": 2022, "price": 25000},
            {"id": 2, "make": "Tesla", "model": "Model 3", "year": 2023, "price": 42000}
        ]"#;

        let listings = parse_listings(json).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[1].id, ListingId::from(2_i64));
    }

    #[test]
    fn test_parse_wrapped_document() {
        let json = r#"{"cars": [
            {"id": "a", "make": "Audi", "model": "A4", "year": 2020, "daily_rate": 80}
        ]}"#;

        let listings = parse_listings(json).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].price, 80.0);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_listings("{not json"),
            Err(CatalogError::Malformed(_))
        ));
        assert!(matches!(
            parse_listings(r#"[{"id": 1, "make": "Toyota"}]"#),
            Err(CatalogError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_rejects_duplicates() {
        let json = r#"[
            {"id": 1, "make": "Toyota", "model": "Camry", "year": 2022, "price": 1},
            {"id": "1", "make": "Toyota", "model": "Corolla", "year": 2021, "price": 1}
        ]"#;
        assert!(matches!(
            parse_listings(json),
            Err(CatalogError::DuplicateId { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = load_listings_file(Path::new("/definitely/not/here.json")).await;
        assert!(matches!(result, Err(CatalogError::FileNotFound { .. })));
    }
}
