//! Listing sources: the catalog's view of the external listing store.
//!
//! `ListingSource` is the seam between the core and whichever backend hosts the
//! catalog. Two adapters live here: a static in-memory source and a JSON file
//! source. Hosted backends implement the same trait.

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::{CarListing, ListingId};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

/// Sole source of truth for catalog contents.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Source identifier for logging
    fn name(&self) -> &str;

    /// Fetch every listing, in the order the backend returns them.
    async fn fetch_all_listings(&self) -> Result<Vec<CarListing>>;

    /// Fetch one listing. Missing ids yield `CatalogError::NotFound`.
    async fn fetch_listing_by_id(&self, id: &ListingId) -> Result<CarListing>;
}

/// Listings held in memory, returned as given.
#[derive(Debug, Clone, Default)]
pub struct StaticListingSource {
    listings: Vec<CarListing>,
}

impl StaticListingSource {
    pub fn new(listings: Vec<CarListing>) -> Self {
        Self { listings }
    }
}

#[async_trait]
impl ListingSource for StaticListingSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_all_listings(&self) -> Result<Vec<CarListing>> {
        Ok(self.listings.clone())
    }

    async fn fetch_listing_by_id(&self, id: &ListingId) -> Result<CarListing> {
        self.listings
            .iter()
            .find(|listing| &listing.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }
}

/// Listings read from a JSON document on disk.
///
/// The file is re-read on every fetch; nothing is cached beyond the caller's
/// session.
#[derive(Debug, Clone)]
pub struct JsonListingSource {
    path: PathBuf,
}

impl JsonListingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ListingSource for JsonListingSource {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn fetch_all_listings(&self) -> Result<Vec<CarListing>> {
        let listings = parser::load_listings_file(&self.path).await?;
        info!(
            "Loaded {} listings from {}",
            listings.len(),
            self.path.display()
        );
        Ok(listings)
    }

    async fn fetch_listing_by_id(&self, id: &ListingId) -> Result<CarListing> {
        debug!("Looking up listing {} in {}", id, self.path.display());
        parser::load_listings_file(&self.path)
            .await?
            .into_iter()
            .find(|listing| &listing.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }
}
