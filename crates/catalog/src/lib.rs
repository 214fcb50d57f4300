//! # Catalog Crate
//!
//! Car listings and the sources they are fetched from.
//!
//! ## Main Components
//!
//! - **types**: `CarListing`, `ListingId`, `CatalogFacets`
//! - **source**: the `ListingSource` trait plus static and JSON-file adapters
//! - **parser**: JSON listing documents into validated listings
//! - **index**: `ListingIndex` for ordered storage, id lookup and facets
//! - **error**: `CatalogError`
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{JsonListingSource, ListingIndex, ListingSource};
//!
//! let source = JsonListingSource::new("data/cars.json");
//! let index = ListingIndex::from_listings(source.fetch_all_listings().await?)?;
//!
//! for make in index.facets().makes {
//!     println!("{make}");
//! }
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod source;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use index::ListingIndex;
pub use source::{JsonListingSource, ListingSource, StaticListingSource};
pub use types::{CarListing, CatalogFacets, ListingId};
