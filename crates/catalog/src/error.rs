//! Error types for the catalog crate.
//!
//! Every failure a listing source can report maps onto one of these variants.
//! Callers above the catalog treat all of them except `NotFound` as a fetch
//! failure and keep showing the last catalog they had.

use crate::types::ListingId;
use thiserror::Error;

/// Errors that can occur while loading or querying car listings
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Listing file could not be found
    #[error("Listing file not found: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading the listing file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The listing payload was not valid JSON or did not match the listing shape
    #[error("Malformed listing data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Two listings share the same identifier
    #[error("Duplicate listing id: {id}")]
    DuplicateId { id: ListingId },

    /// A listing field had a value outside its valid range
    #[error("Invalid value for {field} on listing {id}: {value}")]
    InvalidValue {
        id: ListingId,
        field: String,
        value: String,
    },

    /// Requested listing does not exist in the source
    #[error("Listing {0} not found")]
    NotFound(ListingId),

    /// The source could not be reached at all
    #[error("Listing source unavailable: {0}")]
    Unavailable(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
