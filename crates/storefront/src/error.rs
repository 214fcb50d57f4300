//! Errors surfaced to the presentation layer.

use catalog::{CatalogError, ListingId};
use favorites::{LedgerError, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorefrontError {
    /// The listing source could not produce the catalog
    #[error("Failed to fetch listings: {0}")]
    FetchFailure(#[source] CatalogError),

    /// A favorites mutation was attempted with nobody signed in
    #[error("Sign in to save favorites")]
    AuthRequired,

    /// The favorites store rejected or failed a read/write
    #[error("Failed to sync favorites: {0}")]
    SyncFailure(#[source] StoreError),

    #[error("Listing not found: {0}")]
    NotFound(ListingId),

    /// The identity changed while a favorites write was in flight
    #[error("Session changed before the operation completed")]
    SessionLost,

    /// A filtering task panicked or was cancelled
    #[error("Background task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl From<CatalogError> for StorefrontError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => StorefrontError::NotFound(id),
            other => StorefrontError::FetchFailure(other),
        }
    }
}

impl From<LedgerError> for StorefrontError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotAuthenticated => StorefrontError::AuthRequired,
            LedgerError::Store(e) => StorefrontError::SyncFailure(e),
            LedgerError::SessionLost => StorefrontError::SessionLost,
        }
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
