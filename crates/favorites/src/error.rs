//! Error types for the favorites crate.

use thiserror::Error;

/// Failures reported by an identity/favorites store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed store document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Backend could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the write
    #[error("Store rejected the write: {0}")]
    Rejected(String),
}

/// Failures of ledger operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A mutation was attempted with nobody signed in
    #[error("No identity is signed in")]
    NotAuthenticated,

    /// Reading or writing the remote record failed; local state was reverted
    #[error("Favorites sync failed: {0}")]
    Store(#[from] StoreError),

    /// The identity changed while the operation was in flight; its result was
    /// not applied locally
    #[error("Session changed while the operation was in flight")]
    SessionLost,
}

pub type Result<T> = std::result::Result<T, LedgerError>;
