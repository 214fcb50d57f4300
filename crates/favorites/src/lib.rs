//! # Favorites Crate
//!
//! Per-user favorite listings, kept in sync with an external identity and
//! document store.
//!
//! ## Components
//!
//! ### FavoritesLedger
//! The in-memory set for the signed-in user and the only way to change it.
//! Mutations are serialized, optimistic, and reverted when the store rejects
//! them.
//!
//! ### IdentityStore
//! The seam to the hosted backend: current session, per-user favorites
//! record, and a stream of sign-in/sign-out events.
//! - `MemoryIdentityStore`: in-process, with simulated latency and failures
//! - `JsonFileStore`: a JSON document on disk
//!
//! ## Example Usage
//!
//! ```ignore
//! use favorites::{FavoritesLedger, Identity, MemoryIdentityStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryIdentityStore::new());
//! let ledger = FavoritesLedger::new(store.clone());
//!
//! ledger.sign_in(Identity::new("u1")).await?;
//! ledger.toggle_favorite(&"42".into()).await?;
//! assert!(ledger.is_favorite(&"42".into()));
//! ```

pub mod error;
pub mod file_store;
pub mod ledger;
pub mod memory;
pub mod store;
pub mod types;

pub use error::{LedgerError, Result, StoreError};
pub use file_store::JsonFileStore;
pub use ledger::{FavoritesLedger, LedgerState, LedgerStatus};
pub use memory::MemoryIdentityStore;
pub use store::IdentityStore;
pub use types::{FavoritesSet, Identity, IdentityEvent, IdentityId, ToggleOutcome};
