//! The identity/favorites store seam.
//!
//! Hosted identity providers (document-store or relational) implement
//! `IdentityStore`; the ledger never sees their data shapes.

use crate::error::StoreError;
use crate::types::{FavoritesSet, Identity, IdentityEvent, IdentityId};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Capacity of the identity event channel each store keeps.
pub const IDENTITY_EVENT_CAPACITY: usize = 16;

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Store identifier for logging
    fn name(&self) -> &str;

    /// The signed-in identity, if any
    async fn current_identity(&self) -> Result<Option<Identity>, StoreError>;

    /// The identity's favorites record. `None` when no record exists yet.
    async fn read_favorites(&self, identity: &IdentityId)
        -> Result<Option<FavoritesSet>, StoreError>;

    /// Replace the identity's favorites record.
    async fn write_favorites(
        &self,
        identity: &IdentityId,
        favorites: &FavoritesSet,
    ) -> Result<(), StoreError>;

    /// Sign-in, sign-out and session-restore notifications
    fn subscribe(&self) -> broadcast::Receiver<IdentityEvent>;
}
