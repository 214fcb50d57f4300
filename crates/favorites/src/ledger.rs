//! The favorites ledger: the current identity's favorite set and the only
//! path through which it changes.
//!
//! ## States
//! - `Unauthenticated`: nobody signed in, no ledger in memory
//! - `Loaded`: favorites hydrated from the store
//! - `Mutating`: a change is being written; the optimistic set is visible
//!
//! ## Guarantees
//! - Mutations are serialized by an async mutex held across the whole
//!   read-modify-write, so back-to-back toggles on one listing observe each
//!   other.
//! - A mutation only sticks once the store acknowledged the write. A failed
//!   write restores the pre-mutation set.
//! - Every sign-in and sign-out bumps a session epoch. A mutation whose epoch
//!   changed while its write was in flight leaves local state alone.

use crate::error::{LedgerError, Result};
use crate::store::IdentityStore;
use crate::types::{FavoritesSet, Identity, IdentityEvent, ToggleOutcome};
use catalog::ListingId;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerState {
    Unauthenticated,
    Loaded {
        identity: Identity,
        favorites: FavoritesSet,
    },
    Mutating {
        identity: Identity,
        favorites: FavoritesSet,
        pending: ListingId,
    },
}

/// State discriminant, for display and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerStatus {
    Unauthenticated,
    Loaded,
    Mutating,
}

impl LedgerState {
    pub fn status(&self) -> LedgerStatus {
        match self {
            LedgerState::Unauthenticated => LedgerStatus::Unauthenticated,
            LedgerState::Loaded { .. } => LedgerStatus::Loaded,
            LedgerState::Mutating { .. } => LedgerStatus::Mutating,
        }
    }

    fn identity(&self) -> Option<&Identity> {
        match self {
            LedgerState::Unauthenticated => None,
            LedgerState::Loaded { identity, .. } | LedgerState::Mutating { identity, .. } => {
                Some(identity)
            }
        }
    }

    fn favorites(&self) -> Option<&FavoritesSet> {
        match self {
            LedgerState::Unauthenticated => None,
            LedgerState::Loaded { favorites, .. } | LedgerState::Mutating { favorites, .. } => {
                Some(favorites)
            }
        }
    }
}

#[derive(Debug)]
struct LedgerInner {
    state: LedgerState,
    epoch: u64,
}

#[derive(Debug, Clone, Copy)]
enum Mutation {
    Toggle,
    Add,
    Remove,
}

pub struct FavoritesLedger {
    store: Arc<dyn IdentityStore>,
    inner: RwLock<LedgerInner>,
    mutation_lock: Mutex<()>,
}

impl FavoritesLedger {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self {
            store,
            inner: RwLock::new(LedgerInner {
                state: LedgerState::Unauthenticated,
                epoch: 0,
            }),
            mutation_lock: Mutex::new(()),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Membership test. False when nobody is signed in.
    pub fn is_favorite(&self, id: &ListingId) -> bool {
        self.read()
            .state
            .favorites()
            .is_some_and(|favorites| favorites.contains(id))
    }

    pub fn status(&self) -> LedgerStatus {
        self.read().state.status()
    }

    pub fn state(&self) -> LedgerState {
        self.read().state.clone()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.read().state.identity().cloned()
    }

    /// Snapshot of the favorite set, `None` when unauthenticated
    pub fn favorites(&self) -> Option<FavoritesSet> {
        self.read().state.favorites().cloned()
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Hydrate the ledger for `identity`.
    ///
    /// A missing record is created empty. If creating it fails the ledger
    /// still loads with an empty set; the next successful mutation creates
    /// the record. A failed read leaves the ledger unauthenticated.
    pub async fn sign_in(&self, identity: Identity) -> Result<()> {
        let epoch = self.begin_session();
        // Wait for any in-flight write so the read below sees it
        let _serial = self.mutation_lock.lock().await;

        let favorites = match self.store.read_favorites(&identity.id).await {
            Ok(Some(favorites)) => favorites,
            Ok(None) => {
                let empty = FavoritesSet::new();
                if let Err(e) = self.store.write_favorites(&identity.id, &empty).await {
                    warn!(
                        "Could not create favorites record for {}: {}",
                        identity.id, e
                    );
                }
                empty
            }
            Err(e) => {
                warn!("Failed to load favorites for {}: {}", identity.id, e);
                return Err(e.into());
            }
        };

        let mut inner = self.write();
        if inner.epoch != epoch {
            return Err(LedgerError::SessionLost);
        }
        info!(
            "Ledger loaded for {} with {} favorites",
            identity.id,
            favorites.len()
        );
        inner.state = LedgerState::Loaded {
            identity,
            favorites,
        };
        Ok(())
    }

    /// Restore the store's current session, if there is one.
    ///
    /// Returns whether an identity was restored.
    pub async fn restore_session(&self) -> Result<bool> {
        match self.store.current_identity().await? {
            Some(identity) => {
                self.sign_in(identity).await?;
                Ok(true)
            }
            None => {
                self.sign_out();
                Ok(false)
            }
        }
    }

    /// Discard the ledger. Any in-flight mutation loses its local effect.
    pub fn sign_out(&self) {
        let mut inner = self.write();
        inner.epoch += 1;
        if inner.state != LedgerState::Unauthenticated {
            info!("Ledger cleared on sign-out");
        }
        inner.state = LedgerState::Unauthenticated;
    }

    pub async fn handle_identity_event(&self, event: IdentityEvent) -> Result<()> {
        debug!("Identity event: {:?}", event);
        match event {
            IdentityEvent::SignedIn(identity) | IdentityEvent::SessionRestored(identity) => {
                self.sign_in(identity).await
            }
            IdentityEvent::SignedOut => {
                self.sign_out();
                Ok(())
            }
        }
    }

    /// Apply identity events until the channel closes.
    ///
    /// If the receiver lagged and dropped events, the session is re-read from
    /// the store instead.
    pub async fn follow_identity(&self, mut events: broadcast::Receiver<IdentityEvent>) {
        loop {
            let result = match events.recv().await {
                Ok(event) => self.handle_identity_event(event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Missed {} identity events, resyncing session", skipped);
                    self.restore_session().await.map(|_| ())
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if let Err(e) = result {
                warn!("Identity change not applied: {}", e);
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add the listing if absent, remove it if present.
    pub async fn toggle_favorite(&self, id: &ListingId) -> Result<ToggleOutcome> {
        match self.mutate(id, Mutation::Toggle).await? {
            Some(outcome) => Ok(outcome),
            // a toggle always changes the set
            None => Err(LedgerError::SessionLost),
        }
    }

    /// Returns whether the set changed
    pub async fn add_favorite(&self, id: &ListingId) -> Result<bool> {
        Ok(self.mutate(id, Mutation::Add).await?.is_some())
    }

    /// Returns whether the set changed
    pub async fn remove_favorite(&self, id: &ListingId) -> Result<bool> {
        Ok(self.mutate(id, Mutation::Remove).await?.is_some())
    }

    async fn mutate(&self, id: &ListingId, mutation: Mutation) -> Result<Option<ToggleOutcome>> {
        let _serial = self.mutation_lock.lock().await;

        let (identity, previous, epoch) = {
            let inner = self.read();
            match &inner.state {
                LedgerState::Loaded {
                    identity,
                    favorites,
                } => (identity.clone(), favorites.clone(), inner.epoch),
                LedgerState::Mutating { .. } => {
                    // Only reachable if another mutation's future was dropped
                    // mid-write and its rollback could not run.
                    return Err(LedgerError::SessionLost);
                }
                LedgerState::Unauthenticated => return Err(LedgerError::NotAuthenticated),
            }
        };

        let mut next = previous.clone();
        let outcome = match mutation {
            Mutation::Toggle => next.toggle(id.clone()),
            Mutation::Add if next.insert(id.clone()) => ToggleOutcome::Added,
            Mutation::Remove if next.remove(id) => ToggleOutcome::Removed,
            Mutation::Add | Mutation::Remove => return Ok(None),
        };

        self.write().state = LedgerState::Mutating {
            identity: identity.clone(),
            favorites: next.clone(),
            pending: id.clone(),
        };
        let mut rollback = Rollback {
            ledger: self,
            epoch,
            identity: identity.clone(),
            previous: previous.clone(),
            armed: true,
        };

        let written = self.store.write_favorites(&identity.id, &next).await;
        rollback.armed = false;

        let mut inner = self.write();
        if inner.epoch != epoch {
            warn!(
                "Session changed during favorites write for {}, discarding result",
                identity.id
            );
            return Err(LedgerError::SessionLost);
        }
        match written {
            Ok(()) => {
                debug!("{:?} listing {} for {}", outcome, id, identity.id);
                inner.state = LedgerState::Loaded {
                    identity,
                    favorites: next,
                };
                Ok(Some(outcome))
            }
            Err(e) => {
                warn!(
                    "Favorites write failed for {}, reverting: {}",
                    identity.id, e
                );
                inner.state = LedgerState::Loaded {
                    identity,
                    favorites: previous,
                };
                Err(LedgerError::Store(e))
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn begin_session(&self) -> u64 {
        let mut inner = self.write();
        inner.epoch += 1;
        inner.state = LedgerState::Unauthenticated;
        inner.epoch
    }

    fn read(&self) -> RwLockReadGuard<'_, LedgerInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Restores the pre-mutation set if a mutation future is dropped while its
/// write is in flight.
struct Rollback<'a> {
    ledger: &'a FavoritesLedger,
    epoch: u64,
    identity: Identity,
    previous: FavoritesSet,
    armed: bool,
}

impl Drop for Rollback<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.ledger.write();
        if inner.epoch == self.epoch {
            inner.state = LedgerState::Loaded {
                identity: self.identity.clone(),
                favorites: std::mem::take(&mut self.previous),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryIdentityStore;
    use crate::types::IdentityId;
    use std::time::Duration;

    fn id(raw: &str) -> ListingId {
        ListingId::from(raw)
    }

    fn setup() -> (Arc<MemoryIdentityStore>, FavoritesLedger) {
        let store = Arc::new(MemoryIdentityStore::new());
        let ledger = FavoritesLedger::new(store.clone());
        (store, ledger)
    }

    #[tokio::test]
    async fn test_unauthenticated_toggle_is_rejected() {
        let (store, ledger) = setup();

        let result = ledger.toggle_favorite(&id("1")).await;
        assert!(matches!(result, Err(LedgerError::NotAuthenticated)));
        assert_eq!(ledger.status(), LedgerStatus::Unauthenticated);
        assert!(!ledger.is_favorite(&id("1")));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_sign_in_hydrates_existing_record() {
        let user = IdentityId::from("u1");
        let store = Arc::new(
            MemoryIdentityStore::new()
                .with_record(&user, [id("4"), id("2")].into_iter().collect()),
        );
        let ledger = FavoritesLedger::new(store.clone());

        ledger.sign_in(Identity::new("u1")).await.unwrap();

        assert_eq!(ledger.status(), LedgerStatus::Loaded);
        assert!(ledger.is_favorite(&id("4")));
        assert!(ledger.is_favorite(&id("2")));
        assert!(!ledger.is_favorite(&id("3")));
    }

    #[tokio::test]
    async fn test_sign_in_creates_missing_record() {
        let (store, ledger) = setup();

        ledger.sign_in(Identity::new("u1")).await.unwrap();

        assert_eq!(ledger.favorites(), Some(FavoritesSet::new()));
        assert_eq!(
            store.stored_favorites(&IdentityId::from("u1")),
            Some(FavoritesSet::new())
        );
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_original() {
        let (store, ledger) = setup();
        ledger.sign_in(Identity::new("u1")).await.unwrap();
        let original = ledger.favorites();

        assert_eq!(
            ledger.toggle_favorite(&id("1")).await.unwrap(),
            ToggleOutcome::Added
        );
        assert!(ledger.is_favorite(&id("1")));

        assert_eq!(
            ledger.toggle_favorite(&id("1")).await.unwrap(),
            ToggleOutcome::Removed
        );
        assert!(!ledger.is_favorite(&id("1")));
        assert_eq!(ledger.favorites(), original);
        assert_eq!(
            store.stored_favorites(&IdentityId::from("u1")),
            original
        );
    }

    #[tokio::test]
    async fn test_toggle_present_id_twice_restores_original() {
        let user = IdentityId::from("u1");
        let store = Arc::new(
            MemoryIdentityStore::new()
                .with_record(&user, [id("a"), id("b")].into_iter().collect()),
        );
        let ledger = FavoritesLedger::new(store.clone());
        ledger.sign_in(Identity::new("u1")).await.unwrap();
        let original = ledger.favorites();

        assert_eq!(
            ledger.toggle_favorite(&id("a")).await.unwrap(),
            ToggleOutcome::Removed
        );
        assert_eq!(
            ledger.toggle_favorite(&id("a")).await.unwrap(),
            ToggleOutcome::Added
        );

        assert_eq!(ledger.favorites(), original);
        assert_eq!(store.stored_favorites(&user), original);
    }

    #[tokio::test]
    async fn test_cancelled_write_rolls_back() {
        let (store, ledger) = setup();
        ledger.sign_in(Identity::new("u1")).await.unwrap();
        ledger.toggle_favorite(&id("1")).await.unwrap();
        let before = ledger.favorites();
        store.set_write_delay(Some(Duration::from_millis(200)));

        let cancelled =
            tokio::time::timeout(Duration::from_millis(20), ledger.toggle_favorite(&id("2"))).await;

        assert!(cancelled.is_err());
        assert_eq!(ledger.status(), LedgerStatus::Loaded);
        assert_eq!(ledger.favorites(), before);
        assert!(!ledger.is_favorite(&id("2")));

        // The mutation lock was released with the dropped future
        store.set_write_delay(None);
        assert_eq!(
            ledger.toggle_favorite(&id("3")).await.unwrap(),
            ToggleOutcome::Added
        );
    }

    #[tokio::test]
    async fn test_failed_write_reverts() {
        let (store, ledger) = setup();
        ledger.sign_in(Identity::new("u1")).await.unwrap();
        ledger.toggle_favorite(&id("1")).await.unwrap();

        store.set_fail_writes(true);
        let result = ledger.toggle_favorite(&id("2")).await;

        assert!(matches!(result, Err(LedgerError::Store(_))));
        assert_eq!(ledger.status(), LedgerStatus::Loaded);
        assert!(ledger.is_favorite(&id("1")));
        assert!(!ledger.is_favorite(&id("2")));
    }

    #[tokio::test]
    async fn test_add_and_remove_are_idempotent() {
        let (store, ledger) = setup();
        ledger.sign_in(Identity::new("u1")).await.unwrap();
        let writes_after_sign_in = store.write_count();

        assert!(ledger.add_favorite(&id("5")).await.unwrap());
        assert!(!ledger.add_favorite(&id("5")).await.unwrap());
        assert!(ledger.remove_favorite(&id("5")).await.unwrap());
        assert!(!ledger.remove_favorite(&id("5")).await.unwrap());

        assert_eq!(store.write_count(), writes_after_sign_in + 2);
    }

    #[tokio::test]
    async fn test_sign_out_clears_ledger() {
        let (_store, ledger) = setup();
        ledger.sign_in(Identity::new("u1")).await.unwrap();
        ledger.toggle_favorite(&id("1")).await.unwrap();

        ledger.sign_out();

        assert_eq!(ledger.status(), LedgerStatus::Unauthenticated);
        assert!(ledger.current_identity().is_none());
        assert!(!ledger.is_favorite(&id("1")));
    }

    #[tokio::test]
    async fn test_restore_session() {
        let (store, ledger) = setup();
        assert!(!ledger.restore_session().await.unwrap());

        store.sign_in(Identity::new("u9"));
        assert!(ledger.restore_session().await.unwrap());
        assert_eq!(
            ledger.current_identity().map(|i| i.id),
            Some(IdentityId::from("u9"))
        );
    }
}
