//! In-memory identity store.
//!
//! Used by tests and demos in place of a hosted identity provider. Supports
//! simulated latency and failing writes so the ledger's rollback and
//! serialization paths can be exercised.

use crate::error::StoreError;
use crate::store::{IDENTITY_EVENT_CAPACITY, IdentityStore};
use crate::types::{FavoritesSet, Identity, IdentityEvent, IdentityId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Default)]
struct MemoryState {
    current: Option<Identity>,
    records: HashMap<IdentityId, FavoritesSet>,
    fail_writes: bool,
    write_delay: Option<Duration>,
    write_count: usize,
}

pub struct MemoryIdentityStore {
    state: Mutex<MemoryState>,
    events: broadcast::Sender<IdentityEvent>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(IDENTITY_EVENT_CAPACITY);
        Self {
            state: Mutex::new(MemoryState::default()),
            events,
        }
    }

    /// Seed a favorites record (builder pattern)
    pub fn with_record(self, identity: &IdentityId, favorites: FavoritesSet) -> Self {
        self.lock().records.insert(identity.clone(), favorites);
        self
    }

    /// Make the given identity current and notify subscribers.
    pub fn sign_in(&self, identity: Identity) {
        self.lock().current = Some(identity.clone());
        let _ = self.events.send(IdentityEvent::SignedIn(identity));
    }

    /// Notify subscribers that the current session was restored.
    pub fn restore(&self) {
        let current = self.lock().current.clone();
        if let Some(identity) = current {
            let _ = self.events.send(IdentityEvent::SessionRestored(identity));
        }
    }

    pub fn sign_out(&self) {
        self.lock().current = None;
        let _ = self.events.send(IdentityEvent::SignedOut);
    }

    /// Make every subsequent write fail until reset
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Delay every write by `delay` to simulate network latency
    pub fn set_write_delay(&self, delay: Option<Duration>) {
        self.lock().write_delay = delay;
    }

    /// What the "remote" record currently holds
    pub fn stored_favorites(&self, identity: &IdentityId) -> Option<FavoritesSet> {
        self.lock().records.get(identity).cloned()
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.lock().write_count
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn current_identity(&self) -> Result<Option<Identity>, StoreError> {
        Ok(self.lock().current.clone())
    }

    async fn read_favorites(
        &self,
        identity: &IdentityId,
    ) -> Result<Option<FavoritesSet>, StoreError> {
        Ok(self.lock().records.get(identity).cloned())
    }

    async fn write_favorites(
        &self,
        identity: &IdentityId,
        favorites: &FavoritesSet,
    ) -> Result<(), StoreError> {
        let delay = self.lock().write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        if state.fail_writes {
            return Err(StoreError::Unavailable("simulated write failure".to_string()));
        }
        state.records.insert(identity.clone(), favorites.clone());
        state.write_count += 1;
        debug!(
            "Stored {} favorites for {}",
            favorites.len(),
            identity
        );
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<IdentityEvent> {
        self.events.subscribe()
    }
}
