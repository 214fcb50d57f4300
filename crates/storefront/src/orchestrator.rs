//! # Storefront Orchestrator
//!
//! This module coordinates the marketplace state:
//! 1. Fetch the catalog from the listing source
//! 2. Filter it against the current criteria (off the async runtime)
//! 3. Route favorites operations through the ledger
//! 4. Publish a fresh `StorefrontSnapshot` after every change
//!
//! ## Filtering
//! Criteria can change faster than filtering completes. Each `set_criteria`
//! call takes a new generation number, and a result is only published if its
//! generation is still the latest when it finishes. The check and the publish
//! happen under the snapshot channel's lock, so an older result can never
//! overwrite a newer one.
//!
//! ## Failures
//! Every failure keeps the last good state and sets `error` on the snapshot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use catalog::{CarListing, CatalogFacets, ListingId, ListingIndex, ListingSource};
use favorites::{FavoritesLedger, Identity, IdentityEvent, ToggleOutcome};
use pipeline::{active_filter_count, apply_filter, FilterCriteria};

use crate::error::{Result, StorefrontError};
use crate::snapshot::{LoadState, StorefrontSnapshot};

/// Latest requested criteria and the generation that requested them
#[derive(Debug, Default)]
struct FilterRequest {
    generation: u64,
    criteria: FilterCriteria,
}

/// Main orchestrator for browsing and favoriting
pub struct Storefront {
    source: Arc<dyn ListingSource>,
    ledger: Arc<FavoritesLedger>,
    catalog: RwLock<Arc<ListingIndex>>,
    request: Mutex<FilterRequest>,
    snapshot: watch::Sender<StorefrontSnapshot>,
}

impl Storefront {
    /// Create a storefront with an empty catalog in the `Idle` state.
    ///
    /// Nothing is fetched until `load_catalog` is called.
    pub fn new(source: Arc<dyn ListingSource>, ledger: Arc<FavoritesLedger>) -> Self {
        let (snapshot, _) = watch::channel(StorefrontSnapshot::default());
        Self {
            source,
            ledger,
            catalog: RwLock::new(Arc::new(ListingIndex::new())),
            request: Mutex::new(FilterRequest::default()),
            snapshot,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<StorefrontSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> StorefrontSnapshot {
        self.snapshot.borrow().clone()
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the full catalog and re-apply the current criteria.
    ///
    /// On failure the previous catalog stays in place and the load state
    /// becomes `Failed`.
    pub async fn load_catalog(&self) -> Result<()> {
        let start_time = Instant::now();
        info!("Loading catalog from {} source", self.source.name());
        self.snapshot.send_modify(|s| {
            s.load = LoadState::Loading;
            s.error = None;
        });

        let fetched = self
            .source
            .fetch_all_listings()
            .await
            .and_then(ListingIndex::from_listings);
        let index = match fetched {
            Ok(index) => Arc::new(index),
            Err(e) => return Err(self.fail_load(StorefrontError::FetchFailure(e))),
        };

        // Swap the catalog before taking a generation so any later request
        // filters the new listings
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = index.clone();
        let (generation, criteria) = {
            let mut request = self.request_lock();
            request.generation += 1;
            (request.generation, request.criteria.clone())
        };

        let total = index.len();
        let listings = match filter_off_runtime(index, criteria.clone()).await {
            Ok(listings) => listings,
            Err(e) => return Err(self.fail_load(e)),
        };
        let published = self.publish_if_current(generation, |s| {
            s.load = LoadState::Ready;
            s.total = total;
            s.active_filter_count = active_filter_count(&criteria);
            s.criteria = criteria;
            s.listings = listings;
        });
        if !published {
            // A newer filter request owns the listings; only the load state is ours
            self.snapshot.send_modify(|s| {
                s.load = LoadState::Ready;
                s.total = total;
            });
        }

        info!(
            "Catalog loaded: {} listings in {:.2?}",
            total,
            start_time.elapsed()
        );
        Ok(())
    }

    /// Replace the criteria and publish the matching listings.
    ///
    /// Returns false when a newer call superseded this one before its result
    /// was ready; the newer call publishes instead.
    pub async fn set_criteria(&self, criteria: FilterCriteria) -> Result<bool> {
        let generation = {
            let mut request = self.request_lock();
            request.generation += 1;
            request.criteria = criteria.clone();
            request.generation
        };
        let index = self.catalog();

        let count = active_filter_count(&criteria);
        let listings = filter_off_runtime(index, criteria.clone()).await?;
        let matched = listings.len();

        let published = self.publish_if_current(generation, |s| {
            s.listings = listings;
            s.criteria = criteria;
            s.active_filter_count = count;
        });
        if published {
            debug!(
                "Criteria generation {} published: {} matches, {} active filters",
                generation, matched, count
            );
        } else {
            debug!("Criteria generation {} superseded, result dropped", generation);
        }
        Ok(published)
    }

    /// Reset every constraint
    pub async fn clear_criteria(&self) -> Result<bool> {
        self.set_criteria(FilterCriteria::default()).await
    }

    /// Fetch one listing and make it the selection.
    pub async fn select_listing(&self, id: &ListingId) -> Result<CarListing> {
        match self.source.fetch_listing_by_id(id).await {
            Ok(listing) => {
                let selected = listing.clone();
                self.snapshot.send_modify(|s| s.selected = Some(selected));
                Ok(listing)
            }
            Err(e) => {
                let err = StorefrontError::from(e);
                self.record_error(&err);
                Err(err)
            }
        }
    }

    pub fn clear_selection(&self) {
        self.snapshot.send_modify(|s| s.selected = None);
    }

    /// Filter options present in the loaded catalog
    pub fn facets(&self) -> CatalogFacets {
        self.catalog().facets()
    }

    /// Look up a listing in the loaded catalog without a fetch
    pub fn listing(&self, id: &ListingId) -> Option<CarListing> {
        self.catalog().get(id).cloned()
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    pub fn is_favorite(&self, id: &ListingId) -> bool {
        self.ledger.is_favorite(id)
    }

    pub async fn toggle_favorite(&self, id: &ListingId) -> Result<ToggleOutcome> {
        let result = self.ledger.toggle_favorite(id).await;
        self.refresh_identity();
        match result {
            Ok(outcome) => {
                info!("Favorite {:?}: {}", outcome, id);
                Ok(outcome)
            }
            Err(e) => {
                let err = StorefrontError::from(e);
                self.record_error(&err);
                Err(err)
            }
        }
    }

    /// Favorite listings in the order they were added.
    ///
    /// Ids missing from the loaded catalog are skipped. `query` narrows the
    /// result with the same text search the catalog uses.
    pub fn favorite_listings(&self, query: Option<&str>) -> Vec<CarListing> {
        let Some(favorites) = self.ledger.favorites() else {
            return Vec::new();
        };
        let index = self.catalog();
        let resolved: Vec<CarListing> = favorites
            .iter()
            .filter_map(|id| index.get(id).cloned())
            .collect();

        match query {
            Some(query) => apply_filter(&resolved, &FilterCriteria::new().with_query(query)),
            None => resolved,
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub async fn sign_in(&self, identity: Identity) -> Result<()> {
        let result = self.ledger.sign_in(identity).await;
        self.finish_session_change(result)
    }

    pub fn sign_out(&self) {
        self.ledger.sign_out();
        self.refresh_identity();
    }

    /// Returns whether the store had a session to restore
    pub async fn restore_session(&self) -> Result<bool> {
        let result = self.ledger.restore_session().await;
        self.finish_session_change(result)
    }

    /// Apply an identity provider notification
    pub async fn handle_identity_event(&self, event: IdentityEvent) -> Result<()> {
        let result = self.ledger.handle_identity_event(event).await;
        self.finish_session_change(result)
    }

    pub fn clear_error(&self) {
        self.snapshot.send_modify(|s| s.error = None);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn catalog(&self) -> Arc<ListingIndex> {
        self.catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn request_lock(&self) -> MutexGuard<'_, FilterRequest> {
        self.request.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish `update` only if `generation` is still the latest request.
    fn publish_if_current(
        &self,
        generation: u64,
        update: impl FnOnce(&mut StorefrontSnapshot),
    ) -> bool {
        self.snapshot.send_if_modified(|s| {
            if self.request_lock().generation != generation {
                return false;
            }
            update(s);
            true
        })
    }

    fn refresh_identity(&self) {
        let identity = self.ledger.current_identity();
        let favorite_count = self.ledger.favorites().map_or(0, |f| f.len());
        self.snapshot.send_modify(|s| {
            s.identity = identity;
            s.favorite_count = favorite_count;
        });
    }

    fn finish_session_change<T>(&self, result: favorites::Result<T>) -> Result<T> {
        self.refresh_identity();
        result.map_err(|e| {
            let err = StorefrontError::from(e);
            self.record_error(&err);
            err
        })
    }

    /// Mark the load as failed, keeping whatever catalog was shown before.
    fn fail_load(&self, err: StorefrontError) -> StorefrontError {
        warn!("Catalog load failed: {}", err);
        let message = err.to_string();
        self.snapshot.send_modify(|s| {
            s.load = LoadState::Failed;
            s.error = Some(message);
        });
        err
    }

    fn record_error(&self, err: &StorefrontError) {
        warn!("{}", err);
        let message = err.to_string();
        self.snapshot.send_modify(|s| s.error = Some(message));
    }
}

/// Run the filter on the blocking pool so large catalogs don't stall the
/// runtime.
async fn filter_off_runtime(
    index: Arc<ListingIndex>,
    criteria: FilterCriteria,
) -> Result<Vec<CarListing>> {
    let listings =
        tokio::task::spawn_blocking(move || apply_filter(index.listings(), &criteria)).await?;
    Ok(listings)
}
