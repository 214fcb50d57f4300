//! Published view state.

use catalog::CarListing;
use favorites::Identity;
use pipeline::FilterCriteria;
use std::fmt;

/// Catalog load lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoadState::Idle => "idle",
            LoadState::Loading => "loading",
            LoadState::Ready => "ready",
            LoadState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Immutable view of everything a presentation layer renders.
///
/// A new snapshot is published after every state change; subscribers never
/// observe a half-applied update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorefrontSnapshot {
    pub load: LoadState,
    /// Listings matching `criteria`, in catalog order
    pub listings: Vec<CarListing>,
    /// Size of the whole loaded catalog
    pub total: usize,
    pub criteria: FilterCriteria,
    pub active_filter_count: usize,
    pub selected: Option<CarListing>,
    /// Message of the last failure, until cleared
    pub error: Option<String>,
    pub identity: Option<Identity>,
    pub favorite_count: usize,
}

impl StorefrontSnapshot {
    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }
}
