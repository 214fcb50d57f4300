//! Storefront crate for the car marketplace.
//!
//! This crate contains the orchestrator that composes the listing source,
//! the filter pipeline and the favorites ledger, and publishes the resulting
//! view state to a presentation layer.

pub mod error;
pub mod orchestrator;
pub mod snapshot;

pub use error::{Result, StorefrontError};
pub use orchestrator::Storefront;
pub use snapshot::{LoadState, StorefrontSnapshot};
