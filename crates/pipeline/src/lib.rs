//! Pipeline for filtering car listings.
//!
//! This crate provides:
//! - `FilterCriteria`, the user's constraints, and `active_filter_count`
//! - Filter trait and implementations, one per kind of constraint
//! - FilterPipeline for composing filters, and `apply_filter`
//!
//! ## Guarantees
//! Filtering is a pure function of the listings and the criteria. The output
//! is always an order-preserving subsequence of the input, and unconstrained
//! criteria return the input unchanged.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{apply_filter, FilterCriteria};
//!
//! let criteria = FilterCriteria::new()
//!     .with_query("camry")
//!     .with_price(None, Some(30000.0));
//!
//! let matching = apply_filter(index.listings(), &criteria);
//! ```

pub mod traits;
pub mod criteria;
pub mod filters;
pub mod filter_pipeline;

// Re-export main types
pub use traits::Filter;
pub use criteria::{active_filter_count, Bounds, FilterCriteria, ALL_CATEGORIES};
pub use filter_pipeline::{apply_filter, FilterPipeline};
