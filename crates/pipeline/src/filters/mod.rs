//! Filter implementations for the listing pipeline.
//!
//! One filter per kind of constraint in `FilterCriteria`. `FilterPipeline`
//! only adds the filters whose constraint is active.

pub mod attribute_set;
pub mod category;
pub mod make;
pub mod range;
pub mod text_query;

// Re-export for convenience
pub use attribute_set::{FuelTypeFilter, TransmissionFilter};
pub use category::CategoryFilter;
pub use make::MakeFilter;
pub use range::{PriceRangeFilter, YearRangeFilter};
pub use text_query::TextQueryFilter;
