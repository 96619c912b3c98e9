//! Estimate analysis.
//!
//! Parsing of raw estimates and aggregation of issue batches into totals.

pub mod aggregator;
pub mod estimate;

pub use aggregator::{aggregate_with, AggregateOptions};
pub use estimate::{format_dhm, format_hm, parse_estimate};
