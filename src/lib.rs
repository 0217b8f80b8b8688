//! Tractagg - spatial aggregation of census tract statistics.
//!
//! Estimates how much of each tract falls inside each coarser target boundary
//! (community area, ward) and combines tract statistics into population-weighted
//! aggregates for that boundary.

pub mod aggregation;
pub mod config;
pub mod error;
pub mod geojson;
pub mod models;
pub mod pip;

pub use aggregation::{aggregate, aggregate_with, AggregationPipeline};
pub use config::AggregationConfig;
pub use error::{AggregationError, Result};
pub use models::{AggregatedRecord, AggregatedUnit, MetricRecord, SourceUnit, TargetUnit};
