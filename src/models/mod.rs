//! Core data models for the aggregation engine.

pub mod geometry;
pub mod tract;
pub mod unit;

pub use geometry::BBox;
pub use tract::{MetricRecord, SourceUnit};
pub use unit::{AggregatedRecord, AggregatedUnit, OverlapPair, TargetUnit};
