//! Combines per-tract statistics into per-unit aggregates.

mod pipeline;
mod quality;
mod weighted;

pub use pipeline::{aggregate, aggregate_with, AggregationPipeline};
pub use quality::quality_score;
pub use weighted::{WeightedAggregate, WeightedAggregator};
