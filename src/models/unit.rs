//! Target boundaries and their aggregated output.

use std::collections::BTreeMap;

use geo::Polygon;
use serde::Serialize;

/// Coarser boundary (community area, ward) receiving aggregated statistics
#[derive(Debug, Clone)]
pub struct TargetUnit {
    pub id: String,
    pub name: String,
    pub geometry: Polygon<f64>,
}

impl TargetUnit {
    pub fn new(id: impl Into<String>, name: impl Into<String>, geometry: Polygon<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            geometry,
        }
    }
}

/// A kept association between one tract and one target unit.
///
/// `tract` is the tract's position in the source slice handed to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapPair {
    pub tract: usize,
    /// Always within [0, 1]
    pub ratio: f64,
}

/// Metric record with derived count and rate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRecord {
    pub name: String,
    pub code: String,
    pub count: u64,
    pub rate: f64,
}

/// Output of the pipeline for one target unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedUnit {
    pub id: String,
    pub name: String,
    pub population: u64,
    pub density: f64,
    pub metrics: BTreeMap<String, AggregatedRecord>,
    /// Heuristic confidence, 0-100
    pub quality_score: u8,
    /// Constituent tracts in source order
    pub tract_ids: Vec<String>,
}
