//! Census tract records carrying population and per-metric statistics.

use std::collections::BTreeMap;

use geo::Polygon;

/// A named statistic attached to a tract (e.g. one disease)
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub name: String,
    pub code: String,
    /// Absolute count within the tract
    pub count: f64,
    /// Population-normalized rate
    pub rate: f64,
}

impl MetricRecord {
    pub fn new(name: impl Into<String>, code: impl Into<String>, count: f64, rate: f64) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            count,
            rate,
        }
    }
}

/// Finest-grained source unit.
///
/// The centroid is not stored here; it is computed once per aggregation run
/// by [`crate::pip::TractIndex`].
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub id: String,
    pub population: u64,
    pub density: f64,
    /// metric id -> record
    pub metrics: BTreeMap<String, MetricRecord>,
    pub geometry: Polygon<f64>,
}

impl SourceUnit {
    pub fn new(
        id: impl Into<String>,
        population: u64,
        density: f64,
        geometry: Polygon<f64>,
    ) -> Self {
        Self {
            id: id.into(),
            population,
            density,
            metrics: BTreeMap::new(),
            geometry,
        }
    }

    /// Attach a metric record, replacing any previous one with the same id
    pub fn with_metric(mut self, metric_id: impl Into<String>, record: MetricRecord) -> Self {
        self.metrics.insert(metric_id.into(), record);
        self
    }
}
