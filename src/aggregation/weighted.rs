//! Overlap- and population-weighted combination of tract statistics.
//!
//! For a contributing tract with overlap ratio `r`, its weight is
//! `population × r`. Counts are absolute quantities and scale with `r` only;
//! rates are combined as a population-weighted mean. Density is likewise a
//! population-weighted mean rather than an area recombination.

use std::collections::BTreeMap;

use tracing::warn;

use crate::models::{AggregatedRecord, OverlapPair, SourceUnit};

/// Aggregated statistics for one unit, before scoring
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedAggregate {
    pub population: u64,
    pub density: f64,
    pub metrics: BTreeMap<String, AggregatedRecord>,
}

#[derive(Default)]
struct MetricAccumulator {
    name: String,
    code: String,
    count: f64,
    weighted_rate: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedAggregator;

impl WeightedAggregator {
    /// Combine the kept pairs for one unit.
    ///
    /// A metric missing from a contributing tract counts as zero. With no
    /// contributors, or only zero-population ones, every mean is 0.
    pub fn aggregate(&self, pairs: &[OverlapPair], tracts: &[SourceUnit]) -> WeightedAggregate {
        let mut total_weight = 0.0;
        let mut weighted_density = 0.0;
        let mut metrics: BTreeMap<&str, MetricAccumulator> = BTreeMap::new();

        for pair in pairs {
            let Some(tract) = tracts.get(pair.tract) else {
                continue;
            };
            let weight = tract.population as f64 * pair.ratio;
            total_weight += weight;
            weighted_density += tract.density * weight;

            for (metric_id, record) in &tract.metrics {
                let acc = metrics
                    .entry(metric_id.as_str())
                    .or_insert_with(|| MetricAccumulator {
                        name: record.name.clone(),
                        code: record.code.clone(),
                        ..MetricAccumulator::default()
                    });
                if acc.name != record.name || acc.code != record.code {
                    warn!(
                        "Metric {} on tract {} is labelled {}/{}, keeping {}/{}",
                        metric_id, tract.id, record.name, record.code, acc.name, acc.code
                    );
                }
                acc.count += record.count * pair.ratio;
                acc.weighted_rate += record.rate * weight;
            }
        }

        let mean = |numerator: f64| {
            if total_weight > 0.0 {
                numerator / total_weight
            } else {
                0.0
            }
        };

        let metrics = metrics
            .into_iter()
            .map(|(metric_id, acc)| {
                let record = AggregatedRecord {
                    name: acc.name,
                    code: acc.code,
                    count: acc.count.round().max(0.0) as u64,
                    rate: mean(acc.weighted_rate),
                };
                (metric_id.to_string(), record)
            })
            .collect();

        WeightedAggregate {
            population: total_weight.round().max(0.0) as u64,
            density: mean(weighted_density).round(),
            metrics,
        }
    }
}
