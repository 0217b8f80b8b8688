//! Runs matching, weighting and scoring across every target unit.

use rayon::prelude::*;
use tracing::info;

use super::quality::quality_score;
use super::weighted::WeightedAggregator;
use crate::config::AggregationConfig;
use crate::error::{Result, UnitKind};
use crate::models::geometry::validate_polygon;
use crate::models::{AggregatedUnit, SourceUnit, TargetUnit};
use crate::pip::{MatchStats, TractIndex, TractUnitMatcher};

/// Aggregate tract statistics into `targets` with the default configuration.
///
/// Output has one entry per target, in input order. Any structurally invalid
/// ring aborts the whole call; an empty ring does not, it just covers nothing.
pub fn aggregate(sources: &[SourceUnit], targets: &[TargetUnit]) -> Result<Vec<AggregatedUnit>> {
    AggregationPipeline::new(AggregationConfig::default())?.run(sources, targets)
}

/// Same as [`aggregate`] with explicit tunables
pub fn aggregate_with(
    config: &AggregationConfig,
    sources: &[SourceUnit],
    targets: &[TargetUnit],
) -> Result<Vec<AggregatedUnit>> {
    AggregationPipeline::new(config.clone())?.run(sources, targets)
}

pub struct AggregationPipeline {
    config: AggregationConfig,
    matcher: TractUnitMatcher,
    aggregator: WeightedAggregator,
}

impl AggregationPipeline {
    pub fn new(config: AggregationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            matcher: TractUnitMatcher::from_config(&config),
            aggregator: WeightedAggregator,
            config,
        })
    }

    pub fn run(
        &self,
        sources: &[SourceUnit],
        targets: &[TargetUnit],
    ) -> Result<Vec<AggregatedUnit>> {
        info!(
            "Aggregating {} tracts into {} units (grid {}, threshold {}, parallel {})",
            sources.len(),
            targets.len(),
            self.config.grid_resolution,
            self.config.significance_threshold,
            self.config.parallel
        );

        // Validate every geometry before any unit is computed
        for target in targets {
            validate_polygon(&target.geometry, UnitKind::Target, &target.id)?;
        }
        let index = TractIndex::build(sources)?;

        let results: Vec<(AggregatedUnit, MatchStats)> = if self.config.parallel {
            targets
                .par_iter()
                .map(|unit| self.aggregate_unit(unit, sources, &index))
                .collect()
        } else {
            targets
                .iter()
                .map(|unit| self.aggregate_unit(unit, sources, &index))
                .collect()
        };

        let mut totals = MatchStats::default();
        let units: Vec<AggregatedUnit> = results
            .into_iter()
            .map(|(unit, stats)| {
                totals += stats;
                unit
            })
            .collect();

        info!(
            "Aggregated {} units: {} fast-path pairs, {} sampled pairs, {} dropped",
            units.len(),
            totals.fast_path,
            totals.sampled,
            totals.dropped
        );

        Ok(units)
    }

    fn aggregate_unit(
        &self,
        unit: &TargetUnit,
        sources: &[SourceUnit],
        index: &TractIndex,
    ) -> (AggregatedUnit, MatchStats) {
        let outcome = self.matcher.match_unit(unit, sources, index);
        let weighted = self.aggregator.aggregate(&outcome.pairs, sources);

        let tract_ids = outcome
            .pairs
            .iter()
            .filter_map(|p| sources.get(p.tract).map(|t| t.id.clone()))
            .collect();

        let aggregated = AggregatedUnit {
            id: unit.id.clone(),
            name: unit.name.clone(),
            population: weighted.population,
            density: weighted.density,
            metrics: weighted.metrics,
            quality_score: quality_score(&outcome.pairs),
            tract_ids,
        };

        (aggregated, outcome.stats)
    }
}
