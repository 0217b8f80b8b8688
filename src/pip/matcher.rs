//! Decides which tracts contribute to a target unit and at what ratio.

use std::ops::AddAssign;

use tracing::debug;

use super::index::TractIndex;
use super::overlap::OverlapEstimator;
use super::ring::point_in_ring;
use crate::config::AggregationConfig;
use crate::models::geometry::ring_bbox;
use crate::models::{OverlapPair, SourceUnit, TargetUnit};

pub const DEFAULT_SIGNIFICANCE_THRESHOLD: f64 = 0.1;

/// Counters describing how pairs were resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    /// Centroid inside the unit, ratio taken as 1.0
    pub fast_path: usize,
    /// Ratio estimated by grid sampling and kept
    pub sampled: usize,
    /// Ratio estimated and at or below the threshold
    pub dropped: usize,
}

impl AddAssign for MatchStats {
    fn add_assign(&mut self, other: Self) {
        self.fast_path += other.fast_path;
        self.sampled += other.sampled;
        self.dropped += other.dropped;
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Kept pairs in source order
    pub pairs: Vec<OverlapPair>,
    pub stats: MatchStats,
}

#[derive(Debug, Clone, Copy)]
pub struct TractUnitMatcher {
    estimator: OverlapEstimator,
    threshold: f64,
    use_spatial_index: bool,
}

impl Default for TractUnitMatcher {
    fn default() -> Self {
        Self::from_config(&AggregationConfig::default())
    }
}

impl TractUnitMatcher {
    pub fn from_config(config: &AggregationConfig) -> Self {
        Self {
            estimator: OverlapEstimator::new(config.grid_resolution),
            threshold: config.significance_threshold,
            use_spatial_index: config.use_spatial_index,
        }
    }

    /// Find contributing tracts for one unit.
    ///
    /// A tract whose centroid lies inside the unit is taken whole without
    /// sampling. Otherwise the overlap is estimated and pairs with a ratio at
    /// or below the threshold are dropped. Only outer rings are consulted, and
    /// an empty unit or tract never yields a pair.
    pub fn match_unit(
        &self,
        unit: &TargetUnit,
        tracts: &[SourceUnit],
        index: &TractIndex,
    ) -> MatchOutcome {
        let mut outcome = MatchOutcome::default();

        let Some(unit_bbox) = ring_bbox(&unit.geometry) else {
            return outcome;
        };

        let candidates: Vec<usize> = if self.use_spatial_index {
            index.candidates(&unit_bbox)
        } else {
            (0..tracts.len()).collect()
        };

        for position in candidates {
            let (Some(tract), Some(geom)) = (tracts.get(position), index.get(position)) else {
                continue;
            };
            // Empty tracts cover nothing
            if geom.bbox.is_none() {
                continue;
            }

            let centroid_inside = geom
                .centroid
                .is_some_and(|c| point_in_ring(c, unit.geometry.exterior()));

            if centroid_inside {
                outcome.stats.fast_path += 1;
                outcome.pairs.push(OverlapPair {
                    tract: position,
                    ratio: 1.0,
                });
                continue;
            }

            let ratio = self
                .estimator
                .estimate(&tract.geometry, &unit.geometry)
                .clamp(0.0, 1.0);

            if ratio > self.threshold {
                outcome.stats.sampled += 1;
                outcome.pairs.push(OverlapPair {
                    tract: position,
                    ratio,
                });
            } else {
                outcome.stats.dropped += 1;
            }
        }

        debug!(
            "Unit {}: {} contributors ({} fast path, {} sampled, {} dropped)",
            unit.id,
            outcome.pairs.len(),
            outcome.stats.fast_path,
            outcome.stats.sampled,
            outcome.stats.dropped
        );

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::geometry::polygon_from_ring;
    use geo::Polygon;

    fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
        polygon_from_ring(&[
            (min_x, min_y),
            (max_x, min_y),
            (max_x, max_y),
            (min_x, max_y),
        ])
    }

    fn whole(tract: usize) -> OverlapPair {
        OverlapPair { tract, ratio: 1.0 }
    }

    fn tract(id: &str, geometry: Polygon<f64>) -> SourceUnit {
        SourceUnit::new(id, 1000, 10.0, geometry)
    }

    #[test]
    fn test_centroid_fast_path() {
        let tracts = vec![tract("inside", rect(1.0, 1.0, 2.0, 2.0))];
        let unit = TargetUnit::new("u", "Unit", rect(0.0, 0.0, 5.0, 5.0));
        let index = TractIndex::build(&tracts).unwrap();

        let outcome = TractUnitMatcher::default().match_unit(&unit, &tracts, &index);
        assert_eq!(outcome.pairs, vec![whole(0)]);
        assert_eq!(outcome.stats.fast_path, 1);
        assert_eq!(outcome.stats.sampled, 0);
    }

    #[test]
    fn test_outside_tract_is_absent() {
        let tracts = vec![tract("outside", rect(10.0, 10.0, 11.0, 11.0))];
        let unit = TargetUnit::new("u", "Unit", rect(0.0, 0.0, 5.0, 5.0));
        let index = TractIndex::build(&tracts).unwrap();

        let matcher = TractUnitMatcher::from_config(&AggregationConfig {
            use_spatial_index: false,
            ..AggregationConfig::default()
        });
        let outcome = matcher.match_unit(&unit, &tracts, &index);
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.stats.dropped, 1);
    }

    #[test]
    fn test_straddling_tract_is_sampled() {
        // Centroid at x=1.5 lies outside the unit, roughly a third overlaps
        let tracts = vec![tract("edge", rect(0.0, 0.0, 3.0, 1.0))];
        let unit = TargetUnit::new("u", "Unit", rect(-5.0, -5.0, 1.0, 5.0));
        let index = TractIndex::build(&tracts).unwrap();

        let outcome = TractUnitMatcher::default().match_unit(&unit, &tracts, &index);
        assert_eq!(outcome.pairs.len(), 1);
        assert_eq!(outcome.stats.sampled, 1);
        let ratio = outcome.pairs[0].ratio;
        assert!(ratio > 0.25 && ratio < 0.45, "ratio was {ratio}");
    }

    #[test]
    fn test_sliver_below_threshold_is_dropped() {
        // Only a thin slice (about 5%) of the tract lies in the unit
        let tracts = vec![tract("sliver", rect(0.0, 0.0, 2.0, 1.0))];
        let unit = TargetUnit::new("u", "Unit", rect(1.9, -1.0, 5.0, 2.0));
        let index = TractIndex::build(&tracts).unwrap();

        let outcome = TractUnitMatcher::default().match_unit(&unit, &tracts, &index);
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.stats.dropped, 1);
    }

    #[test]
    fn test_unit_holes_are_ignored() {
        // Tract sits entirely inside a hole of the unit
        let tracts = vec![tract("in-hole", rect(4.0, 4.0, 6.0, 6.0))];
        let exterior = rect(0.0, 0.0, 10.0, 10.0).exterior().clone();
        let hole = rect(3.0, 3.0, 7.0, 7.0).exterior().clone();
        let unit = TargetUnit::new("u", "Unit", Polygon::new(exterior, vec![hole]));
        let index = TractIndex::build(&tracts).unwrap();

        for use_spatial_index in [true, false] {
            let matcher = TractUnitMatcher::from_config(&AggregationConfig {
                use_spatial_index,
                ..AggregationConfig::default()
            });
            let outcome = matcher.match_unit(&unit, &tracts, &index);
            assert_eq!(outcome.pairs, vec![whole(0)]);
        }
    }

    #[test]
    fn test_empty_geometries_yield_no_pairs() {
        let tracts = vec![
            tract("a", rect(0.0, 0.0, 1.0, 1.0)),
            tract("empty", polygon_from_ring(&[])),
        ];
        let index = TractIndex::build(&tracts).unwrap();
        let brute = TractUnitMatcher::from_config(&AggregationConfig {
            use_spatial_index: false,
            ..AggregationConfig::default()
        });

        let unit = TargetUnit::new("u", "Unit", rect(-1.0, -1.0, 2.0, 2.0));
        let outcome = brute.match_unit(&unit, &tracts, &index);
        assert_eq!(outcome.pairs, vec![whole(0)]);
        assert_eq!(outcome.stats.dropped, 0);

        let empty_unit = TargetUnit::new("e", "Empty", polygon_from_ring(&[]));
        let outcome = brute.match_unit(&empty_unit, &tracts, &index);
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.stats, MatchStats::default());
    }

    #[test]
    fn test_spatial_index_does_not_change_pairs() {
        let tracts = vec![
            tract("a", rect(0.0, 0.0, 1.0, 1.0)),
            tract("b", rect(1.0, 0.0, 2.0, 1.0)),
            tract("c", rect(2.0, 0.0, 3.0, 1.0)),
            tract("d", rect(8.0, 8.0, 9.0, 9.0)),
        ];
        let unit = TargetUnit::new("u", "Unit", rect(0.5, -1.0, 2.2, 2.0));
        let index = TractIndex::build(&tracts).unwrap();

        let indexed = TractUnitMatcher::default().match_unit(&unit, &tracts, &index);
        let brute = TractUnitMatcher::from_config(&AggregationConfig {
            use_spatial_index: false,
            ..AggregationConfig::default()
        })
        .match_unit(&unit, &tracts, &index);

        assert_eq!(indexed.pairs, brute.pairs);
    }
}
