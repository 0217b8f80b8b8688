//! Grid-sampling estimate of how much of a tract lies inside a target polygon.
//!
//! A regular `N×N` grid ((N+1)² points) is laid over the tract's bounding box.
//! Points inside the tract are counted as samples, and samples that also fall
//! inside the target count as matches; the ratio is `matched / sampled`. This is
//! O(N²) per pair and deterministic. Exact clipping (e.g. Sutherland–Hodgman)
//! would give the true area fraction at higher cost.

use geo::{Coord, Polygon};

use super::ring::point_in_ring;
use crate::models::geometry::ring_bbox;

pub const DEFAULT_GRID_RESOLUTION: usize = 20;

#[derive(Debug, Clone, Copy)]
pub struct OverlapEstimator {
    resolution: usize,
}

impl Default for OverlapEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_RESOLUTION)
    }
}

impl OverlapEstimator {
    /// `resolution` is the number of grid cells per axis; 0 is treated as 1.
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution: resolution.max(1),
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Fraction of `tract`'s outer ring inside `unit`'s outer ring, in [0, 1].
    ///
    /// Returns 0 when no grid point lands inside the tract (zero-area tract).
    pub fn estimate(&self, tract: &Polygon<f64>, unit: &Polygon<f64>) -> f64 {
        let Some(bbox) = ring_bbox(tract) else {
            return 0.0;
        };

        let n = self.resolution;
        let step_x = bbox.width() / n as f64;
        let step_y = bbox.height() / n as f64;

        let mut sampled = 0usize;
        let mut matched = 0usize;

        for i in 0..=n {
            let x = bbox.min_lon + i as f64 * step_x;
            for j in 0..=n {
                let point = Coord {
                    x,
                    y: bbox.min_lat + j as f64 * step_y,
                };
                if point_in_ring(point, tract.exterior()) {
                    sampled += 1;
                    if point_in_ring(point, unit.exterior()) {
                        matched += 1;
                    }
                }
            }
        }

        if sampled == 0 {
            return 0.0;
        }
        matched as f64 / sampled as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::geometry::polygon_from_ring;

    fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
        polygon_from_ring(&[
            (min_x, min_y),
            (max_x, min_y),
            (max_x, max_y),
            (min_x, max_y),
        ])
    }

    #[test]
    fn test_enclosed_tract_is_full_overlap() {
        let tract = rect(1.0, 1.0, 2.0, 2.0);
        let unit = rect(0.0, 0.0, 5.0, 5.0);
        let ratio = OverlapEstimator::default().estimate(&tract, &unit);
        assert!((ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unit_hole_does_not_reduce_overlap() {
        let exterior = rect(0.0, 0.0, 10.0, 10.0).exterior().clone();
        let hole = rect(3.0, 3.0, 7.0, 7.0).exterior().clone();
        let unit = Polygon::new(exterior, vec![hole]);
        let tract = rect(4.0, 4.0, 6.0, 6.0);
        let ratio = OverlapEstimator::default().estimate(&tract, &unit);
        assert!((ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_tract_is_zero() {
        let unit = rect(0.0, 0.0, 5.0, 5.0);
        let estimator = OverlapEstimator::default();
        assert_eq!(estimator.estimate(&polygon_from_ring(&[]), &unit), 0.0);
    }

    #[test]
    fn test_disjoint_tract_is_zero() {
        let tract = rect(10.0, 10.0, 11.0, 11.0);
        let unit = rect(0.0, 0.0, 5.0, 5.0);
        assert_eq!(OverlapEstimator::default().estimate(&tract, &unit), 0.0);
    }

    #[test]
    fn test_half_covered_tract() {
        let tract = rect(0.0, 0.0, 2.0, 1.0);
        let unit = rect(1.0, -1.0, 3.0, 2.0);
        let ratio = OverlapEstimator::new(40).estimate(&tract, &unit);
        assert!((ratio - 0.5).abs() < 0.1, "ratio was {ratio}");
    }

    #[test]
    fn test_degenerate_tract_is_zero() {
        let tract = polygon_from_ring(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let unit = rect(-5.0, -5.0, 5.0, 5.0);
        assert_eq!(OverlapEstimator::default().estimate(&tract, &unit), 0.0);
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let tract = polygon_from_ring(&[(0.0, 0.0), (3.0, 0.5), (2.0, 3.0), (-0.5, 2.0)]);
        let unit = rect(1.0, 0.0, 4.0, 4.0);
        let est = OverlapEstimator::new(25);
        assert_eq!(est.estimate(&tract, &unit), est.estimate(&tract, &unit));
    }

    #[test]
    fn test_zero_resolution_is_clamped() {
        assert_eq!(OverlapEstimator::new(0).resolution(), 1);
    }
}
