//! Point-in-polygon primitives and tract/unit matching.
//!
//! Tracts are matched to a target unit through a cheap centroid test first,
//! falling back to grid sampling only for tracts that straddle the boundary.

mod index;
mod matcher;
mod overlap;
mod ring;

pub use index::{TractGeometry, TractIndex};
pub use matcher::{MatchOutcome, MatchStats, TractUnitMatcher, DEFAULT_SIGNIFICANCE_THRESHOLD};
pub use overlap::{OverlapEstimator, DEFAULT_GRID_RESOLUTION};
pub use ring::point_in_ring;
