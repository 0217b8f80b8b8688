//! Ray-casting point-in-ring test.

use geo::{Coord, LineString};

/// Crossing-number test against a single ring.
///
/// Casts a horizontal ray from `point` toward +∞ longitude and counts edge
/// crossings; an odd count means inside. Edges are taken cyclically, so the
/// ring does not need to be closed. Points lying exactly on an edge may land
/// on either side.
pub fn point_in_ring(point: Coord<f64>, ring: &LineString<f64>) -> bool {
    let coords = &ring.0;
    let n = coords.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = coords[i];
        let b = coords[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}
