//! Geometric primitives for anchor-triplet reconstruction.
//!
//! The planar resection here recovers a reference point from three
//! anchors: each anchor's position was recorded in the reference's local
//! frame at capture time, and the anchors' live world positions are known.
//! The solve runs in the horizontal X/Z plane; the reference's height is
//! pinned to the first anchor's height.

use super::types::Vec3;

/// Pairwise distances of a point triplet, in (1-2, 2-3, 3-1) order.
#[inline]
pub fn pair_distances(points: &[Vec3; 3]) -> [f32; 3] {
    [
        points[0].distance(&points[1]),
        points[1].distance(&points[2]),
        points[2].distance(&points[0]),
    ]
}

/// Locate a reference point from three anchor offsets and live positions.
///
/// `recorded[i]` is anchor *i*'s position in the reference's local frame
/// at capture time; `live[i]` is the anchor's current world position.
/// Solves the 2-unknown linear system relating the recorded offsets to
/// the live displacement vectors and returns `live[0] + (a, 0, c)`.
///
/// Returns `None` when the solve is degenerate: a near-collinear triplet
/// (or one whose 1→2 displacement has no Z component) drives the
/// denominator to zero and the solution out of the finite range.
pub fn locate_reference(recorded: &[Vec3; 3], live: &[Vec3; 3]) -> Option<Vec3> {
    let x1 = -recorded[0];
    let x2 = recorded[1] - recorded[0];
    let x4 = recorded[2] - recorded[0];
    let x11 = live[1] - live[0];
    let x31 = live[2] - live[0];

    let a = (x11.z * x1.x * x4.x + x11.z * x1.z * x4.z
        - x31.z * x1.x * x2.x
        - x31.z * x1.z * x2.z)
        / (x11.z * x31.x - x31.z * x11.x);
    let c = (x1.x * x2.x + x1.z * x2.z - x11.x * a) / x11.z;

    if !a.is_finite() || !c.is_finite() {
        return None;
    }
    Some(live[0] + Vec3::new(a, 0.0, c))
}
