//! Output-frame selection.

use super::frame::Frame;
use crate::core::types::Vec3;

/// Index of the resolved frame whose center is nearest to `reference`.
///
/// An exact tie goes to the later frame. Returns `None` when no frame
/// is resolved; the caller holds its previous output transform.
pub fn select_nearest(frames: &[Frame], reference: Vec3) -> Option<usize> {
    let mut nearest: Option<(usize, f32)> = None;
    for (i, frame) in frames.iter().enumerate() {
        if !frame.is_resolved() {
            continue;
        }
        let d = frame.center().position.distance(&reference);
        match nearest {
            Some((_, best)) if d > best => {}
            _ => nearest = Some((i, d)),
        }
    }
    nearest.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Pose3, Quat};

    fn resolved_at(x: f32) -> Frame {
        let mut frame = Frame::new("zone", 3);
        frame.apply_placement(
            Pose3::new(Vec3::new(x, 0.0, 0.0), Quat::identity()),
            Vec3::new(x, 0.0, 1.0),
            &[
                Vec3::new(x + 1.0, 0.0, 0.5),
                Vec3::new(x - 1.0, 0.0, 0.5),
                Vec3::new(x, 0.0, -1.0),
            ],
        );
        frame
    }

    #[test]
    fn test_picks_nearest_center() {
        let frames = vec![resolved_at(0.0), resolved_at(5.0), resolved_at(2.0)];
        // (0,0,0) and (2,0,0) are both 1.0 away from the reference; the
        // later frame wins the tie.
        let picked = select_nearest(&frames, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(picked, Some(2));

        let picked = select_nearest(&frames, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(picked, Some(1));
    }

    #[test]
    fn test_skips_unresolved() {
        let frames = vec![Frame::new("idle", 3), resolved_at(5.0)];
        let picked = select_nearest(&frames, Vec3::zero());
        assert_eq!(picked, Some(1));
    }

    #[test]
    fn test_none_when_nothing_resolved() {
        let frames = vec![Frame::new("a", 3), Frame::new("b", 3)];
        assert_eq!(select_nearest(&frames, Vec3::zero()), None);
    }

    #[test]
    fn test_tie_prefers_later_frame() {
        let frames = vec![resolved_at(-1.0), resolved_at(1.0)];
        assert_eq!(select_nearest(&frames, Vec3::zero()), Some(1));
    }
}
