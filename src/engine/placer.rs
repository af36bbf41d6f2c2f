//! Frame placement.
//!
//! Placement pins a frame to a freshly observed pose (from marker
//! tracking or an equivalent outer source), scatters its anchors around
//! the new center, and pushes delete+save requests for every slot
//! through the persistence collaborator.

use log::info;
use rand::Rng;

use super::frame::Frame;
use crate::config::HubConfig;
use crate::core::types::{Pose3, Vec3};
use crate::store::AnchorStore;

/// Places a frame's anchors around a newly observed pose.
#[derive(Debug, Clone, Copy)]
pub struct FramePlacer {
    /// Half-width of the scatter square in meters.
    pub spread: f32,
}

impl FramePlacer {
    /// Create a placer from the engine configuration.
    pub fn new(config: &HubConfig) -> Self {
        Self {
            spread: config.anchor_spread,
        }
    }

    /// Place `frame` at `observed`.
    ///
    /// The front reference lands at the observed forward direction's
    /// horizontal components (height zeroed, not renormalized) ahead of
    /// the center, and the center re-orients to face it, discarding
    /// pitch and roll. Each anchor slot gets a fresh uniform position in
    /// the scatter square at the center's height; the old persisted pose
    /// is deleted and the new one saved. The frame resolves immediately
    /// without waiting for save confirmations.
    pub fn place(
        &self,
        frame: &mut Frame,
        observed: Pose3,
        store: &mut dyn AnchorStore,
        rng: &mut impl Rng,
    ) {
        let mut center = observed;
        let forward = observed.forward();
        let front = center.position + Vec3::new(forward.x, 0.0, forward.z);
        center.look_at(front);

        let positions: Vec<Vec3> = (0..frame.group().len())
            .map(|_| {
                let dx = (rng.random::<f32>() - 0.5) * self.spread * 2.0;
                let dz = (rng.random::<f32>() - 0.5) * self.spread * 2.0;
                center.position + Vec3::new(dx, 0.0, dz)
            })
            .collect();

        frame.apply_placement(center, front, &positions);
        for slot in frame.group().slots() {
            store.delete(&slot.id);
            store.request_save(&slot.id, slot.position);
        }
        info!(
            "frame '{}' placed at ({:.2}, {:.2}, {:.2}), {} anchors scattered",
            frame.name(),
            center.position.x,
            center.position.y,
            center.position.z,
            frame.group().len()
        );
    }
}
