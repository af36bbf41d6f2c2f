//! Runtime state of one tracked region.
//!
//! A [`Frame`] owns a center pose, a front-reference point (used only to
//! derive the center's yaw), a root pose local to the center, and the
//! frame's [`AnchorGroup`]. Center and front are derived state,
//! recomputed wholesale on every successful reconstruction; the root
//! local pose is established at placement and re-read from the frame's
//! record thereafter. It is the state that survives anchor drift.

use log::{debug, info};
use rand::Rng;

use super::estimator::FrameEstimator;
use super::group::AnchorGroup;
use crate::core::types::{Pose3, Vec3};
use crate::io::record::FrameRecord;
use crate::store::AnchorStore;

/// One logical tracking region backed by a fixed set of anchors.
#[derive(Debug, Clone)]
pub struct Frame {
    name: String,
    center: Pose3,
    front: Vec3,
    root_local: Pose3,
    group: AnchorGroup,
    record: Option<FrameRecord>,
    resolved: bool,
    check: Option<(usize, Vec3)>,
}

impl Frame {
    /// Create an unresolved frame with `anchor_count` anchor slots.
    pub fn new(name: impl Into<String>, anchor_count: usize) -> Self {
        let name = name.into();
        let group = AnchorGroup::new(&name, anchor_count);
        Self {
            name,
            center: Pose3::identity(),
            front: Vec3::zero(),
            root_local: Pose3::identity(),
            group,
            record: None,
            resolved: false,
            check: None,
        }
    }

    /// Frame name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The anchor group.
    #[inline]
    pub fn group(&self) -> &AnchorGroup {
        &self.group
    }

    /// Reconstructed center pose.
    #[inline]
    pub fn center(&self) -> Pose3 {
        self.center
    }

    /// Front-reference point.
    #[inline]
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Root pose local to the center.
    #[inline]
    pub fn root_local(&self) -> Pose3 {
        self.root_local
    }

    /// Root pose in world coordinates.
    #[inline]
    pub fn root_world(&self) -> Pose3 {
        self.center.compose(&self.root_local)
    }

    /// Whether a triplet has passed validation this session.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// The frame's persisted record, if any.
    #[inline]
    pub fn record(&self) -> Option<&FrameRecord> {
        self.record.as_ref()
    }

    /// Begin a restore cycle against `record`.
    ///
    /// Clears the resolved state and issues a load request per slot;
    /// resolution happens as completion events arrive.
    pub fn begin_restore(&mut self, record: FrameRecord, store: &mut dyn AnchorStore) {
        self.resolved = false;
        self.check = None;
        self.record = Some(record);
        self.group.begin_load(store);
    }

    /// Route a load-completion event to the group and attempt the first
    /// reconstruction once the activation threshold is crossed.
    ///
    /// Returns `true` when this event resolved the frame.
    pub fn handle_load_event(
        &mut self,
        slot: usize,
        success: bool,
        position: Vec3,
        activation_ratio: f32,
        estimator: &FrameEstimator,
        rng: &mut impl Rng,
    ) -> bool {
        if !self.group.on_loaded(slot, success, position) {
            return false;
        }
        if self.resolved || !self.group.activation_met(activation_ratio) {
            return false;
        }
        let resolved = self.try_resolve(estimator, rng);
        if resolved {
            info!(
                "frame '{}' resolved with {}/{} anchors active",
                self.name,
                self.group.active_count(),
                self.group.len()
            );
        }
        resolved
    }

    /// Run the estimator and apply the fix on success.
    ///
    /// On failure the frame keeps its previous pose and resolved state:
    /// an initial resolve simply stays pending, and a drift-correction
    /// pass keeps serving the last good pose.
    pub fn try_resolve(&mut self, estimator: &FrameEstimator, rng: &mut impl Rng) -> bool {
        let Some(record) = self.record.as_ref() else {
            return false;
        };
        let result = estimator.estimate(&self.group, record, rng);
        let Some(fix) = result.fix else {
            debug!(
                "frame '{}': reconstruction failed after {} attempts",
                self.name, result.attempts
            );
            return false;
        };
        self.center.position = fix.center;
        self.front = fix.front;
        self.center.look_at(self.front);
        self.root_local = Pose3::new(record.root_position, record.root_rotation);
        self.check = Some((fix.check_slot, fix.check_position));
        self.resolved = true;
        true
    }

    /// Drift check: has the cached check anchor stayed within `epsilon`
    /// of its position at the last accepted reconstruction?
    pub fn drift_ok(&self, epsilon: f32) -> bool {
        match self.check {
            Some((slot, position)) => match self.group.position(slot) {
                Some(live) => live.distance(&position) < epsilon,
                None => true,
            },
            None => true,
        }
    }

    /// Push a live anchor position from the host's tracking layer.
    pub fn update_anchor(&mut self, slot: usize, position: Vec3) {
        self.group.update_position(slot, position);
    }

    /// Install placement results: new center/front references and the
    /// freshly scattered anchor positions.
    ///
    /// Any previously held record is invalidated; the frame is resolved
    /// optimistically without waiting for save confirmations.
    pub(crate) fn apply_placement(&mut self, center: Pose3, front: Vec3, anchors: &[Vec3]) {
        self.center = center;
        self.front = front;
        self.group.place_all(anchors);
        self.record = None;
        self.check = None;
        self.resolved = true;
    }

    /// Set the root from a world-space pose (stored local to the center).
    pub fn set_root_world(&mut self, pose: Pose3) {
        self.root_local = Pose3::new(
            self.center.inverse_transform_point(pose.position),
            self.center.rotation.inverse().mul(&pose.rotation),
        );
    }

    /// Capture the frame's persistent record from its current state:
    /// root local pose plus every anchor's center- and front-relative
    /// offset. The front reference carries no rotation, so its offsets
    /// are plain differences.
    pub fn capture_record(&self) -> FrameRecord {
        let mut record = FrameRecord::with_anchor_count(self.group.len());
        record.root_position = self.root_local.position;
        record.root_rotation = self.root_local.rotation;
        for (i, slot) in self.group.slots().iter().enumerate() {
            record.center_offsets[i] = self.center.inverse_transform_point(slot.position);
            record.front_offsets[i] = slot.position - self.front;
        }
        record
    }
}
