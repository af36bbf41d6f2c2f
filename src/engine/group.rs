//! Per-frame anchor slot bookkeeping.
//!
//! An [`AnchorGroup`] owns a fixed set of anchor slots for one frame and
//! tracks each slot's load/activation state across the asynchronous
//! restore cycle. Slot identities are stable for the frame's lifetime;
//! only the restore cycle and the host's tracking updates mutate them.

use log::debug;

use crate::core::types::Vec3;
use crate::store::{AnchorId, AnchorStore};

/// One anchor slot: identity, live position, and restore state.
#[derive(Debug, Clone)]
pub struct AnchorSlot {
    /// Stable identity with the persistence collaborator.
    pub id: AnchorId,
    /// Live world position.
    pub position: Vec3,
    /// Load attempt completed this session (success or failure).
    pub loaded: bool,
    /// Successfully restored this session.
    pub active: bool,
}

/// Fixed-size set of anchor slots for one frame.
#[derive(Debug, Clone)]
pub struct AnchorGroup {
    slots: Vec<AnchorSlot>,
    listening: bool,
}

impl AnchorGroup {
    /// Create a group of `count` slots for the named frame.
    pub fn new(frame: &str, count: usize) -> Self {
        let slots = (0..count)
            .map(|slot| AnchorSlot {
                id: AnchorId::new(frame, slot),
                position: Vec3::zero(),
                loaded: false,
                active: false,
            })
            .collect();
        Self {
            slots,
            listening: false,
        }
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the group has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot view.
    #[inline]
    pub fn slots(&self) -> &[AnchorSlot] {
        &self.slots
    }

    /// Whether the group is still consuming load-completion events.
    #[inline]
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Begin a restore cycle: reset every slot and issue one load request
    /// per slot.
    pub fn begin_load(&mut self, store: &mut dyn AnchorStore) {
        self.listening = true;
        for slot in &mut self.slots {
            slot.loaded = false;
            slot.active = false;
        }
        for slot in &self.slots {
            store.request_load(&slot.id);
        }
    }

    /// Handle a load-completion event for `slot`.
    ///
    /// Returns `true` when the event changed state. Duplicate deliveries
    /// for an already-reported slot, out-of-range indices, and events
    /// arriving after the group stopped listening are all no-ops.
    pub fn on_loaded(&mut self, slot: usize, success: bool, position: Vec3) -> bool {
        if !self.listening {
            return false;
        }
        let Some(entry) = self.slots.get_mut(slot) else {
            return false;
        };
        if entry.loaded {
            return false;
        }
        entry.loaded = true;
        entry.active = success;
        if success {
            entry.position = position;
        }
        if self.all_loaded() {
            // Every slot has reported; stop consuming events.
            self.listening = false;
            debug!(
                "anchor group fully reported: {}/{} active",
                self.active_count(),
                self.len()
            );
        }
        true
    }

    /// Number of slots that restored successfully.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    /// Indices of active slots.
    pub fn active_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, _)| i)
            .collect()
    }

    /// True once every slot has completed its load attempt.
    pub fn all_loaded(&self) -> bool {
        self.slots.iter().all(|s| s.loaded)
    }

    /// Strict activation-threshold test: `active > count * ratio`.
    pub fn activation_met(&self, ratio: f32) -> bool {
        self.active_count() as f32 > self.len() as f32 * ratio
    }

    /// Push a live position update from the host's tracking layer.
    ///
    /// Does not touch load/activation state.
    pub fn update_position(&mut self, slot: usize, position: Vec3) {
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.position = position;
        }
    }

    /// Install freshly placed anchor positions.
    ///
    /// Used by placement: every slot becomes live and active at its new
    /// position, and any restore cycle in progress is abandoned.
    pub fn place_all(&mut self, positions: &[Vec3]) {
        debug_assert_eq!(positions.len(), self.slots.len());
        for (slot, position) in self.slots.iter_mut().zip(positions) {
            slot.position = *position;
            slot.loaded = true;
            slot.active = true;
        }
        self.listening = false;
    }

    /// Live position of `slot`, if in range.
    pub fn position(&self, slot: usize) -> Option<Vec3> {
        self.slots.get(slot).map(|s| s.position)
    }
}
