//! In-memory anchor store for tests and demos.

use std::collections::{HashMap, HashSet};

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::{AnchorEvent, AnchorId, AnchorStore};
use crate::core::types::Vec3;

/// In-memory [`AnchorStore`].
///
/// Poses persist across engine instances for as long as the store lives,
/// which makes it the "next session" double in integration tests.
/// Completion events are produced immediately, but the consumer still
/// only observes them when it drains its channel, preserving the
/// asynchronous contract.
pub struct MemoryStore {
    persisted: HashMap<AnchorId, Vec3>,
    fail_loads: HashSet<AnchorId>,
    fail_saves: HashSet<AnchorId>,
    senders: Vec<Sender<AnchorEvent>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            persisted: HashMap::new(),
            fail_loads: HashSet::new(),
            fail_saves: HashSet::new(),
            senders: Vec::new(),
        }
    }

    /// Force subsequent loads of `id` to report failure even when a pose
    /// is persisted.
    pub fn fail_load(&mut self, id: AnchorId) {
        self.fail_loads.insert(id);
    }

    /// Force subsequent saves of `id` to report failure.
    pub fn fail_save(&mut self, id: AnchorId) {
        self.fail_saves.insert(id);
    }

    /// Stop failing loads/saves for `id`.
    pub fn heal(&mut self, id: &AnchorId) {
        self.fail_loads.remove(id);
        self.fail_saves.remove(id);
    }

    /// Persisted pose for `id`, if any.
    pub fn persisted(&self, id: &AnchorId) -> Option<Vec3> {
        self.persisted.get(id).copied()
    }

    /// Number of persisted anchors.
    pub fn persisted_count(&self) -> usize {
        self.persisted.len()
    }

    /// Overwrite the persisted pose for `id` without emitting an event.
    ///
    /// Simulates an anchor whose stored pose shifted between sessions.
    pub fn displace(&mut self, id: &AnchorId, position: Vec3) {
        if let Some(p) = self.persisted.get_mut(id) {
            *p = position;
        }
    }

    fn emit(&mut self, event: AnchorEvent) {
        self.senders
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnchorStore for MemoryStore {
    fn request_load(&mut self, id: &AnchorId) {
        let restored = if self.fail_loads.contains(id) {
            None
        } else {
            self.persisted.get(id).copied()
        };
        let event = match restored {
            Some(position) => AnchorEvent::Loaded {
                id: id.clone(),
                success: true,
                position,
            },
            None => AnchorEvent::Loaded {
                id: id.clone(),
                success: false,
                position: Vec3::zero(),
            },
        };
        self.emit(event);
    }

    fn request_save(&mut self, id: &AnchorId, position: Vec3) {
        let success = !self.fail_saves.contains(id);
        if success {
            self.persisted.insert(id.clone(), position);
        }
        self.emit(AnchorEvent::Saved {
            id: id.clone(),
            success,
        });
    }

    fn delete(&mut self, id: &AnchorId) {
        self.persisted.remove(id);
    }

    fn subscribe(&mut self) -> Receiver<AnchorEvent> {
        let (tx, rx) = unbounded();
        self.senders.push(tx);
        rx
    }
}
