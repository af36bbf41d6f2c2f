//! Persistence-collaborator seam.
//!
//! The engine never persists anchors itself; it issues fire-and-forget
//! requests against an [`AnchorStore`] and learns the outcomes from typed
//! [`AnchorEvent`]s delivered over a channel. Events may arrive later in
//! the same tick or on a later tick, in any order, and possibly more than
//! once per request; the engine tolerates all of these.
//!
//! Request failures are never `Err` returns: a load that cannot restore a
//! pose reports `Loaded { success: false }`, leaving the slot inactive.

mod memory;

pub use memory::MemoryStore;

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::Vec3;

/// Stable identity of one anchor slot within one frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorId {
    /// Owning frame's name.
    pub frame: String,
    /// Slot index within the frame.
    pub slot: usize,
}

impl AnchorId {
    /// Create an anchor identity.
    pub fn new(frame: impl Into<String>, slot: usize) -> Self {
        Self {
            frame: frame.into(),
            slot,
        }
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.frame, self.slot)
    }
}

/// Completion notification from the persistence collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum AnchorEvent {
    /// A load request finished. `position` carries the restored pose on
    /// success and is meaningless otherwise.
    Loaded {
        /// Anchor the result belongs to.
        id: AnchorId,
        /// Whether the anchor was restored.
        success: bool,
        /// Restored world position (valid when `success`).
        position: Vec3,
    },
    /// A save request finished.
    Saved {
        /// Anchor the result belongs to.
        id: AnchorId,
        /// Whether the pose was persisted.
        success: bool,
    },
}

/// External anchor persistence.
///
/// Implementations must attribute results to the correct identity and
/// must keep requests for different identities independent. Completion
/// is asynchronous by contract even if an implementation happens to
/// finish synchronously.
pub trait AnchorStore {
    /// Request restoration of a previously saved anchor.
    fn request_load(&mut self, id: &AnchorId);

    /// Request persistence of an anchor's current position.
    fn request_save(&mut self, id: &AnchorId, position: Vec3);

    /// Remove any persisted pose for the identity. Fire-and-forget.
    fn delete(&mut self, id: &AnchorId);

    /// Obtain a receiver for completion events.
    fn subscribe(&mut self) -> Receiver<AnchorEvent>;
}
