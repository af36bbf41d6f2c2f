//! # Sthira
//!
//! Anchor-consensus spatial reference engine. Sthira reconstructs a
//! stable local reference frame (a hub frame) from a redundant set of
//! independently-persisted 3D anchors whose positions drift or fail to
//! reload between sessions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      io/                            │  ← Record persistence
//! │                (frame record codec)                 │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    engine/                          │  ← Consensus engine
//! │   (group, estimator, placer, drift, selector, hub)  │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    store/                           │  ← Anchor persistence seam
//! │            (AnchorStore, AnchorEvent)               │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                 (types, math)                       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Lifecycle
//!
//! A session has two flows:
//!
//! - **Placement** (first run, or an explicit reset): the host observes a
//!   pose per frame from an outer source such as marker tracking; the
//!   engine scatters anchors around it, persists them, pins every
//!   frame's root to frame 0's center, and writes the frame records.
//! - **Restore** (every later run): anchors reload asynchronously; once
//!   enough of a frame's anchors are active, random triplets are checked
//!   against the recorded inter-anchor distances and the frame's center
//!   and front points are triangulated from an accepted triplet. A
//!   drift monitor re-validates resolved frames, and the frame nearest
//!   the viewer serves the output transform each tick.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sthira::{HubConfig, HubEngine, MemoryStore, Vec3};
//!
//! let mut store = MemoryStore::new();
//! let mut hub = HubEngine::new(&["lobby", "lab"], HubConfig::default(), &mut store)?;
//!
//! if !hub.restore_from_path(&mut store, "frames.json")? {
//!     // First run: drive a placement session from marker tracking.
//!     hub.begin_placement(&mut store)?;
//! }
//!
//! // Per tick:
//! if let Some(root) = hub.tick(dt, viewer_position) {
//!     // Pin content to `root`.
//! }
//! ```
//!
//! # Coordinate System
//!
//! Right-handed, Y-up. Frames live in the horizontal X/Z plane; zero yaw
//! faces +Z, and reconstructed orientations are yaw-only.

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Anchor persistence seam (depends on core)
// ============================================================================
pub mod store;

// ============================================================================
// Layer 3: Consensus engine (depends on core, store, io)
// ============================================================================
pub mod engine;

// ============================================================================
// Layer 4: Record persistence (depends on core)
// ============================================================================
pub mod io;

// Supporting modules
pub mod config;
pub mod error;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use crate::core::{Pose3, Quat, Vec3};

// Configuration and errors
pub use config::HubConfig;
pub use error::{Result, SthiraError};

// Store seam
pub use store::{AnchorEvent, AnchorId, AnchorStore, MemoryStore};

// Engine
pub use engine::{
    select_nearest, AnchorGroup, AnchorSlot, ConsistencyChecker, DriftMonitor, DriftReport,
    EstimateResult, Frame, FrameEstimator, FrameFix, FramePlacer, HubEngine, PlacementProgress,
};

// Records
pub use io::{load_records, save_records, FrameRecord, RecordSet};
