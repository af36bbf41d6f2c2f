//! Consensus engine: anchor groups, reconstruction, drift, selection.

pub mod consistency;
pub mod drift;
pub mod estimator;
pub mod frame;
pub mod group;
pub mod hub;
pub mod placer;
pub mod selector;

pub use consistency::ConsistencyChecker;
pub use drift::{DriftMonitor, DriftReport};
pub use estimator::{EstimateResult, FrameEstimator, FrameFix};
pub use frame::Frame;
pub use group::{AnchorGroup, AnchorSlot};
pub use hub::{HubEngine, PlacementProgress};
pub use placer::FramePlacer;
pub use selector::select_nearest;
