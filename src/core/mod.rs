//! Foundation types and math (no internal deps).

pub mod math;
pub mod types;

pub use types::{Pose3, Quat, Vec3};
