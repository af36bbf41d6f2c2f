//! Point, quaternion, and pose types for anchor-space geometry.
//!
//! Sthira works in a right-handed, Y-up coordinate system: anchors for a
//! frame share the frame's horizontal X/Z plane, and reconstructed
//! orientations are yaw-only (rotations about +Y). Zero yaw faces +Z.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// A 3D point or displacement in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X coordinate in meters
    pub x: f32,
    /// Y coordinate (height) in meters
    pub y: f32,
    /// Z coordinate in meters
    pub z: f32,
}

impl Vec3 {
    /// Create a new vector.
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    #[inline]
    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Squared distance to another point (avoids sqrt).
    #[inline]
    pub fn distance_squared(&self, other: &Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &Vec3) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Vector length.
    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// True when every component is a finite number.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// A unit quaternion rotation.
///
/// Stored as (x, y, z, w). Persisted quaternions are normalized on read;
/// a degenerate (zero or non-finite) quaternion normalizes to identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
    /// Scalar component
    pub w: f32,
}

impl Quat {
    /// Create a quaternion from raw components. Not normalized.
    #[inline]
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// The identity rotation.
    #[inline]
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }

    /// Rotation about +Y by `yaw` radians.
    #[inline]
    pub fn from_yaw(yaw: f32) -> Self {
        let half = yaw * 0.5;
        Self {
            x: 0.0,
            y: half.sin(),
            z: 0.0,
            w: half.cos(),
        }
    }

    /// Normalize to unit length.
    ///
    /// A zero-length or non-finite quaternion becomes identity.
    pub fn normalize(&self) -> Quat {
        let norm =
            (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if !norm.is_finite() || norm < f32::EPSILON {
            return Quat::identity();
        }
        let inv = 1.0 / norm;
        Quat::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
    }

    /// Inverse rotation (conjugate; assumes unit length).
    #[inline]
    pub fn inverse(&self) -> Quat {
        Quat::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Rotate a vector by this quaternion.
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        // v' = v + 2q_w (q_v × v) + 2 q_v × (q_v × v)
        let qv = Vec3::new(self.x, self.y, self.z);
        let t = cross(qv, v) * 2.0;
        v + t * self.w + cross(qv, t)
    }

    /// Hamilton product `self * rhs` (apply `rhs` first, then `self`).
    pub fn mul(&self, rhs: &Quat) -> Quat {
        Quat::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }

    /// Yaw angle of the rotated forward axis, in radians.
    pub fn yaw(&self) -> f32 {
        let f = self.rotate(Vec3::new(0.0, 0.0, 1.0));
        f.x.atan2(f.z)
    }

    /// True when every component is a finite number.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

#[inline]
fn cross(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

/// A rigid pose: position plus orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose3 {
    /// Position in meters
    pub position: Vec3,
    /// Orientation
    pub rotation: Quat,
}

impl Pose3 {
    /// Create a new pose.
    #[inline]
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Identity pose at the origin.
    #[inline]
    pub fn identity() -> Self {
        Self {
            position: Vec3::zero(),
            rotation: Quat::identity(),
        }
    }

    /// The pose's forward axis (+Z rotated into world).
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation.rotate(Vec3::new(0.0, 0.0, 1.0))
    }

    /// Transform a point from this pose's local frame to world.
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation.rotate(point)
    }

    /// Transform a world point into this pose's local frame.
    #[inline]
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse().rotate(point - self.position)
    }

    /// Compose a local pose onto this one: `self ∘ local`.
    pub fn compose(&self, local: &Pose3) -> Pose3 {
        Pose3::new(
            self.transform_point(local.position),
            self.rotation.mul(&local.rotation),
        )
    }

    /// Re-orient to face `target`, keeping +Y up.
    ///
    /// Only yaw is derived; a target directly above or below (no
    /// horizontal offset) leaves the orientation unchanged.
    pub fn look_at(&mut self, target: Vec3) {
        let dx = target.x - self.position.x;
        let dz = target.z - self.position.z;
        if dx == 0.0 && dz == 0.0 {
            return;
        }
        self.rotation = Quat::from_yaw(dx.atan2(dz));
    }
}

impl Default for Pose3 {
    fn default() -> Self {
        Self::identity()
    }
}
