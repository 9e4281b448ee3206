// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rigid poses: a translation plus a unit-quaternion rotation.
//!
//! Tracking platforms report camera, plane, hit and anchor placements as
//! poses that map from the object's local frame to world space. Quaternions
//! are stored `[x, y, z, w]` and assumed to be normalized by the producer.

use crate::transform::Transform3d;

/// A rigid transform from a local frame to world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// World-space translation.
    pub translation: [f32; 3],
    /// Unit quaternion `[x, y, z, w]`.
    pub rotation: [f32; 4],
}

impl Pose {
    /// The identity pose.
    pub const IDENTITY: Self = Self {
        translation: [0.0; 3],
        rotation: [0.0, 0.0, 0.0, 1.0],
    };

    /// Creates a pose from a translation and a unit quaternion.
    #[inline]
    #[must_use]
    pub const fn new(translation: [f32; 3], rotation: [f32; 4]) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Creates a pure translation.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self::new([x, y, z], [0.0, 0.0, 0.0, 1.0])
    }

    /// Rotates `v` by this pose's rotation (no translation).
    #[must_use]
    pub fn rotate_vector(&self, v: [f32; 3]) -> [f32; 3] {
        let [qx, qy, qz, qw] = self.rotation;
        let q = [qx, qy, qz];
        // v' = v + w·t + q × t, with t = 2 (q × v)
        let t = scale(cross(q, v), 2.0);
        add(add(v, scale(t, qw)), cross(q, t))
    }

    /// Maps a point from this pose's local frame to world space.
    #[inline]
    #[must_use]
    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 3] {
        add(self.rotate_vector(p), self.translation)
    }

    /// Returns local axis `axis` (0 = X, 1 = Y, 2 = Z) in world space,
    /// scaled by `scale`.
    ///
    /// # Panics
    ///
    /// Panics if `axis > 2`.
    #[must_use]
    pub fn transformed_axis(&self, axis: usize, scale: f32) -> [f32; 3] {
        let mut unit = [0.0; 3];
        unit[axis] = scale;
        self.rotate_vector(unit)
    }

    /// Returns the pose that undoes this one.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let [x, y, z, w] = self.rotation;
        let rotation = [-x, -y, -z, w];
        let inv = Self::new([0.0; 3], rotation);
        let t = inv.rotate_vector(self.translation);
        Self::new([-t[0], -t[1], -t[2]], rotation)
    }

    /// Converts to a column-major model matrix.
    #[must_use]
    pub fn to_transform(&self) -> Transform3d {
        let [x, y, z, w] = self.rotation;
        let [tx, ty, tz] = self.translation;
        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (wx, wy, wz) = (w * x, w * y, w * z);
        Transform3d::from_cols(
            [1.0 - 2.0 * (yy + zz), 2.0 * (xy + wz), 2.0 * (xz - wy), 0.0],
            [2.0 * (xy - wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz + wx), 0.0],
            [2.0 * (xz + wy), 2.0 * (yz - wx), 1.0 - 2.0 * (xx + yy), 0.0],
            [tx, ty, tz, 1.0],
        )
    }
}

impl Default for Pose {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Signed distance from the plane through `plane_pose` (normal = local +Y)
/// to the camera position.
///
/// Positive means the camera is on the side the plane normal points to, i.e.
/// the camera sees the plane's front face.
#[must_use]
pub fn distance_to_plane(plane_pose: &Pose, camera_pose: &Pose) -> f32 {
    let normal = plane_pose.transformed_axis(1, 1.0);
    let offset = sub(camera_pose.translation, plane_pose.translation);
    dot(offset, normal)
}

#[inline]
fn add(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn scale(a: [f32; 3], s: f32) -> [f32; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
