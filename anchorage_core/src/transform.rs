// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal column-major 4×4 transform.
//!
//! Covers what the composer hands to a renderer (model, view and projection
//! matrices) without pulling in a full linear-algebra crate.

use core::ops::Mul;

/// A column-major 4×4 transform stored as `[[f32; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix, matching the memory layout
/// GL-style renderers expect for `glUniformMatrix4fv(.., false, ..)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f32; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from four column arrays.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f32; 4], col1: [f32; 4], col2: [f32; 4], col3: [f32; 4]) -> Self {
        Self {
            cols: [col0, col1, col2, col3],
        }
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f32; 4] {
        self.cols[i]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_uniform_scale(s: f32) -> Self {
        Self {
            cols: [
                [s, 0.0, 0.0, 0.0],
                [0.0, s, 0.0, 0.0],
                [0.0, 0.0, s, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Builds a GL clip-space projection from pinhole intrinsics.
    ///
    /// `focal` and `principal` are in pixels of an image `width` × `height`.
    /// Depth maps `-near..-far` (camera looks down −Z) to `-1..1`.
    #[must_use]
    pub fn perspective_from_intrinsics(
        focal: [f32; 2],
        principal: [f32; 2],
        width: f32,
        height: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let depth = near - far;
        Self {
            cols: [
                [2.0 * focal[0] / width, 0.0, 0.0, 0.0],
                [0.0, 2.0 * focal[1] / height, 0.0, 0.0],
                [
                    (width - 2.0 * principal[0]) / width,
                    (2.0 * principal[1] - height) / height,
                    (far + near) / depth,
                    -1.0,
                ],
                [0.0, 0.0, 2.0 * far * near / depth, 0.0],
            ],
        }
    }

    /// Applies the transform to a point (`w = 1`) and drops the `w` row.
    #[inline]
    #[must_use]
    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 3] {
        let c = &self.cols;
        [
            c[0][0] * p[0] + c[1][0] * p[1] + c[2][0] * p[2] + c[3][0],
            c[0][1] * p[0] + c[1][1] * p[1] + c[2][1] * p[2] + c[3][1],
            c[0][2] * p[0] + c[1][2] * p[1] + c[2][2] * p[2] + c[3][2],
        ]
    }

    /// Flattens to the 16-float column-major array renderers upload.
    #[inline]
    #[must_use]
    pub const fn to_cols_array(self) -> [f32; 16] {
        let c = self.cols;
        [
            c[0][0], c[0][1], c[0][2], c[0][3], c[1][0], c[1][1], c[1][2], c[1][3], c[2][0],
            c[2][1], c[2][2], c[2][3], c[3][0], c[3][1], c[3][2], c[3][3],
        ]
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f32; 4]; 4];
        for (j, col) in out.iter_mut().enumerate() {
            for (i, v) in col.iter_mut().enumerate() {
                *v = a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
            }
        }
        Self { cols: out }
    }
}
