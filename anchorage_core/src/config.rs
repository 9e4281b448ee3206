// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene configuration.

use core::fmt;

/// An RGBA color with components in `0.0..=1.0`.
#[derive(Clone, Copy, PartialEq)]
pub struct Color(pub [f32; 4]);

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self([1.0, 1.0, 1.0, 1.0]);
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "Color({r}, {g}, {b}, {a})")
    }
}

/// Configuration for a [`SceneHost`](crate::host::SceneHost).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    /// Maximum number of anchors kept alive; the oldest is evicted beyond
    /// this. Must be at least 1.
    pub anchor_capacity: usize,
    /// Near clip plane distance in meters.
    pub near_clip: f32,
    /// Far clip plane distance in meters.
    pub far_clip: f32,
    /// Color given to newly placed anchors.
    pub anchor_color: Color,
    /// Uniform scale applied to the anchored model.
    pub object_scale: f32,
    /// Shown at session start until an upward-facing plane is tracked.
    pub searching_message: &'static str,
    /// Shown when resume fails because the camera is held elsewhere.
    pub camera_unavailable_message: &'static str,
}

impl SceneConfig {
    /// The tap-to-place overlay defaults.
    #[must_use]
    pub const fn reference() -> Self {
        Self {
            anchor_capacity: 20,
            near_clip: 0.1,
            far_clip: 100.0,
            anchor_color: Color::WHITE,
            object_scale: 1.0,
            searching_message: "Searching for surfaces...",
            camera_unavailable_message: "Camera not available. Please restart the app.",
        }
    }

    /// Returns a copy with a different anchor capacity.
    #[must_use]
    pub const fn with_anchor_capacity(mut self, capacity: usize) -> Self {
        self.anchor_capacity = capacity;
        self
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::reference()
    }
}
