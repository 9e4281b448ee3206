// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tap-to-place rules.
//!
//! A tap becomes an anchor only while the camera is tracking. The hit-test
//! results for the tap are scanned nearest first and the first one that
//! lands on a usable surface wins:
//!
//! - a **plane** hit counts if the hit lies inside the plane's boundary
//!   polygon and the camera is in front of the plane, or
//! - an **oriented point** hit counts if the platform estimated its surface
//!   normal.
//!
//! Anything else is skipped. If nothing qualifies the tap is dropped.

use alloc::vec::Vec;

use kurbo::Point;

use crate::anchor::{Admission, AnchorRegistry};
use crate::config::{Color, SceneConfig};
use crate::error::TrackingError;
use crate::pose::{Pose, distance_to_plane};
use crate::tracking::{Camera, HitResult, OrientationMode, Trackable, TrackingSource};

/// A hit selected for anchoring, plus the color the anchor will get.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    /// The accepted hit.
    pub hit: HitResult,
    /// Position of the accepted hit in the ranked list.
    pub rank: usize,
    /// Display color for the new anchor.
    pub color: Color,
}

/// Decides which tap, if any, becomes an anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementPolicy {
    color: Color,
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}

impl PlacementPolicy {
    /// Creates a policy that colors new anchors `color`.
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self { color }
    }

    /// Creates a policy from the scene configuration.
    #[must_use]
    pub const fn from_config(config: &SceneConfig) -> Self {
        Self::new(config.anchor_color)
    }

    /// Selects the anchor location for `tap`, if any.
    ///
    /// Returns `None` without running `hit_test` unless `camera` is
    /// tracking. Otherwise scans the ranked hits and returns the first that
    /// [`qualifies`](Self::qualifies); lower-ranked hits are not looked at.
    pub fn consider_tap(
        &self,
        tap: Point,
        camera: &Camera,
        hit_test: impl FnOnce(Point) -> Vec<HitResult>,
    ) -> Option<Placement> {
        if !camera.tracking_state.is_tracking() {
            log::trace!("dropping tap at {tap:?}: camera is {:?}", camera.tracking_state);
            return None;
        }

        let hits = hit_test(tap);
        let (rank, hit) = hits
            .into_iter()
            .enumerate()
            .find(|(_, hit)| Self::qualifies(hit, &camera.pose))?;
        Some(Placement {
            hit,
            rank,
            color: self.color,
        })
    }

    /// Returns whether `hit` is an acceptable anchor location as seen from
    /// `camera_pose`.
    #[must_use]
    pub fn qualifies(hit: &HitResult, camera_pose: &Pose) -> bool {
        match &hit.trackable {
            Trackable::Plane(plane) => {
                plane.is_pose_in_polygon(&hit.hit_pose)
                    && distance_to_plane(&hit.hit_pose, camera_pose) > 0.0
            }
            Trackable::Point(point) => {
                point.orientation_mode == OrientationMode::EstimatedSurfaceNormal
            }
        }
    }

    /// Creates the anchor for `placement` and admits it into `registry`.
    ///
    /// If the registry is full the oldest anchor is released before the new
    /// one is created.
    ///
    /// # Errors
    ///
    /// Propagates the source's anchor-creation failure.
    pub fn place<S: TrackingSource>(
        &self,
        placement: &Placement,
        source: &mut S,
        registry: &mut AnchorRegistry<S::Anchor>,
    ) -> Result<Admission, TrackingError> {
        let admission =
            registry.add_with(placement.color, || source.create_anchor(&placement.hit))?;
        log::debug!(
            "placed {:?} on {:?} (hit #{}) at {:?}",
            admission.id,
            placement.hit.trackable.id(),
            placement.rank,
            placement.hit.hit_pose.translation
        );
        Ok(admission)
    }
}
