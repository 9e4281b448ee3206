// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene plan: an ordered sequence of draw items for one frame, and the
//! renderer contract it is submitted to.
//!
//! The [`SceneComposer`](crate::compose::SceneComposer) decides *what* to
//! draw and in which order; it never talks to the GPU. It fills a
//! [`ScenePlan`], copying frame-scoped data (point cloud, surfaces) into the
//! plan's buffers so the platform resources can be released immediately.
//! [`ScenePlan::submit`] then replays the items against a [`SceneRenderer`].

use alloc::vec::Vec;

use crate::anchor::AnchorId;
use crate::config::Color;
use crate::error::AssetError;
use crate::pose::Pose;
use crate::tracking::{FeaturePoint, PlaneSurface, TextureId};
use crate::transform::Transform3d;

/// Which of the two per-anchor draws an [`ObjectDraw`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectPass {
    /// The placed model itself.
    Model,
    /// The blended shadow quad under the model.
    Shadow,
}

/// One anchored object draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectDraw {
    /// The anchor this draw belongs to.
    pub anchor: AnchorId,
    /// Model or shadow.
    pub pass: ObjectPass,
    /// Anchor world transform with the object scale applied.
    pub model: Transform3d,
    /// World-to-camera matrix.
    pub view: Transform3d,
    /// Clip-space projection.
    pub projection: Transform3d,
    /// Light-estimate color correction for this frame.
    pub color_correction: [f32; 4],
    /// The anchor's display color.
    pub color: Color,
}

/// A single step of the frame, in draw order.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawItem {
    /// Full-screen camera image.
    Background {
        /// Texture holding the camera image.
        texture: TextureId,
        /// Capture timestamp of that image, in nanoseconds.
        timestamp_ns: u64,
    },
    /// The plan's point buffer.
    PointCloud {
        /// World-to-camera matrix.
        view: Transform3d,
        /// Clip-space projection.
        projection: Transform3d,
    },
    /// The plan's surface buffer.
    Surfaces {
        /// Display-oriented camera pose.
        camera_pose: Pose,
        /// Clip-space projection.
        projection: Transform3d,
    },
    /// One anchored object or shadow.
    Object(ObjectDraw),
}

/// An ordered list of draw items for a single frame.
///
/// Plans are reused across frames; [`clear`](Self::clear) keeps the buffer
/// allocations.
#[derive(Clone, Debug, Default)]
pub struct ScenePlan {
    /// Draw items in submission order.
    pub items: Vec<DrawItem>,
    /// Points copied out of this frame's point cloud.
    pub points: Vec<FeaturePoint>,
    /// Surfaces selected for drawing this frame.
    pub surfaces: Vec<PlaneSurface>,
}

impl ScenePlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
        self.points.clear();
        self.surfaces.clear();
    }

    /// Returns `true` if nothing is planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replays every item against `renderer`, in order.
    pub fn submit(&self, renderer: &mut dyn SceneRenderer) {
        for item in &self.items {
            match item {
                DrawItem::Background {
                    texture,
                    timestamp_ns,
                } => renderer.draw_background(*texture, *timestamp_ns),
                DrawItem::PointCloud { view, projection } => {
                    renderer.draw_point_cloud(&self.points, view, projection);
                }
                DrawItem::Surfaces {
                    camera_pose,
                    projection,
                } => renderer.draw_surfaces(&self.surfaces, camera_pose, projection),
                DrawItem::Object(draw) => renderer.draw_object(draw),
            }
        }
    }
}

/// Stateless draw primitives a platform renderer provides.
///
/// Implementations own their GPU programs and meshes; the plan only passes
/// matrices, colors and frame data.
pub trait SceneRenderer {
    /// Loads shaders, meshes and textures. Called once the drawing surface
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an [`AssetError`] when an asset cannot be loaded; the host
    /// logs it and keeps running.
    fn create_resources(&mut self) -> Result<(), AssetError>;

    /// Resizes the drawing viewport.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Texture the tracking source should stream camera images into.
    fn background_texture(&self) -> TextureId;

    /// Clears color and depth before anything else is drawn.
    fn clear(&mut self);

    /// Draws the camera image as a full-screen background.
    fn draw_background(&mut self, texture: TextureId, timestamp_ns: u64);

    /// Draws feature points.
    fn draw_point_cloud(&mut self, points: &[FeaturePoint], view: &Transform3d, projection: &Transform3d);

    /// Draws detected surfaces.
    fn draw_surfaces(&mut self, surfaces: &[PlaneSurface], camera_pose: &Pose, projection: &Transform3d);

    /// Draws one anchored model or its shadow.
    fn draw_object(&mut self, draw: &ObjectDraw);
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::test_support::{DrawCall, RecordingRenderer, floor};
    use crate::tracking::{TrackableId, TrackingState};

    #[test]
    fn submit_preserves_order_and_buffers() {
        let mut plan = ScenePlan::new();
        plan.items.push(DrawItem::Background {
            texture: TextureId(3),
            timestamp_ns: 10,
        });
        plan.points.push(FeaturePoint {
            position: [0.0; 3],
            confidence: 1.0,
        });
        plan.items.push(DrawItem::PointCloud {
            view: Transform3d::IDENTITY,
            projection: Transform3d::IDENTITY,
        });
        plan.surfaces.push(floor(4, TrackingState::Tracking));
        plan.items.push(DrawItem::Surfaces {
            camera_pose: Pose::IDENTITY,
            projection: Transform3d::IDENTITY,
        });

        let mut renderer = RecordingRenderer::default();
        plan.submit(&mut renderer);

        assert_eq!(
            renderer.calls,
            vec![
                DrawCall::Background(TextureId(3)),
                DrawCall::PointCloud(1),
                DrawCall::Surfaces(vec![TrackableId(4)]),
            ]
        );
    }

    #[test]
    fn clear_empties_everything() {
        let mut plan = ScenePlan::new();
        plan.items.push(DrawItem::Background {
            texture: TextureId(0),
            timestamp_ns: 0,
        });
        plan.surfaces.push(floor(1, TrackingState::Tracking));
        plan.clear();
        assert!(plan.is_empty());
        assert!(plan.surfaces.is_empty());
    }
}
