// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame draw ordering.
//!
//! [`SceneComposer::compose`] turns one [`FrameSnapshot`] into a
//! [`ScenePlan`] in a fixed order:
//!
//! 1. camera background (always),
//! 2. feature points,
//! 3. detected surfaces,
//! 4. each tracking anchor's model followed by its shadow.
//!
//! Steps 2–4 only happen while the camera is tracking. Anchors whose own
//! tracking is lost stay in the registry but are not drawn.

use crate::anchor::AnchorRegistry;
use crate::config::SceneConfig;
use crate::error::TrackingError;
use crate::render::{DrawItem, ObjectDraw, ObjectPass, ScenePlan};
use crate::status::{StatusSink, SurfaceSearchStatus};
use crate::tracking::{FrameSnapshot, PointCloudGuard, Trackable, TrackableKind, TrackingSource};
use crate::transform::Transform3d;

/// What one call to [`SceneComposer::compose`] planned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositionReport {
    /// Whether the camera was tracking; `false` means background only.
    pub tracking: bool,
    /// Feature points planned.
    pub points: usize,
    /// Surfaces planned.
    pub surfaces: usize,
    /// Anchors drawn (each as a model and a shadow).
    pub anchors_drawn: usize,
    /// Registered anchors skipped because they were not tracking.
    pub anchors_skipped: usize,
}

/// Builds the frame's [`ScenePlan`] from a snapshot, the tracking source and
/// the anchor registry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneComposer {
    near_clip: f32,
    far_clip: f32,
    object_scale: f32,
    search: SurfaceSearchStatus,
}

impl Default for SceneComposer {
    fn default() -> Self {
        Self::from_config(&SceneConfig::reference())
    }
}

impl SceneComposer {
    /// Creates a composer using the configured clip planes and object scale.
    #[must_use]
    pub const fn from_config(config: &SceneConfig) -> Self {
        Self {
            near_clip: config.near_clip,
            far_clip: config.far_clip,
            object_scale: config.object_scale,
            search: SurfaceSearchStatus::new(),
        }
    }

    /// The surface-search latch this composer updates every tracking frame.
    #[must_use]
    pub const fn search_status(&self) -> &SurfaceSearchStatus {
        &self.search
    }

    pub(crate) fn search_status_mut(&mut self) -> &mut SurfaceSearchStatus {
        &mut self.search
    }

    /// Fills `plan` for the frame described by `snapshot`.
    ///
    /// `plan` is cleared first. Whatever was planned before an error is left
    /// in place so the caller can still submit it.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the point cloud cannot be acquired. The
    /// background has already been planned at that point.
    pub fn compose<S: TrackingSource>(
        &mut self,
        snapshot: &FrameSnapshot,
        source: &mut S,
        registry: &AnchorRegistry<S::Anchor>,
        status: &mut dyn StatusSink,
        plan: &mut ScenePlan,
    ) -> Result<CompositionReport, TrackingError> {
        plan.clear();
        plan.items.push(DrawItem::Background {
            texture: snapshot.camera_texture,
            timestamp_ns: snapshot.timestamp_ns,
        });

        let camera = &snapshot.camera;
        if !camera.tracking_state.is_tracking() {
            log::trace!(
                "camera {:?}, background only at {}",
                camera.tracking_state,
                snapshot.timestamp_ns
            );
            return Ok(CompositionReport::default());
        }

        let projection = camera.projection_matrix(self.near_clip, self.far_clip);
        let view = camera.view_matrix();
        let color_correction = snapshot.light_estimate.color_correction;

        let cloud = PointCloudGuard::new(source.acquire_point_cloud()?);
        plan.points.extend_from_slice(cloud.points());
        cloud.release();
        if let Some(first) = plan.points.first() {
            log::trace!(
                "{} feature points, first at {:?} ({:.2})",
                plan.points.len(),
                first.position,
                first.confidence
            );
        }
        plan.items.push(DrawItem::PointCloud { view, projection });

        let planes = source.all_trackables(TrackableKind::Plane);
        self.search.observe(&planes, status);
        plan.surfaces.extend(
            planes
                .into_iter()
                .filter_map(|trackable| match trackable {
                    Trackable::Plane(plane) => Some(plane),
                    Trackable::Point(_) => None,
                })
                .filter(|plane| plane.is_drawable()),
        );
        plan.items.push(DrawItem::Surfaces {
            camera_pose: camera.display_oriented_pose,
            projection,
        });

        let scale = Transform3d::from_uniform_scale(self.object_scale);
        let mut anchors_drawn = 0;
        for anchor in registry.tracking() {
            let model = anchor.world_transform() * scale;
            for pass in [ObjectPass::Model, ObjectPass::Shadow] {
                plan.items.push(DrawItem::Object(ObjectDraw {
                    anchor: anchor.id(),
                    pass,
                    model,
                    view,
                    projection,
                    color_correction,
                    color: anchor.color(),
                }));
            }
            anchors_drawn += 1;
        }

        Ok(CompositionReport {
            tracking: true,
            points: plan.points.len(),
            surfaces: plan.surfaces.len(),
            anchors_drawn,
            anchors_skipped: registry.len() - anchors_drawn,
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::config::Color;
    use crate::pose::Pose;
    use crate::test_support::{
        CAMERA_TEXTURE, DrawCall, FakeAnchor, FakeSource, Ledger, RecordingRenderer,
        RecordingStatus, floor, snapshot, wall,
    };
    use crate::tracking::{TrackableId, TrackingState};

    fn render(plan: &ScenePlan) -> RecordingRenderer {
        let mut renderer = RecordingRenderer::default();
        plan.submit(&mut renderer);
        renderer
    }

    #[test]
    fn background_only_when_camera_not_tracking() {
        let ledger = Ledger::default();
        let mut source = FakeSource::new(&ledger);
        source.planes.push(floor(1, TrackingState::Tracking));
        let mut registry = AnchorRegistry::new(4);
        registry.add(FakeAnchor::new(&ledger, Pose::IDENTITY), Color::WHITE);
        let mut composer = SceneComposer::default();
        let mut status = RecordingStatus::default();
        let mut plan = ScenePlan::new();

        for state in [TrackingState::Paused, TrackingState::Stopped] {
            let report = composer
                .compose(&snapshot(state), &mut source, &registry, &mut status, &mut plan)
                .unwrap();
            assert!(!report.tracking);
            assert_eq!(render(&plan).calls, vec![DrawCall::Background(CAMERA_TEXTURE)]);
        }
        assert_eq!(ledger.clouds_acquired(), 0);
        assert!(status.calls.is_empty());
    }

    #[test]
    fn full_frame_order() {
        let ledger = Ledger::default();
        let mut source = FakeSource::new(&ledger);
        source.planes.push(floor(1, TrackingState::Tracking));
        let mut registry = AnchorRegistry::new(4);
        let red = Color([1.0, 0.0, 0.0, 1.0]);
        registry.add(FakeAnchor::new(&ledger, Pose::from_translation(0.0, 0.0, -1.0)), red);
        let mut composer = SceneComposer::default();
        let mut status = RecordingStatus::default();
        let mut plan = ScenePlan::new();

        let report = composer
            .compose(
                &snapshot(TrackingState::Tracking),
                &mut source,
                &registry,
                &mut status,
                &mut plan,
            )
            .unwrap();
        assert_eq!(
            report,
            CompositionReport {
                tracking: true,
                points: 1,
                surfaces: 1,
                anchors_drawn: 1,
                anchors_skipped: 0,
            }
        );

        let model = Transform3d::from_translation(0.0, 0.0, -1.0);
        assert_eq!(
            render(&plan).calls,
            vec![
                DrawCall::Background(CAMERA_TEXTURE),
                DrawCall::PointCloud(1),
                DrawCall::Surfaces(vec![TrackableId(1)]),
                DrawCall::Object {
                    pass: ObjectPass::Model,
                    model,
                    color: red,
                },
                DrawCall::Object {
                    pass: ObjectPass::Shadow,
                    model,
                    color: red,
                },
            ]
        );
    }

    #[test]
    fn draws_carry_frame_lighting_and_matrices() {
        let ledger = Ledger::default();
        let mut source = FakeSource::new(&ledger);
        let mut registry = AnchorRegistry::new(1);
        registry.add(FakeAnchor::new(&ledger, Pose::IDENTITY), Color::WHITE);
        let mut composer = SceneComposer::default();
        let mut plan = ScenePlan::new();
        let frame = snapshot(TrackingState::Tracking);

        composer
            .compose(&frame, &mut source, &registry, &mut RecordingStatus::default(), &mut plan)
            .unwrap();

        let draws: Vec<_> = plan
            .items
            .iter()
            .filter_map(|item| match item {
                DrawItem::Object(draw) => Some(*draw),
                _ => None,
            })
            .collect();
        assert_eq!(draws.len(), 2);
        for draw in draws {
            assert_eq!(draw.color_correction, frame.light_estimate.color_correction);
            assert_eq!(draw.view, frame.camera.view_matrix());
            assert_eq!(draw.projection, frame.camera.projection_matrix(0.1, 100.0));
        }
    }

    #[test]
    fn non_tracking_anchors_are_skipped_but_kept() {
        let ledger = Ledger::default();
        let mut source = FakeSource::new(&ledger);
        let mut registry = AnchorRegistry::new(4);
        let a = registry.add(FakeAnchor::new(&ledger, Pose::IDENTITY), Color::WHITE);
        let b = registry.add(FakeAnchor::new(&ledger, Pose::IDENTITY), Color::WHITE);
        ledger.set_anchor_state(0, TrackingState::Paused);
        let mut composer = SceneComposer::default();
        let mut plan = ScenePlan::new();

        let report = composer
            .compose(
                &snapshot(TrackingState::Tracking),
                &mut source,
                &registry,
                &mut RecordingStatus::default(),
                &mut plan,
            )
            .unwrap();
        assert_eq!(report.anchors_drawn, 1);
        assert_eq!(report.anchors_skipped, 1);
        assert!(registry.contains(a.id));
        assert!(plan.items.iter().all(|item| match item {
            DrawItem::Object(draw) => draw.anchor == b.id,
            _ => true,
        }));
    }

    #[test]
    fn only_drawable_planes_are_planned() {
        let ledger = Ledger::default();
        let mut source = FakeSource::new(&ledger);
        let mut merged = floor(3, TrackingState::Tracking);
        merged.subsumed_by = Some(TrackableId(1));
        source.planes = vec![
            floor(1, TrackingState::Tracking),
            wall(2, TrackingState::Paused),
            merged,
            wall(4, TrackingState::Tracking),
        ];
        let registry = AnchorRegistry::<FakeAnchor>::new(1);
        let mut plan = ScenePlan::new();

        SceneComposer::default()
            .compose(
                &snapshot(TrackingState::Tracking),
                &mut source,
                &registry,
                &mut RecordingStatus::default(),
                &mut plan,
            )
            .unwrap();
        let ids: Vec<_> = plan.surfaces.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![TrackableId(1), TrackableId(4)]);
    }

    #[test]
    fn point_cloud_released_once_per_frame() {
        let ledger = Ledger::default();
        let mut source = FakeSource::new(&ledger);
        let registry = AnchorRegistry::<FakeAnchor>::new(1);
        let mut composer = SceneComposer::default();
        let mut plan = ScenePlan::new();

        for _ in 0..3 {
            composer
                .compose(
                    &snapshot(TrackingState::Tracking),
                    &mut source,
                    &registry,
                    &mut RecordingStatus::default(),
                    &mut plan,
                )
                .unwrap();
        }
        assert_eq!(ledger.clouds_acquired(), 3);
        assert_eq!(ledger.clouds_released(), 3);
    }

    #[test]
    fn point_cloud_fault_keeps_background() {
        let ledger = Ledger::default();
        let mut source = FakeSource::new(&ledger);
        source.fail_point_cloud = true;
        let registry = AnchorRegistry::<FakeAnchor>::new(1);
        let mut plan = ScenePlan::new();

        let result = SceneComposer::default().compose(
            &snapshot(TrackingState::Tracking),
            &mut source,
            &registry,
            &mut RecordingStatus::default(),
            &mut plan,
        );
        assert!(matches!(result, Err(TrackingError::Source(_))));
        assert_eq!(render(&plan).calls, vec![DrawCall::Background(CAMERA_TEXTURE)]);
        assert_eq!(ledger.clouds_released(), 0);
    }

    #[test]
    fn search_hint_hidden_on_first_floor() {
        let ledger = Ledger::default();
        let mut source = FakeSource::new(&ledger);
        let registry = AnchorRegistry::<FakeAnchor>::new(1);
        let mut composer = SceneComposer::default();
        let mut status = RecordingStatus::default();
        let mut plan = ScenePlan::new();
        composer.search_status_mut().begin("Searching for surfaces...", &mut status);

        let frame = snapshot(TrackingState::Tracking);
        composer
            .compose(&frame, &mut source, &registry, &mut status, &mut plan)
            .unwrap();
        assert_eq!(status.hides(), 0);

        source.planes.push(floor(1, TrackingState::Tracking));
        for _ in 0..2 {
            composer
                .compose(&frame, &mut source, &registry, &mut status, &mut plan)
                .unwrap();
        }
        assert_eq!(status.hides(), 1);
        assert!(composer.search_status().is_dismissed());
    }
}
