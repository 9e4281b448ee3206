// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted doubles for the external collaborators.

use alloc::collections::{BTreeMap, VecDeque};
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use kurbo::Point;

use crate::config::Color;
use crate::error::{AssetError, TrackingError};
use crate::pose::Pose;
use crate::render::{ObjectDraw, ObjectPass, SceneRenderer};
use crate::status::StatusSink;
use crate::tracking::{
    AnchorHandle, Camera, CameraIntrinsics, DisplayGeometry, FeaturePoint, FrameSnapshot,
    HitResult, LightEstimate, OrientationMode, OrientedPoint, PlaneSurface, PlaneType,
    PointCloud, TextureId, Trackable, TrackableId, TrackableKind, TrackingSource, TrackingState,
};
use crate::transform::Transform3d;

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LifecycleEvent {
    Acquired(u64),
    Released(u64),
}

#[derive(Debug, Default)]
struct LedgerState {
    events: Vec<LifecycleEvent>,
    anchor_states: BTreeMap<u64, TrackingState>,
    next_key: u64,
    clouds_acquired: usize,
    clouds_released: usize,
}

/// Shared record of every handle and point-cloud lifecycle transition.
#[derive(Clone, Debug, Default)]
pub(crate) struct Ledger(Rc<RefCell<LedgerState>>);

impl Ledger {
    pub(crate) fn events(&self) -> Vec<LifecycleEvent> {
        self.0.borrow().events.clone()
    }

    pub(crate) fn released_anchors(&self) -> Vec<u64> {
        self.0
            .borrow()
            .events
            .iter()
            .filter_map(|e| match e {
                LifecycleEvent::Released(k) => Some(*k),
                LifecycleEvent::Acquired(_) => None,
            })
            .collect()
    }

    pub(crate) fn live_anchors(&self) -> usize {
        let state = self.0.borrow();
        let acquired = state
            .events
            .iter()
            .filter(|e| matches!(e, LifecycleEvent::Acquired(_)))
            .count();
        acquired - (state.events.len() - acquired)
    }

    pub(crate) fn set_anchor_state(&self, key: u64, state: TrackingState) {
        self.0.borrow_mut().anchor_states.insert(key, state);
    }

    pub(crate) fn clouds_acquired(&self) -> usize {
        self.0.borrow().clouds_acquired
    }

    pub(crate) fn clouds_released(&self) -> usize {
        self.0.borrow().clouds_released
    }
}

// ---------------------------------------------------------------------------
// Anchors and point clouds
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct FakeAnchor {
    pub(crate) key: u64,
    pose: Pose,
    ledger: Ledger,
}

impl FakeAnchor {
    pub(crate) fn new(ledger: &Ledger, pose: Pose) -> Self {
        let mut state = ledger.0.borrow_mut();
        let key = state.next_key;
        state.next_key += 1;
        state.events.push(LifecycleEvent::Acquired(key));
        Self {
            key,
            pose,
            ledger: ledger.clone(),
        }
    }
}

impl AnchorHandle for FakeAnchor {
    fn tracking_state(&self) -> TrackingState {
        self.ledger
            .0
            .borrow()
            .anchor_states
            .get(&self.key)
            .copied()
            .unwrap_or(TrackingState::Tracking)
    }

    fn pose(&self) -> Pose {
        self.pose
    }

    fn release(self) {
        self.ledger
            .0
            .borrow_mut()
            .events
            .push(LifecycleEvent::Released(self.key));
    }
}

#[derive(Debug)]
pub(crate) struct FakeCloud {
    points: Vec<FeaturePoint>,
    ledger: Ledger,
}

impl FakeCloud {
    pub(crate) fn new(ledger: &Ledger, points: Vec<FeaturePoint>) -> Self {
        ledger.0.borrow_mut().clouds_acquired += 1;
        Self {
            points,
            ledger: ledger.clone(),
        }
    }
}

impl PointCloud for FakeCloud {
    fn points(&self) -> &[FeaturePoint] {
        &self.points
    }

    fn release(self) {
        self.ledger.0.borrow_mut().clouds_released += 1;
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub(crate) const CAMERA_TEXTURE: TextureId = TextureId(7);

/// Camera 1.5 m above the origin, looking down −Z.
pub(crate) fn camera(tracking_state: TrackingState) -> Camera {
    let pose = Pose::from_translation(0.0, 1.5, 0.0);
    Camera {
        pose,
        display_oriented_pose: pose,
        tracking_state,
        intrinsics: CameraIntrinsics {
            focal_length: [500.0, 500.0],
            principal_point: [320.0, 240.0],
            image_size: [640.0, 480.0],
        },
    }
}

pub(crate) fn snapshot(tracking_state: TrackingState) -> FrameSnapshot {
    FrameSnapshot {
        timestamp_ns: 1_000_000,
        camera: camera(tracking_state),
        light_estimate: LightEstimate {
            color_correction: [0.9, 0.8, 0.7, 0.5],
        },
        camera_texture: CAMERA_TEXTURE,
    }
}

/// A 2 m × 2 m floor plane at the origin.
pub(crate) fn floor(id: u64, tracking_state: TrackingState) -> PlaneSurface {
    PlaneSurface {
        id: TrackableId(id),
        plane_type: PlaneType::HorizontalUpwardFacing,
        center_pose: Pose::IDENTITY,
        polygon: vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]],
        tracking_state,
        subsumed_by: None,
    }
}

pub(crate) fn wall(id: u64, tracking_state: TrackingState) -> PlaneSurface {
    PlaneSurface {
        plane_type: PlaneType::Vertical,
        ..floor(id, tracking_state)
    }
}

/// A hit on the floor plane at `(x, 0, z)`; the normal points up.
pub(crate) fn floor_hit(x: f32, z: f32, distance: f32) -> HitResult {
    HitResult {
        distance,
        hit_pose: Pose::from_translation(x, 0.0, z),
        trackable: Trackable::Plane(floor(1, TrackingState::Tracking)),
    }
}

pub(crate) fn point_hit(id: u64, mode: OrientationMode, distance: f32) -> HitResult {
    let pose = Pose::from_translation(0.0, 0.5, -1.0);
    HitResult {
        distance,
        hit_pose: pose,
        trackable: Trackable::Point(OrientedPoint {
            id: TrackableId(id),
            pose,
            orientation_mode: mode,
            tracking_state: TrackingState::Tracking,
        }),
    }
}

// ---------------------------------------------------------------------------
// Tracking source
// ---------------------------------------------------------------------------

/// A tracking source replaying scripted frames.
///
/// When the frame script is empty, `update` repeats `default_frame`.
#[derive(Debug)]
pub(crate) struct FakeSource {
    pub(crate) ledger: Ledger,
    pub(crate) frames: VecDeque<Result<FrameSnapshot, TrackingError>>,
    pub(crate) default_frame: FrameSnapshot,
    pub(crate) hits: Vec<HitResult>,
    pub(crate) planes: Vec<PlaneSurface>,
    pub(crate) points: Vec<FeaturePoint>,
    pub(crate) resume_result: Result<(), TrackingError>,
    pub(crate) fail_point_cloud: bool,
    pub(crate) fail_anchor: bool,
    pub(crate) hit_tests: Cell<usize>,
    pub(crate) camera_texture: Option<TextureId>,
    pub(crate) geometry: Option<DisplayGeometry>,
    pub(crate) paused: bool,
}

impl FakeSource {
    pub(crate) fn new(ledger: &Ledger) -> Self {
        Self {
            ledger: ledger.clone(),
            frames: VecDeque::new(),
            default_frame: snapshot(TrackingState::Tracking),
            hits: Vec::new(),
            planes: Vec::new(),
            points: vec![FeaturePoint {
                position: [0.1, 0.2, -0.3],
                confidence: 0.9,
            }],
            resume_result: Ok(()),
            fail_point_cloud: false,
            fail_anchor: false,
            hit_tests: Cell::new(0),
            camera_texture: None,
            geometry: None,
            paused: true,
        }
    }
}

impl TrackingSource for FakeSource {
    type Anchor = FakeAnchor;
    type PointCloud = FakeCloud;

    fn resume(&mut self) -> Result<(), TrackingError> {
        self.resume_result.clone()?;
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn set_camera_texture(&mut self, texture: TextureId) {
        self.camera_texture = Some(texture);
    }

    fn set_display_geometry(&mut self, geometry: DisplayGeometry) {
        self.geometry = Some(geometry);
    }

    fn update(&mut self) -> Result<FrameSnapshot, TrackingError> {
        self.frames.pop_front().unwrap_or(Ok(self.default_frame))
    }

    fn hit_test(&self, _tap: Point) -> Vec<HitResult> {
        self.hit_tests.set(self.hit_tests.get() + 1);
        self.hits.clone()
    }

    fn all_trackables(&self, kind: TrackableKind) -> Vec<Trackable> {
        match kind {
            TrackableKind::Plane => self.planes.iter().cloned().map(Trackable::Plane).collect(),
            TrackableKind::Point => Vec::new(),
        }
    }

    fn acquire_point_cloud(&mut self) -> Result<FakeCloud, TrackingError> {
        if self.fail_point_cloud {
            return Err(TrackingError::Source("point cloud unavailable".to_string()));
        }
        Ok(FakeCloud::new(&self.ledger, self.points.clone()))
    }

    fn create_anchor(&mut self, hit: &HitResult) -> Result<FakeAnchor, TrackingError> {
        if self.fail_anchor {
            return Err(TrackingError::Source("anchor limit reached".to_string()));
        }
        Ok(FakeAnchor::new(&self.ledger, hit.hit_pose))
    }
}

// ---------------------------------------------------------------------------
// Renderer and status sink
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DrawCall {
    Clear,
    Background(TextureId),
    PointCloud(usize),
    Surfaces(Vec<TrackableId>),
    Object {
        pass: ObjectPass,
        model: Transform3d,
        color: Color,
    },
}

#[derive(Debug, Default)]
pub(crate) struct RecordingRenderer {
    pub(crate) calls: Vec<DrawCall>,
    pub(crate) viewport: Option<(u32, u32)>,
    pub(crate) fail_assets: bool,
}

impl RecordingRenderer {
    /// Calls after the leading clear, if any.
    pub(crate) fn draws(&self) -> &[DrawCall] {
        match self.calls.first() {
            Some(DrawCall::Clear) => &self.calls[1..],
            _ => &self.calls,
        }
    }

    pub(crate) fn objects(&self, pass: ObjectPass) -> Vec<Transform3d> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Object { pass: p, model, .. } if *p == pass => Some(*model),
                _ => None,
            })
            .collect()
    }
}

impl SceneRenderer for RecordingRenderer {
    fn create_resources(&mut self) -> Result<(), AssetError> {
        if self.fail_assets {
            return Err(AssetError::Read {
                path: "models/andy.obj".to_string(),
                reason: "missing".to_string(),
            });
        }
        Ok(())
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Some((width, height));
    }

    fn background_texture(&self) -> TextureId {
        CAMERA_TEXTURE
    }

    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear);
    }

    fn draw_background(&mut self, texture: TextureId, _timestamp_ns: u64) {
        self.calls.push(DrawCall::Background(texture));
    }

    fn draw_point_cloud(&mut self, points: &[FeaturePoint], _view: &Transform3d, _proj: &Transform3d) {
        self.calls.push(DrawCall::PointCloud(points.len()));
    }

    fn draw_surfaces(&mut self, surfaces: &[PlaneSurface], _camera_pose: &Pose, _proj: &Transform3d) {
        self.calls
            .push(DrawCall::Surfaces(surfaces.iter().map(|s| s.id).collect()));
    }

    fn draw_object(&mut self, draw: &ObjectDraw) {
        self.calls.push(DrawCall::Object {
            pass: draw.pass,
            model: draw.model,
            color: draw.color,
        });
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum StatusCall {
    Show(String),
    Error(String),
    Hide,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingStatus {
    pub(crate) calls: Vec<StatusCall>,
    showing: bool,
}

impl RecordingStatus {
    pub(crate) fn hides(&self) -> usize {
        self.calls.iter().filter(|c| **c == StatusCall::Hide).count()
    }
}

impl StatusSink for RecordingStatus {
    fn show_message(&mut self, text: &str) {
        self.calls.push(StatusCall::Show(text.to_string()));
        self.showing = true;
    }

    fn show_error(&mut self, text: &str) {
        self.calls.push(StatusCall::Error(text.to_string()));
        self.showing = true;
    }

    fn hide(&mut self) {
        self.calls.push(StatusCall::Hide);
        self.showing = false;
    }

    fn is_showing(&self) -> bool {
        self.showing
    }
}
