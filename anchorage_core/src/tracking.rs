// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracking-source contract and the per-frame data it produces.
//!
//! The AR platform is an external collaborator. Each integration provides:
//!
//! - **Frame snapshots** — [`TrackingSource::update`] returns a
//!   [`FrameSnapshot`] once per render-loop iteration: camera pose and
//!   tracking state, intrinsics, light estimate and the camera texture the
//!   background is drawn from.
//!
//! - **Hit testing** — [`TrackingSource::hit_test`] maps a screen tap to
//!   depth-sorted [`HitResult`]s, nearest first.
//!
//! - **Trackables** — [`TrackingSource::all_trackables`] lists detected
//!   surfaces as the closed [`Trackable`] variant.
//!
//! - **Frame-scoped resources** — the point cloud is acquired per frame and
//!   must be released exactly once; [`PointCloudGuard`] enforces that.
//!
//! - **Anchors** — [`TrackingSource::create_anchor`] returns an
//!   [`AnchorHandle`] the platform keeps refining until it is released.

use alloc::vec::Vec;
use core::fmt;

use kurbo::{BezPath, Point, Shape};

use crate::error::TrackingError;
use crate::pose::Pose;
use crate::transform::Transform3d;

/// Confidence of a pose estimate, for the camera or for an anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrackingState {
    /// The pose is being tracked and is valid this frame.
    Tracking,
    /// Tracking is temporarily lost or limited; may resume.
    #[default]
    Paused,
    /// Tracking has stopped and will not resume for this object.
    Stopped,
}

impl TrackingState {
    /// Returns `true` only for [`Tracking`](Self::Tracking).
    #[inline]
    #[must_use]
    pub const fn is_tracking(self) -> bool {
        matches!(self, Self::Tracking)
    }
}

/// Identifies a trackable within one tracking session.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackableId(pub u64);

impl fmt::Debug for TrackableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrackableId({})", self.0)
    }
}

/// Identifies a GPU texture owned by the renderer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureId(pub u32);

impl fmt::Debug for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextureId({})", self.0)
    }
}

/// Pinhole camera intrinsics for the current image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraIntrinsics {
    /// Focal length in pixels, `[fx, fy]`.
    pub focal_length: [f32; 2],
    /// Principal point in pixels, `[cx, cy]`.
    pub principal_point: [f32; 2],
    /// Image size in pixels, `[width, height]`.
    pub image_size: [f32; 2],
}

/// The device camera as seen in one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Physical camera pose in world space.
    pub pose: Pose,
    /// Camera pose rotated to match the current display orientation.
    pub display_oriented_pose: Pose,
    /// Tracking state of the camera itself.
    pub tracking_state: TrackingState,
    /// Intrinsics used to derive the projection matrix.
    pub intrinsics: CameraIntrinsics,
}

impl Camera {
    /// World-to-camera matrix for the display orientation.
    #[must_use]
    pub fn view_matrix(&self) -> Transform3d {
        self.display_oriented_pose.inverse().to_transform()
    }

    /// Clip-space projection for the given clip planes.
    #[must_use]
    pub fn projection_matrix(&self, near: f32, far: f32) -> Transform3d {
        let i = &self.intrinsics;
        Transform3d::perspective_from_intrinsics(
            i.focal_length,
            i.principal_point,
            i.image_size[0],
            i.image_size[1],
            near,
            far,
        )
    }
}

/// Per-frame estimate of scene lighting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightEstimate {
    /// RGB scale factors followed by average pixel intensity in gamma space.
    pub color_correction: [f32; 4],
}

impl LightEstimate {
    /// Leaves shading untouched.
    pub const NEUTRAL: Self = Self {
        color_correction: [1.0, 1.0, 1.0, 1.0],
    };
}

impl Default for LightEstimate {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Everything the composer needs from one tracking update.
///
/// Snapshots are transient: produced once per frame and never retained.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSnapshot {
    /// Capture timestamp of the camera image, in nanoseconds.
    pub timestamp_ns: u64,
    /// Camera state for this frame.
    pub camera: Camera,
    /// Lighting estimate for this frame.
    pub light_estimate: LightEstimate,
    /// Texture holding the camera image for the background pass.
    pub camera_texture: TextureId,
}

/// A sparse feature point with its confidence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeaturePoint {
    /// World-space position.
    pub position: [f32; 3],
    /// Confidence in `0.0..=1.0`.
    pub confidence: f32,
}

/// Classification of a detected plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaneType {
    /// Floor, table top: normal points up.
    HorizontalUpwardFacing,
    /// Ceiling: normal points down.
    HorizontalDownwardFacing,
    /// Walls.
    Vertical,
}

/// A detected planar surface.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneSurface {
    /// Identity within the session.
    pub id: TrackableId,
    /// Orientation class.
    pub plane_type: PlaneType,
    /// Pose of the plane center; local +Y is the plane normal.
    pub center_pose: Pose,
    /// Boundary polygon as `[x, z]` pairs in the plane's local frame.
    pub polygon: Vec<[f32; 2]>,
    /// Tracking state of the plane.
    pub tracking_state: TrackingState,
    /// Set once the plane has been merged into another plane.
    pub subsumed_by: Option<TrackableId>,
}

impl PlaneSurface {
    /// Returns whether `pose` projects inside the boundary polygon.
    ///
    /// The pose is moved into the plane's local frame and its XZ position is
    /// tested against the polygon; height above the plane is ignored.
    #[must_use]
    pub fn is_pose_in_polygon(&self, pose: &Pose) -> bool {
        if self.polygon.len() < 3 {
            return false;
        }
        let local = self.center_pose.inverse().transform_point(pose.translation);
        let mut path = BezPath::new();
        for (i, [x, z]) in self.polygon.iter().enumerate() {
            let p = Point::new(f64::from(*x), f64::from(*z));
            if i == 0 {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
        }
        path.close_path();
        path.contains(Point::new(f64::from(local[0]), f64::from(local[2])))
    }

    /// Returns whether this plane should be drawn this frame.
    #[inline]
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.tracking_state.is_tracking() && self.subsumed_by.is_none()
    }
}

/// How an oriented point's rotation was determined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrientationMode {
    /// No surface normal could be estimated; rotation is identity.
    InitializedToIdentity,
    /// Rotation aligns local +Y with an estimated surface normal.
    EstimatedSurfaceNormal,
}

/// A feature point the platform exposes as a trackable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedPoint {
    /// Identity within the session.
    pub id: TrackableId,
    /// Pose of the point.
    pub pose: Pose,
    /// How the pose's rotation was obtained.
    pub orientation_mode: OrientationMode,
    /// Tracking state of the point.
    pub tracking_state: TrackingState,
}

/// Selects which trackables [`TrackingSource::all_trackables`] returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackableKind {
    /// Planes only.
    Plane,
    /// Oriented points only.
    Point,
}

/// A detected real-world feature.
#[derive(Clone, Debug, PartialEq)]
pub enum Trackable {
    /// A planar surface.
    Plane(PlaneSurface),
    /// A single oriented feature point.
    Point(OrientedPoint),
}

impl Trackable {
    /// Returns the trackable's identity.
    #[must_use]
    pub fn id(&self) -> TrackableId {
        match self {
            Self::Plane(plane) => plane.id,
            Self::Point(point) => point.id,
        }
    }

    /// Returns the plane payload, if this is a plane.
    #[must_use]
    pub fn as_plane(&self) -> Option<&PlaneSurface> {
        match self {
            Self::Plane(plane) => Some(plane),
            Self::Point(_) => None,
        }
    }
}

/// One intersection between a tap ray and a trackable.
#[derive(Clone, Debug, PartialEq)]
pub struct HitResult {
    /// Distance from the camera along the ray, in meters.
    pub distance: f32,
    /// Pose of the intersection; local +Y is the surface normal.
    pub hit_pose: Pose,
    /// The trackable that was hit.
    pub trackable: Trackable,
}

/// Viewport size and display rotation, forwarded to the tracking source so
/// projection and background UVs match the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DisplayGeometry {
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Display rotation in quarter turns (0–3).
    pub rotation: u8,
}

/// A handle to a platform anchor.
///
/// The platform keeps refining the anchor's pose until the handle is
/// released. `release` consumes the handle, so a released anchor cannot be
/// touched again.
pub trait AnchorHandle {
    /// Current tracking state of the anchor.
    fn tracking_state(&self) -> TrackingState;

    /// Current world pose of the anchor.
    fn pose(&self) -> Pose;

    /// Stops tracking and frees the platform resources behind the handle.
    fn release(self)
    where
        Self: Sized;
}

/// A frame-scoped point cloud owned by the tracking source.
pub trait PointCloud {
    /// The points captured this frame.
    fn points(&self) -> &[FeaturePoint];

    /// Returns the cloud's resources to the platform.
    fn release(self)
    where
        Self: Sized;
}

/// Releases the wrapped [`PointCloud`] exactly once when dropped.
#[derive(Debug)]
pub struct PointCloudGuard<P: PointCloud> {
    cloud: Option<P>,
}

impl<P: PointCloud> PointCloudGuard<P> {
    /// Takes ownership of a freshly acquired cloud.
    #[must_use]
    pub fn new(cloud: P) -> Self {
        Self { cloud: Some(cloud) }
    }

    /// The points captured this frame.
    #[must_use]
    pub fn points(&self) -> &[FeaturePoint] {
        match &self.cloud {
            Some(cloud) => cloud.points(),
            None => &[],
        }
    }

    /// Releases the cloud now instead of at end of scope.
    pub fn release(mut self) {
        if let Some(cloud) = self.cloud.take() {
            cloud.release();
        }
    }
}

impl<P: PointCloud> Drop for PointCloudGuard<P> {
    fn drop(&mut self) {
        if let Some(cloud) = self.cloud.take() {
            cloud.release();
        }
    }
}

/// The AR platform, as seen from the render loop.
///
/// Every method is called from the render-loop thread only.
pub trait TrackingSource {
    /// Anchor handle type this platform hands out.
    type Anchor: AnchorHandle;
    /// Frame-scoped point cloud type.
    type PointCloud: PointCloud;

    /// Starts or restarts camera capture.
    ///
    /// # Errors
    ///
    /// [`TrackingError::CameraUnavailable`] if another client holds the
    /// camera.
    fn resume(&mut self) -> Result<(), TrackingError>;

    /// Stops camera capture; the session state is kept.
    fn pause(&mut self);

    /// Tells the platform which texture to stream the camera image into.
    fn set_camera_texture(&mut self, texture: TextureId) {
        _ = texture;
    }

    /// Forwards a viewport or rotation change.
    fn set_display_geometry(&mut self, geometry: DisplayGeometry) {
        _ = geometry;
    }

    /// Advances to the latest camera frame.
    ///
    /// # Errors
    ///
    /// [`TrackingError::TrackingUnavailable`] when no frame can be produced
    /// this iteration, [`TrackingError::CameraUnavailable`] when the camera
    /// has been taken away.
    fn update(&mut self) -> Result<FrameSnapshot, TrackingError>;

    /// Casts a ray through the screen point `tap` against known trackables.
    ///
    /// Results are sorted by distance, nearest first.
    fn hit_test(&self, tap: Point) -> Vec<HitResult>;

    /// Lists every trackable of the given kind known to the session.
    fn all_trackables(&self, kind: TrackableKind) -> Vec<Trackable>;

    /// Acquires this frame's point cloud.
    ///
    /// # Errors
    ///
    /// Fails if the platform cannot hand out the cloud (for example when too
    /// many clouds are outstanding).
    fn acquire_point_cloud(&mut self) -> Result<Self::PointCloud, TrackingError>;

    /// Creates an anchor at the hit location.
    ///
    /// # Errors
    ///
    /// Fails if the platform refuses to create more anchors.
    fn create_anchor(&mut self, hit: &HitResult) -> Result<Self::Anchor, TrackingError>;
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::test_support::{FakeCloud, Ledger};

    fn square_plane(half: f32) -> PlaneSurface {
        PlaneSurface {
            id: TrackableId(1),
            plane_type: PlaneType::HorizontalUpwardFacing,
            center_pose: Pose::from_translation(0.0, -1.0, 0.0),
            polygon: vec![[-half, -half], [half, -half], [half, half], [-half, half]],
            tracking_state: TrackingState::Tracking,
            subsumed_by: None,
        }
    }

    #[test]
    fn pose_inside_polygon() {
        let plane = square_plane(0.5);
        assert!(plane.is_pose_in_polygon(&Pose::from_translation(0.2, -1.0, -0.3)));
    }

    #[test]
    fn pose_outside_polygon() {
        let plane = square_plane(0.5);
        assert!(!plane.is_pose_in_polygon(&Pose::from_translation(0.8, -1.0, 0.0)));
    }

    #[test]
    fn polygon_test_ignores_height() {
        let plane = square_plane(0.5);
        assert!(plane.is_pose_in_polygon(&Pose::from_translation(0.1, 3.0, 0.1)));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        let mut plane = square_plane(0.5);
        plane.polygon.truncate(2);
        assert!(!plane.is_pose_in_polygon(&Pose::from_translation(0.0, -1.0, 0.0)));
    }

    #[test]
    fn subsumed_plane_is_not_drawable() {
        let mut plane = square_plane(0.5);
        assert!(plane.is_drawable());
        plane.subsumed_by = Some(TrackableId(9));
        assert!(!plane.is_drawable());
        plane.subsumed_by = None;
        plane.tracking_state = TrackingState::Paused;
        assert!(!plane.is_drawable());
    }

    #[test]
    fn guard_releases_once_on_drop() {
        let ledger = Ledger::default();
        {
            let guard = PointCloudGuard::new(FakeCloud::new(&ledger, vec![]));
            assert!(guard.points().is_empty());
        }
        assert_eq!(ledger.clouds_released(), 1);
    }

    #[test]
    fn guard_explicit_release_does_not_double_release() {
        let ledger = Ledger::default();
        let guard = PointCloudGuard::new(FakeCloud::new(&ledger, vec![]));
        guard.release();
        assert_eq!(ledger.clouds_released(), 1);
    }

    #[test]
    fn camera_view_inverts_display_pose() {
        let pose = Pose::from_translation(1.0, 2.0, 3.0);
        let camera = Camera {
            pose,
            display_oriented_pose: pose,
            tracking_state: TrackingState::Tracking,
            intrinsics: CameraIntrinsics {
                focal_length: [500.0, 500.0],
                principal_point: [320.0, 240.0],
                image_size: [640.0, 480.0],
            },
        };
        assert_eq!(
            camera.view_matrix().transform_point([1.0, 2.0, 3.0]),
            [0.0, 0.0, 0.0]
        );
    }
}
