// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted AR session that exercises the frame loop end to end.
//!
//! A synthetic tracking source plays back a fixed script: the camera starts
//! out paused, a floor is detected, more taps arrive than the registry can
//! hold, one frame is lost, and finally the camera is taken away and the
//! session is resumed. Events go to both a
//! [`PrettyPrintSink`](anchorage_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](anchorage_debug::recorder::RecorderSink).
//!
//! Pass a path as the first argument to also export a Chrome trace:
//!
//! ```text
//! RUST_LOG=debug cargo run -p scripted_session -- trace.json
//! ```

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;

use anchorage_core::config::SceneConfig;
use anchorage_core::error::{AssetError, TrackingError};
use anchorage_core::host::{FrameOutcome, SceneHost, TapOutcome};
use anchorage_core::input::TapSlot;
use anchorage_core::pose::Pose;
use anchorage_core::render::{ObjectDraw, SceneRenderer};
use anchorage_core::status::StatusSink;
use anchorage_core::trace::{
    AnchorEvictedEvent, FrameBeginEvent, FrameFaultEvent, FrameSummary, TapEvent, TraceSink,
    Tracer,
};
use anchorage_core::tracking::{
    AnchorHandle, Camera, CameraIntrinsics, DisplayGeometry, FeaturePoint, FrameSnapshot,
    HitResult, LightEstimate, PlaneSurface, PlaneType, PointCloud, TextureId, Trackable,
    TrackableId, TrackableKind, TrackingSource, TrackingState,
};
use anchorage_core::transform::Transform3d;
use kurbo::Point;

use anchorage_debug::pretty::PrettyPrintSink;
use anchorage_debug::recorder::RecorderSink;

const FRAME_COUNT: u64 = 42;
/// 30 Hz camera.
const FRAME_INTERVAL_NS: u64 = 33_333_333;
const VIEWPORT: (u32, u32) = (1080, 1920);

/// Camera paused until this frame.
const FIRST_TRACKING_FRAME: u64 = 3;
/// The floor shows up here and dismisses the search hint.
const FLOOR_DETECTED_FRAME: u64 = 5;
/// `update` fails with no frame available.
const DROPPED_FRAME: u64 = 31;
/// Another client grabs the camera.
const CAMERA_LOST_FRAME: u64 = 34;
/// The app comes back to the foreground.
const RESUME_FRAME: u64 = 36;

/// Frames on which the user taps the screen.
fn tap_for_frame(frame: u64) -> Option<Point> {
    let tapped = frame == 1 || (6..=28).contains(&frame) || frame == 38;
    tapped.then(|| {
        let column = (frame % 5) as f64;
        let row = (frame % 3) as f64;
        Point::new(140.0 + column * 200.0, 900.0 + row * 250.0)
    })
}

// -- tracking source ------------------------------------------------------

#[derive(Debug)]
struct DemoAnchor {
    pose: Pose,
}

impl AnchorHandle for DemoAnchor {
    fn tracking_state(&self) -> TrackingState {
        TrackingState::Tracking
    }

    fn pose(&self) -> Pose {
        self.pose
    }

    fn release(self) {
        log::debug!("anchor at {:?} released", self.pose.translation);
    }
}

#[derive(Debug)]
struct DemoCloud {
    points: Vec<FeaturePoint>,
}

impl PointCloud for DemoCloud {
    fn points(&self) -> &[FeaturePoint] {
        &self.points
    }

    fn release(self) {
        log::trace!("point cloud of {} points released", self.points.len());
    }
}

/// Plays back the session script, one step per `update`.
#[derive(Debug)]
struct ScriptedSource {
    frame: u64,
    running: bool,
    texture: TextureId,
    geometry: Option<DisplayGeometry>,
}

impl ScriptedSource {
    fn new(first_frame: u64) -> Self {
        Self {
            frame: first_frame,
            running: false,
            texture: TextureId::default(),
            geometry: None,
        }
    }

    /// Frame number of the most recent `update`.
    fn current(&self) -> u64 {
        self.frame.saturating_sub(1)
    }

    fn floor(&self) -> PlaneSurface {
        PlaneSurface {
            id: TrackableId(1),
            plane_type: PlaneType::HorizontalUpwardFacing,
            center_pose: Pose::from_translation(0.0, -1.2, -1.5),
            polygon: vec![[-2.0, -2.0], [2.0, -2.0], [2.0, 2.0], [-2.0, 2.0]],
            tracking_state: TrackingState::Tracking,
            subsumed_by: None,
        }
    }

    fn camera(&self, tracking_state: TrackingState) -> Camera {
        let pose = Pose::from_translation(0.0, 0.0, 0.0);
        let (width, height) = match self.geometry {
            Some(g) => (g.width, g.height),
            None => VIEWPORT,
        };
        Camera {
            pose,
            display_oriented_pose: pose,
            tracking_state,
            intrinsics: CameraIntrinsics {
                focal_length: [1450.0, 1450.0],
                principal_point: [width as f32 / 2.0, height as f32 / 2.0],
                image_size: [width as f32, height as f32],
            },
        }
    }
}

impl TrackingSource for ScriptedSource {
    type Anchor = DemoAnchor;
    type PointCloud = DemoCloud;

    fn resume(&mut self) -> Result<(), TrackingError> {
        self.running = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.running = false;
    }

    fn set_camera_texture(&mut self, texture: TextureId) {
        self.texture = texture;
    }

    fn set_display_geometry(&mut self, geometry: DisplayGeometry) {
        log::debug!("display geometry {geometry:?}");
        self.geometry = Some(geometry);
    }

    fn update(&mut self) -> Result<FrameSnapshot, TrackingError> {
        let frame = self.frame;
        self.frame += 1;
        if !self.running {
            return Err(TrackingError::Source("session is paused".into()));
        }
        match frame {
            DROPPED_FRAME => return Err(TrackingError::TrackingUnavailable),
            CAMERA_LOST_FRAME => return Err(TrackingError::CameraUnavailable),
            _ => {}
        }
        let tracking = if frame < FIRST_TRACKING_FRAME {
            TrackingState::Paused
        } else {
            TrackingState::Tracking
        };
        Ok(FrameSnapshot {
            timestamp_ns: 1_000_000_000 + frame * FRAME_INTERVAL_NS,
            camera: self.camera(tracking),
            light_estimate: LightEstimate {
                color_correction: [0.95, 1.0, 1.05, 0.6],
            },
            camera_texture: self.texture,
        })
    }

    fn hit_test(&self, tap: Point) -> Vec<HitResult> {
        if self.current() < FLOOR_DETECTED_FRAME {
            return Vec::new();
        }
        let (width, height) = match self.geometry {
            Some(g) => (f64::from(g.width), f64::from(g.height)),
            None => (f64::from(VIEWPORT.0), f64::from(VIEWPORT.1)),
        };
        let (x, z) = floor_offset(tap, width, height);
        let floor = self.floor();
        let hit_pose = Pose::from_translation(
            floor.center_pose.translation[0] + x,
            floor.center_pose.translation[1],
            floor.center_pose.translation[2] + z,
        );
        vec![HitResult {
            distance: hit_pose.translation.iter().map(|c| c * c).sum::<f32>().sqrt(),
            hit_pose,
            trackable: Trackable::Plane(floor),
        }]
    }

    fn all_trackables(&self, kind: TrackableKind) -> Vec<Trackable> {
        match kind {
            TrackableKind::Plane if self.current() >= FLOOR_DETECTED_FRAME => {
                vec![Trackable::Plane(self.floor())]
            }
            _ => Vec::new(),
        }
    }

    fn acquire_point_cloud(&mut self) -> Result<DemoCloud, TrackingError> {
        let points = (0..12_u8)
            .map(|i| FeaturePoint {
                position: [f32::from(i) * 0.1 - 0.6, -1.2, -1.5],
                confidence: 0.8,
            })
            .collect();
        Ok(DemoCloud { points })
    }

    fn create_anchor(&mut self, hit: &HitResult) -> Result<DemoAnchor, TrackingError> {
        Ok(DemoAnchor {
            pose: hit.hit_pose,
        })
    }
}

/// Maps a screen tap onto the floor's local XZ plane, one meter per half
/// screen.
#[expect(
    clippy::cast_possible_truncation,
    reason = "floor offsets are a few meters at most"
)]
fn floor_offset(tap: Point, width: f64, height: f64) -> (f32, f32) {
    let x = (tap.x / width - 0.5) * 2.0;
    let z = (tap.y / height - 0.5) * 2.0;
    (x as f32, z as f32)
}

// -- renderer and status --------------------------------------------------

/// Counts draw calls and logs them instead of rasterizing.
#[derive(Debug, Default)]
struct LogRenderer {
    draws: usize,
}

impl SceneRenderer for LogRenderer {
    fn create_resources(&mut self) -> Result<(), AssetError> {
        log::info!("renderer resources created");
        Ok(())
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        log::info!("viewport {width}x{height}");
    }

    fn background_texture(&self) -> TextureId {
        TextureId(1)
    }

    fn clear(&mut self) {}

    fn draw_background(&mut self, texture: TextureId, timestamp_ns: u64) {
        log::trace!("background {texture:?} at {timestamp_ns}");
        self.draws += 1;
    }

    fn draw_point_cloud(&mut self, points: &[FeaturePoint], _: &Transform3d, _: &Transform3d) {
        log::trace!("{} feature points", points.len());
        self.draws += 1;
    }

    fn draw_surfaces(&mut self, surfaces: &[PlaneSurface], _: &Pose, _: &Transform3d) {
        log::trace!("{} surfaces", surfaces.len());
        self.draws += 1;
    }

    fn draw_object(&mut self, draw: &ObjectDraw) {
        // A GPU renderer would upload these as the model uniform.
        let model = draw.model.to_cols_array();
        log::trace!(
            "{:?} pass for {:?} at {:?}",
            draw.pass,
            draw.anchor,
            &model[12..15]
        );
        self.draws += 1;
    }
}

/// Prints status changes to stdout.
#[derive(Debug, Default)]
struct ConsoleStatus {
    showing: bool,
}

impl StatusSink for ConsoleStatus {
    fn show_message(&mut self, text: &str) {
        println!("status: {text}");
        self.showing = true;
    }

    fn show_error(&mut self, text: &str) {
        println!("status (error): {text}");
        self.showing = true;
    }

    fn hide(&mut self) {
        println!("status: hidden");
        self.showing = false;
    }

    fn is_showing(&self) -> bool {
        self.showing
    }
}

// -- trace fan-out --------------------------------------------------------

/// Forwards every event to the pretty printer and the recorder.
#[derive(Debug)]
struct Fanout {
    pretty: PrettyPrintSink,
    recorder: RecorderSink,
}

impl TraceSink for Fanout {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.pretty.on_frame_begin(e);
        self.recorder.on_frame_begin(e);
    }

    fn on_tap(&mut self, e: &TapEvent) {
        self.pretty.on_tap(e);
        self.recorder.on_tap(e);
    }

    fn on_anchor_evicted(&mut self, e: &AnchorEvictedEvent) {
        self.pretty.on_anchor_evicted(e);
        self.recorder.on_anchor_evicted(e);
    }

    fn on_frame_fault(&mut self, e: &FrameFaultEvent) {
        self.pretty.on_frame_fault(e);
        self.recorder.on_frame_fault(e);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.pretty.on_frame_summary(s);
        self.recorder.on_frame_summary(s);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();
    let trace_path = std::env::args().nth(1);

    let mut sinks = Fanout {
        pretty: PrettyPrintSink::new(Box::new(std::io::stdout())),
        recorder: RecorderSink::new(),
    };
    let mut renderer = LogRenderer::default();
    let mut status = ConsoleStatus::default();
    let taps = TapSlot::new();

    let mut host = SceneHost::<ScriptedSource>::new(SceneConfig::reference());
    host.surface_created(&mut renderer);
    host.surface_changed(&mut renderer, VIEWPORT.0, VIEWPORT.1, 0);
    host.resume(|| Ok(ScriptedSource::new(0)), &mut status)?;

    let mut placed = 0_usize;
    let mut evicted = 0_usize;
    let mut faults = 0_usize;
    {
        let mut tracer = Tracer::new(&mut sinks);
        for frame in 0..FRAME_COUNT {
            if frame == RESUME_FRAME {
                let first = host.frame_index();
                host.resume(|| Ok(ScriptedSource::new(first)), &mut status)?;
            }
            if let Some(tap) = tap_for_frame(frame) {
                taps.offer(tap);
            }

            match host.draw_frame(&taps, &mut renderer, &mut status, &mut tracer) {
                FrameOutcome::Composed(report) => {
                    if let Some(TapOutcome::Placed { evicted: gone, .. }) = report.tap {
                        placed += 1;
                        evicted += usize::from(gone.is_some());
                    }
                }
                FrameOutcome::Faulted(err) => {
                    log::info!("frame {frame} faulted: {err}");
                    faults += 1;
                }
                FrameOutcome::NoSession => log::info!("frame {frame}: no session"),
            }
        }
    }
    host.pause();

    println!(
        "{FRAME_COUNT} frames: {placed} anchors placed, {evicted} evicted, {faults} faults, \
         {} registered, {} draw calls",
        host.registry().len(),
        renderer.draws,
    );

    if let Some(path) = trace_path {
        let mut writer = BufWriter::new(File::create(&path)?);
        anchorage_debug::chrome::export(sinks.recorder.as_bytes(), &mut writer)?;
        println!("Wrote {path}");
    }
    Ok(())
}
