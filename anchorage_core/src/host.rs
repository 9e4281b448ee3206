// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame routine and session lifecycle.
//!
//! [`SceneHost`] owns the anchor registry, the placement policy, the
//! composer and the reusable [`ScenePlan`]. Platform glue forwards its
//! lifecycle callbacks:
//!
//! | Callback              | Host method                              |
//! |-----------------------|------------------------------------------|
//! | activity resume       | [`resume`](SceneHost::resume)            |
//! | activity pause        | [`pause`](SceneHost::pause)              |
//! | surface created       | [`surface_created`](SceneHost::surface_created) |
//! | surface changed       | [`surface_changed`](SceneHost::surface_changed) |
//! | draw frame            | [`draw_frame`](SceneHost::draw_frame)    |
//!
//! No fault escapes [`draw_frame`](SceneHost::draw_frame). A lost camera
//! drops the tracking source, and with it every anchor, so the next
//! `resume` starts a fresh session; any other fault only costs the current
//! frame.

use alloc::string::ToString;
use core::fmt;

use kurbo::Point;

use crate::anchor::{AnchorId, AnchorRegistry};
use crate::compose::{CompositionReport, SceneComposer};
use crate::config::SceneConfig;
use crate::error::TrackingError;
use crate::input::TapSource;
use crate::placement::PlacementPolicy;
use crate::render::{SceneRenderer, ScenePlan};
use crate::status::{StatusSink, SurfaceSearchStatus};
use crate::trace::{
    AnchorEvictedEvent, FrameBeginEvent, FrameFaultEvent, FrameSummary, TapDisposition, TapEvent,
    Tracer,
};
use crate::tracking::{AnchorHandle, DisplayGeometry, FrameSnapshot, TrackingSource};

/// What happened to the tap polled this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapOutcome {
    /// The camera was not tracking; the tap was consumed and dropped.
    NotTracking,
    /// No hit-test result qualified.
    NoQualifyingHit,
    /// An anchor was placed.
    Placed {
        /// The new anchor.
        anchor: AnchorId,
        /// The anchor evicted to make room, if the registry was full.
        evicted: Option<AnchorId>,
        /// Rank of the accepted hit among the hit-test results.
        rank: usize,
    },
}

/// Summary of a successfully composed frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// Host frame counter.
    pub frame_index: u64,
    /// Camera image timestamp, in nanoseconds.
    pub timestamp_ns: u64,
    /// Outcome of this frame's tap, if one was pending.
    pub tap: Option<TapOutcome>,
    /// What the composer planned.
    pub composition: CompositionReport,
}

/// Result of [`SceneHost::draw_frame`].
#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    /// No tracking source; only the clear was issued.
    NoSession,
    /// The frame stopped early. Anything planned before the fault was still
    /// submitted.
    Faulted(TrackingError),
    /// The frame was composed and submitted.
    Composed(FrameReport),
}

/// Per-session state that outlives single frames.
struct Stage<A: AnchorHandle> {
    registry: AnchorRegistry<A>,
    policy: PlacementPolicy,
    composer: SceneComposer,
    plan: ScenePlan,
}

impl<A: AnchorHandle> Stage<A> {
    fn run<S: TrackingSource<Anchor = A>>(
        &mut self,
        source: &mut S,
        frame_index: u64,
        taps: &dyn TapSource,
        status: &mut dyn StatusSink,
        tracer: &mut Tracer<'_>,
    ) -> Result<FrameReport, TrackingError> {
        let snapshot = source.update()?;
        tracer.frame_begin(&FrameBeginEvent {
            frame_index,
            timestamp_ns: snapshot.timestamp_ns,
            tracking: snapshot.camera.tracking_state,
        });

        let tap = match taps.poll_tap() {
            Some(tap) => Some(self.handle_tap(tap, &snapshot, source, frame_index, tracer)?),
            None => None,
        };

        let composition =
            self.composer
                .compose(&snapshot, source, &self.registry, status, &mut self.plan)?;
        Ok(FrameReport {
            frame_index,
            timestamp_ns: snapshot.timestamp_ns,
            tap,
            composition,
        })
    }

    fn handle_tap<S: TrackingSource<Anchor = A>>(
        &mut self,
        tap: Point,
        snapshot: &FrameSnapshot,
        source: &mut S,
        frame_index: u64,
        tracer: &mut Tracer<'_>,
    ) -> Result<TapOutcome, TrackingError> {
        let camera = &snapshot.camera;
        let Some(placement) = self
            .policy
            .consider_tap(tap, camera, |point| source.hit_test(point))
        else {
            let (outcome, disposition) = if camera.tracking_state.is_tracking() {
                (TapOutcome::NoQualifyingHit, TapDisposition::NoQualifyingHit)
            } else {
                (TapOutcome::NotTracking, TapDisposition::NotTracking)
            };
            tracer.tap(&TapEvent::new(frame_index, tap, disposition, None));
            return Ok(outcome);
        };

        let admission = match self.policy.place(&placement, source, &mut self.registry) {
            Ok(admission) => admission,
            Err(err) => {
                tracer.tap(&TapEvent::new(frame_index, tap, TapDisposition::Failed, None));
                return Err(err);
            }
        };
        tracer.tap(&TapEvent::new(
            frame_index,
            tap,
            TapDisposition::Placed,
            Some(admission.id.sequence()),
        ));
        if let Some(evicted) = admission.evicted {
            tracer.anchor_evicted(&AnchorEvictedEvent {
                frame_index,
                evicted: evicted.sequence(),
                replaced_by: admission.id.sequence(),
            });
        }
        Ok(TapOutcome::Placed {
            anchor: admission.id,
            evicted: admission.evicted,
            rank: placement.rank,
        })
    }
}

/// Drives one AR overlay: session lifecycle plus the per-frame routine.
///
/// All methods must be called from the render-loop thread, except that
/// [`resume`](Self::resume) and [`pause`](Self::pause) may come from the UI
/// thread as long as they do not overlap a frame.
pub struct SceneHost<S: TrackingSource> {
    config: SceneConfig,
    // Declared before `source` so anchors are released while the session
    // still exists.
    stage: Stage<S::Anchor>,
    source: Option<S>,
    geometry: Option<DisplayGeometry>,
    geometry_pending: bool,
    frame_index: u64,
}

impl<S: TrackingSource> fmt::Debug for SceneHost<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneHost")
            .field("has_source", &self.source.is_some())
            .field("registry", &self.stage.registry)
            .field("frame_index", &self.frame_index)
            .field("geometry", &self.geometry)
            .finish_non_exhaustive()
    }
}

impl<S: TrackingSource> SceneHost<S> {
    /// Creates a host with no tracking source.
    ///
    /// # Panics
    ///
    /// Panics if `config.anchor_capacity` is zero.
    #[must_use]
    pub fn new(config: SceneConfig) -> Self {
        Self {
            stage: Stage {
                registry: AnchorRegistry::new(config.anchor_capacity),
                policy: PlacementPolicy::from_config(&config),
                composer: SceneComposer::from_config(&config),
                plan: ScenePlan::new(),
            },
            config,
            source: None,
            geometry: None,
            geometry_pending: false,
            frame_index: 0,
        }
    }

    /// The configuration this host was built with.
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The placed anchors.
    #[must_use]
    pub fn registry(&self) -> &AnchorRegistry<S::Anchor> {
        &self.stage.registry
    }

    /// Whether a tracking source is currently installed.
    #[must_use]
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// The installed tracking source, if any.
    pub fn source_mut(&mut self) -> Option<&mut S> {
        self.source.as_mut()
    }

    /// The surface-search hint latch.
    #[must_use]
    pub fn search_status(&self) -> &SurfaceSearchStatus {
        self.stage.composer.search_status()
    }

    /// Index the next [`draw_frame`](Self::draw_frame) call will use.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Starts or restarts the session.
    ///
    /// Creates the tracking source with `init` if none is installed, then
    /// resumes it and shows the surface-search hint.
    ///
    /// # Errors
    ///
    /// Returns the error from `init` or from [`TrackingSource::resume`]
    /// after showing it on `status`. A lost camera also drops the source.
    pub fn resume(
        &mut self,
        init: impl FnOnce() -> Result<S, TrackingError>,
        status: &mut dyn StatusSink,
    ) -> Result<(), TrackingError> {
        let source = match self.source.take() {
            Some(source) => source,
            None => match init() {
                Ok(source) => {
                    log::debug!("tracking source created");
                    source
                }
                Err(err) => {
                    log::error!("failed to create tracking source: {err}");
                    self.show_fault(&err, status);
                    return Err(err);
                }
            },
        };

        if let Err(err) = self.source.insert(source).resume() {
            log::error!("failed to resume tracking source: {err}");
            self.show_fault(&err, status);
            if err == TrackingError::CameraUnavailable {
                self.drop_source();
            }
            return Err(err);
        }

        self.geometry_pending = self.geometry.is_some();
        log::debug!("session resumed at frame {}", self.frame_index);
        self.stage
            .composer
            .search_status_mut()
            .begin(self.config.searching_message, status);
        Ok(())
    }

    /// Pauses the tracking source, keeping the session and its anchors.
    pub fn pause(&mut self) {
        if let Some(source) = &mut self.source {
            source.pause();
            log::debug!("session paused at frame {}", self.frame_index);
        }
    }

    /// Lets the renderer load its assets once the drawing surface exists.
    ///
    /// Asset failures are logged; the overlay keeps running without them.
    pub fn surface_created(&mut self, renderer: &mut dyn SceneRenderer) {
        if let Err(err) = renderer.create_resources() {
            log::error!("failed to read an asset file: {err}");
        }
    }

    /// Applies a new viewport size and display rotation.
    ///
    /// The renderer viewport changes immediately; the tracking source is
    /// told on the next frame.
    pub fn surface_changed(
        &mut self,
        renderer: &mut dyn SceneRenderer,
        width: u32,
        height: u32,
        rotation: u8,
    ) {
        renderer.set_viewport(width, height);
        self.geometry = Some(DisplayGeometry {
            width,
            height,
            rotation: rotation % 4,
        });
        self.geometry_pending = true;
    }

    /// Runs one frame: clear, update, at most one tap, compose, submit.
    ///
    /// Never fails. Faults are logged, traced and returned as
    /// [`FrameOutcome::Faulted`].
    pub fn draw_frame(
        &mut self,
        taps: &dyn TapSource,
        renderer: &mut dyn SceneRenderer,
        status: &mut dyn StatusSink,
        tracer: &mut Tracer<'_>,
    ) -> FrameOutcome {
        renderer.clear();
        let frame_index = self.frame_index;
        self.frame_index += 1;

        let Some(source) = &mut self.source else {
            log::trace!("frame {frame_index}: no tracking source");
            return FrameOutcome::NoSession;
        };
        if self.geometry_pending {
            if let Some(geometry) = self.geometry {
                source.set_display_geometry(geometry);
            }
            self.geometry_pending = false;
        }
        source.set_camera_texture(renderer.background_texture());

        self.stage.plan.clear();
        let result = self.stage.run(source, frame_index, taps, status, tracer);
        self.stage.plan.submit(renderer);

        match result {
            Ok(report) => {
                tracer.frame_summary(&FrameSummary::new(
                    frame_index,
                    report.timestamp_ns,
                    &report.composition,
                    self.stage.registry.len(),
                ));
                FrameOutcome::Composed(report)
            }
            Err(err) => {
                let source_dropped = err == TrackingError::CameraUnavailable;
                match &err {
                    TrackingError::TrackingUnavailable => {
                        log::warn!("frame {frame_index} skipped: {err}");
                    }
                    TrackingError::CameraUnavailable => {
                        log::error!("frame {frame_index}: {err}, dropping tracking source");
                        self.drop_source();
                    }
                    TrackingError::Source(_) => {
                        log::error!("exception on the frame {frame_index} routine: {err}");
                    }
                }
                tracer.frame_fault(&FrameFaultEvent {
                    frame_index,
                    fault: err.kind(),
                    source_dropped,
                });
                FrameOutcome::Faulted(err)
            }
        }
    }

    fn show_fault(&mut self, err: &TrackingError, status: &mut dyn StatusSink) {
        self.stage.composer.search_status_mut().replaced();
        match err {
            TrackingError::CameraUnavailable => {
                status.show_error(self.config.camera_unavailable_message);
            }
            other => status.show_error(&other.to_string()),
        }
    }

    fn drop_source(&mut self) {
        let released = self.stage.registry.len();
        self.stage.registry.clear();
        self.source = None;
        log::debug!("tracking source dropped, released {released} anchors");
    }
}
