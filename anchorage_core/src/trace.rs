// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the frame loop.
//!
//! [`SceneHost::draw_frame`](crate::host::SceneHost::draw_frame) reports
//! what happened in each frame through a [`TraceSink`]. All sink methods
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Events carry plain numbers (anchor sequence numbers, saturated `u32`
//! counts) so recorders can store them without access to the registry.

use kurbo::Point;

use crate::compose::CompositionReport;
use crate::error::FaultKind;
use crate::tracking::TrackingState;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after the tracking source produced this frame's snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter of the host.
    pub frame_index: u64,
    /// Camera image timestamp, in nanoseconds.
    pub timestamp_ns: u64,
    /// Camera tracking state for the frame.
    pub tracking: TrackingState,
}

/// What became of a polled tap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TapDisposition {
    /// Camera was not tracking; no hit test ran.
    NotTracking,
    /// No hit qualified for placement.
    NoQualifyingHit,
    /// An anchor was created.
    Placed,
    /// A hit qualified but the source refused to create the anchor.
    Failed,
}

/// Emitted once for every tap the host polled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TapEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Tap position in screen pixels.
    pub x: f32,
    /// Tap position in screen pixels.
    pub y: f32,
    /// Outcome of the tap.
    pub disposition: TapDisposition,
    /// Sequence number of the created anchor, if any.
    pub anchor: Option<u64>,
}

impl TapEvent {
    /// Creates a tap event from the polled screen position.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "screen coordinates arrive as f32 pixels and are stored that way"
    )]
    #[must_use]
    pub fn new(
        frame_index: u64,
        tap: Point,
        disposition: TapDisposition,
        anchor: Option<u64>,
    ) -> Self {
        Self {
            frame_index,
            x: tap.x as f32,
            y: tap.y as f32,
            disposition,
            anchor,
        }
    }
}

/// Emitted when a placement pushed the oldest anchor out of the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnchorEvictedEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Sequence number of the released anchor.
    pub evicted: u64,
    /// Sequence number of the anchor that took its place.
    pub replaced_by: u64,
}

/// Emitted when a frame stopped early because of a fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameFaultEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which fault occurred.
    pub fault: FaultKind,
    /// Whether the host dropped its tracking source in response.
    pub source_dropped: bool,
}

/// Per-frame totals, emitted after the plan was submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Camera image timestamp, in nanoseconds.
    pub timestamp_ns: u64,
    /// Whether the camera was tracking (otherwise background only).
    pub tracking: bool,
    /// Feature points drawn.
    pub points: u32,
    /// Surfaces drawn.
    pub surfaces: u32,
    /// Anchors drawn.
    pub anchors_drawn: u32,
    /// Registered anchors not drawn because they were not tracking.
    pub anchors_skipped: u32,
    /// Registry size after this frame's placement.
    pub registry_len: u32,
}

impl FrameSummary {
    /// Builds a summary from a composition report.
    #[must_use]
    pub fn new(
        frame_index: u64,
        timestamp_ns: u64,
        report: &CompositionReport,
        registry_len: usize,
    ) -> Self {
        Self {
            frame_index,
            timestamp_ns,
            tracking: report.tracking,
            points: saturate(report.points),
            surfaces: saturate(report.surfaces),
            anchors_drawn: saturate(report.anchors_drawn),
            anchors_skipped: saturate(report.anchors_skipped),
            registry_len: saturate(registry_len),
        }
    }
}

fn saturate(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame loop.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called once the frame's snapshot is available.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called for every polled tap.
    fn on_tap(&mut self, e: &TapEvent) {
        _ = e;
    }

    /// Called when a placement evicted the oldest anchor.
    fn on_anchor_evicted(&mut self, e: &AnchorEvictedEvent) {
        _ = e;
    }

    /// Called when a frame faulted.
    fn on_frame_fault(&mut self, e: &FrameFaultEvent) {
        _ = e;
    }

    /// Called with the per-frame totals.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// Without the `trace` feature every method is empty and the sink is never
/// touched.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TapEvent`].
    #[inline]
    pub fn tap(&mut self, e: &TapEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_tap(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`AnchorEvictedEvent`].
    #[inline]
    pub fn anchor_evicted(&mut self, e: &AnchorEvictedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_anchor_evicted(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameFaultEvent`].
    #[inline]
    pub fn frame_fault(&mut self, e: &FrameFaultEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_fault(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
