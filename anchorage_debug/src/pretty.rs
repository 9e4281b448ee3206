// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Camera
//! timestamps are printed in milliseconds.

use std::io::Write;

use anchorage_core::error::FaultKind;
use anchorage_core::trace::{
    AnchorEvictedEvent, FrameBeginEvent, FrameFaultEvent, FrameSummary, TapDisposition, TapEvent,
    TraceSink,
};
use anchorage_core::tracking::TrackingState;

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn ns_to_ms(ns: u64) -> f64 {
    ns as f64 / 1_000_000.0
}

fn tracking_name(state: TrackingState) -> &'static str {
    match state {
        TrackingState::Tracking => "tracking",
        TrackingState::Paused => "paused",
        TrackingState::Stopped => "stopped",
    }
}

fn disposition_name(disposition: TapDisposition) -> &'static str {
    match disposition {
        TapDisposition::NotTracking => "not-tracking",
        TapDisposition::NoQualifyingHit => "no-hit",
        TapDisposition::Placed => "placed",
        TapDisposition::Failed => "FAILED",
    }
}

fn fault_name(fault: FaultKind) -> &'static str {
    match fault {
        FaultKind::TrackingUnavailable => "tracking-unavailable",
        FaultKind::CameraUnavailable => "camera-unavailable",
        FaultKind::Source => "source",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] frame={} at={:.3}ms camera={}",
            e.frame_index,
            ns_to_ms(e.timestamp_ns),
            tracking_name(e.tracking),
        );
    }

    fn on_tap(&mut self, e: &TapEvent) {
        let _ = write!(
            self.writer,
            "[tap] frame={} at=({:.1}, {:.1}) {}",
            e.frame_index,
            e.x,
            e.y,
            disposition_name(e.disposition),
        );
        let _ = match e.anchor {
            Some(anchor) => writeln!(self.writer, " anchor=#{anchor}"),
            None => writeln!(self.writer),
        };
    }

    fn on_anchor_evicted(&mut self, e: &AnchorEvictedEvent) {
        let _ = writeln!(
            self.writer,
            "[evict] frame={} anchor=#{} replaced_by=#{}",
            e.frame_index, e.evicted, e.replaced_by,
        );
    }

    fn on_frame_fault(&mut self, e: &FrameFaultEvent) {
        let dropped = if e.source_dropped { " source dropped" } else { "" };
        let _ = writeln!(
            self.writer,
            "[fault] frame={} {}{dropped}",
            e.frame_index,
            fault_name(e.fault),
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        if !s.tracking {
            let _ = writeln!(
                self.writer,
                "[summary] frame={} background-only anchors={}",
                s.frame_index, s.registry_len,
            );
            return;
        }
        let _ = writeln!(
            self.writer,
            "[summary] frame={} points={} surfaces={} drawn={} skipped={} anchors={}",
            s.frame_index,
            s.points,
            s.surfaces,
            s.anchors_drawn,
            s.anchors_skipped,
            s.registry_len,
        );
    }
}
