// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use anchorage_core::error::FaultKind;
use anchorage_core::trace::{
    AnchorEvictedEvent, FrameBeginEvent, FrameFaultEvent, FrameSummary, TapDisposition, TapEvent,
    TraceSink,
};
use anchorage_core::tracking::TrackingState;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_BEGIN: u8 = 1;
const TAG_TAP: u8 = 2;
const TAG_ANCHOR_EVICTED: u8 = 3;
const TAG_FRAME_FAULT: u8 = 4;
const TAG_FRAME_SUMMARY: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_option_u64(&mut self, v: Option<u64>) {
        self.write_bool(v.is_some());
        self.write_u64(v.unwrap_or(0));
    }

    fn write_tracking(&mut self, state: TrackingState) {
        self.write_u8(match state {
            TrackingState::Tracking => 0,
            TrackingState::Paused => 1,
            TrackingState::Stopped => 2,
        });
    }

    fn write_disposition(&mut self, disposition: TapDisposition) {
        self.write_u8(match disposition {
            TapDisposition::NotTracking => 0,
            TapDisposition::NoQualifyingHit => 1,
            TapDisposition::Placed => 2,
            TapDisposition::Failed => 3,
        });
    }

    fn write_fault(&mut self, fault: FaultKind) {
        self.write_u8(match fault {
            FaultKind::TrackingUnavailable => 0,
            FaultKind::CameraUnavailable => 1,
            FaultKind::Source => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.write_u8(TAG_FRAME_BEGIN);
        self.write_u64(e.frame_index);
        self.write_u64(e.timestamp_ns);
        self.write_tracking(e.tracking);
    }

    fn on_tap(&mut self, e: &TapEvent) {
        self.write_u8(TAG_TAP);
        self.write_u64(e.frame_index);
        self.write_f32(e.x);
        self.write_f32(e.y);
        self.write_disposition(e.disposition);
        self.write_option_u64(e.anchor);
    }

    fn on_anchor_evicted(&mut self, e: &AnchorEvictedEvent) {
        self.write_u8(TAG_ANCHOR_EVICTED);
        self.write_u64(e.frame_index);
        self.write_u64(e.evicted);
        self.write_u64(e.replaced_by);
    }

    fn on_frame_fault(&mut self, e: &FrameFaultEvent) {
        self.write_u8(TAG_FRAME_FAULT);
        self.write_u64(e.frame_index);
        self.write_fault(e.fault);
        self.write_bool(e.source_dropped);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u64(s.timestamp_ns);
        self.write_bool(s.tracking);
        self.write_u32(s.points);
        self.write_u32(s.surfaces);
        self.write_u32(s.anchors_drawn);
        self.write_u32(s.anchors_skipped);
        self.write_u32(s.registry_len);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`FrameBeginEvent`].
    FrameBegin(FrameBeginEvent),
    /// A [`TapEvent`].
    Tap(TapEvent),
    /// An [`AnchorEvictedEvent`].
    AnchorEvicted(AnchorEvictedEvent),
    /// A [`FrameFaultEvent`].
    FrameFault(FrameFaultEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
}

impl RecordedEvent {
    /// Frame counter of the event.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        match self {
            Self::FrameBegin(e) => e.frame_index,
            Self::Tap(e) => e.frame_index,
            Self::AnchorEvicted(e) => e.frame_index,
            Self::FrameFault(e) => e.frame_index,
            Self::FrameSummary(s) => s.frame_index,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first truncated record or unknown tag.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|b| b != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_f32(&mut self) -> Option<f32> {
        self.read_u32().map(f32::from_bits)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_option_u64(&mut self) -> Option<Option<u64>> {
        let present = self.read_bool()?;
        let val = self.read_u64()?;
        Some(present.then_some(val))
    }

    fn read_tracking(&mut self) -> Option<TrackingState> {
        Some(match self.read_u8()? {
            0 => TrackingState::Tracking,
            1 => TrackingState::Paused,
            _ => TrackingState::Stopped,
        })
    }

    fn read_disposition(&mut self) -> Option<TapDisposition> {
        Some(match self.read_u8()? {
            0 => TapDisposition::NotTracking,
            1 => TapDisposition::NoQualifyingHit,
            2 => TapDisposition::Placed,
            _ => TapDisposition::Failed,
        })
    }

    fn read_fault(&mut self) -> Option<FaultKind> {
        Some(match self.read_u8()? {
            0 => FaultKind::TrackingUnavailable,
            1 => FaultKind::CameraUnavailable,
            _ => FaultKind::Source,
        })
    }

    fn decode_frame_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameBegin(FrameBeginEvent {
            frame_index: self.read_u64()?,
            timestamp_ns: self.read_u64()?,
            tracking: self.read_tracking()?,
        }))
    }

    fn decode_tap(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Tap(TapEvent {
            frame_index: self.read_u64()?,
            x: self.read_f32()?,
            y: self.read_f32()?,
            disposition: self.read_disposition()?,
            anchor: self.read_option_u64()?,
        }))
    }

    fn decode_anchor_evicted(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::AnchorEvicted(AnchorEvictedEvent {
            frame_index: self.read_u64()?,
            evicted: self.read_u64()?,
            replaced_by: self.read_u64()?,
        }))
    }

    fn decode_frame_fault(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameFault(FrameFaultEvent {
            frame_index: self.read_u64()?,
            fault: self.read_fault()?,
            source_dropped: self.read_bool()?,
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index: self.read_u64()?,
            timestamp_ns: self.read_u64()?,
            tracking: self.read_bool()?,
            points: self.read_u32()?,
            surfaces: self.read_u32()?,
            anchors_drawn: self.read_u32()?,
            anchors_skipped: self.read_u32()?,
            registry_len: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_FRAME_BEGIN => self.decode_frame_begin(),
            TAG_TAP => self.decode_tap(),
            TAG_ANCHOR_EVICTED => self.decode_anchor_evicted(),
            TAG_FRAME_FAULT => self.decode_frame_fault(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
