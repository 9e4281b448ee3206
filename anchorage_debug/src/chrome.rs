// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Only frame begins and summaries carry a camera timestamp; taps,
//! evictions and faults are stamped with the timestamp of the frame they
//! occurred in.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Registry size is also emitted as a counter track.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut frame_ts = 0.0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::FrameBegin(e) => {
                frame_ts = ns_to_us(e.timestamp_ns);
                events.push(json!({
                    "ph": "i",
                    "name": "FrameBegin",
                    "cat": "Frame",
                    "ts": frame_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "camera": format!("{:?}", e.tracking),
                    }
                }));
            }
            RecordedEvent::Tap(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Tap",
                    "cat": "Input",
                    "ts": frame_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "x": e.x,
                        "y": e.y,
                        "disposition": format!("{:?}", e.disposition),
                        "anchor": e.anchor,
                    }
                }));
            }
            RecordedEvent::AnchorEvicted(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "AnchorEvicted",
                    "cat": "Anchors",
                    "ts": frame_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "frame_index": e.frame_index,
                        "evicted": e.evicted,
                        "replaced_by": e.replaced_by,
                    }
                }));
            }
            RecordedEvent::FrameFault(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameFault",
                    "cat": "Fault",
                    "ts": frame_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "fault": format!("{:?}", e.fault),
                        "source_dropped": e.source_dropped,
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                frame_ts = ns_to_us(s.timestamp_ns);
                events.push(json!({
                    "ph": "i",
                    "name": "FrameSummary",
                    "cat": "Summary",
                    "ts": frame_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": s.frame_index,
                        "tracking": s.tracking,
                        "points": s.points,
                        "surfaces": s.surfaces,
                        "anchors_drawn": s.anchors_drawn,
                        "anchors_skipped": s.anchors_skipped,
                    }
                }));
                events.push(json!({
                    "ph": "C",
                    "name": "Anchors",
                    "ts": frame_ts,
                    "pid": 0,
                    "args": {
                        "registered": s.registry_len,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ns_to_us(ns: u64) -> f64 {
    ns as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use anchorage_core::error::FaultKind;
    use anchorage_core::trace::{
        FrameBeginEvent, FrameFaultEvent, FrameSummary, TapDisposition, TapEvent, TraceSink,
    };
    use anchorage_core::tracking::TrackingState;

    fn export_to_values(rec: &RecorderSink) -> Vec<Value> {
        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        serde_json::from_str(&json_str).unwrap()
    }

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 0,
            timestamp_ns: 2_000_000,
            tracking: TrackingState::Tracking,
        });
        rec.on_tap(&TapEvent {
            frame_index: 0,
            x: 10.0,
            y: 20.0,
            disposition: TapDisposition::Placed,
            anchor: Some(0),
        });
        rec.on_frame_summary(&FrameSummary {
            frame_index: 0,
            timestamp_ns: 2_000_000,
            tracking: true,
            points: 4,
            surfaces: 1,
            anchors_drawn: 1,
            anchors_skipped: 0,
            registry_len: 1,
        });

        let parsed = export_to_values(&rec);
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "FrameBegin");
        assert_eq!(parsed[0]["ts"], 2000.0);

        // Taps inherit the frame's timestamp.
        assert_eq!(parsed[1]["name"], "Tap");
        assert_eq!(parsed[1]["ts"], 2000.0);
        assert_eq!(parsed[1]["args"]["disposition"], "Placed");

        assert_eq!(parsed[2]["name"], "FrameSummary");
        assert_eq!(parsed[3]["ph"], "C");
        assert_eq!(parsed[3]["args"]["registered"], 1);
    }

    #[test]
    fn fault_is_a_global_instant() {
        let mut rec = RecorderSink::new();
        rec.on_frame_fault(&FrameFaultEvent {
            frame_index: 3,
            fault: FaultKind::TrackingUnavailable,
            source_dropped: false,
        });
        let parsed = export_to_values(&rec);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["s"], "g");
        assert_eq!(parsed[0]["args"]["fault"], "TrackingUnavailable");
    }

    #[test]
    fn export_empty_recording() {
        let parsed = export_to_values(&RecorderSink::new());
        assert!(parsed.is_empty());
    }
}
