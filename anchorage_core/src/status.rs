// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User-facing status messages and the surface-search latch.

use crate::tracking::{PlaneType, Trackable};

/// A transient message area (snackbar, toast, HUD line).
pub trait StatusSink {
    /// Shows an informational message, replacing any current one.
    fn show_message(&mut self, text: &str);

    /// Shows an error message, replacing any current one.
    fn show_error(&mut self, text: &str);

    /// Hides the current message.
    fn hide(&mut self);

    /// Returns whether a message is currently shown.
    fn is_showing(&self) -> bool;
}

/// Tracks the "searching for surfaces" hint.
///
/// The hint is shown when a session starts and hidden the first time an
/// upward-facing plane is tracked. After that it is never shown or hidden
/// again by this type.
///
/// Only the hint itself is ever hidden. Once another message takes its place
/// (see [`replaced`](Self::replaced)) a tracked plane leaves the sink alone
/// and the hint stays undismissed until [`begin`](Self::begin) shows it
/// again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceSearchStatus {
    dismissed: bool,
    shown: bool,
}

impl SurfaceSearchStatus {
    /// Creates a latch that has not yet seen a surface.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dismissed: false,
            shown: false,
        }
    }

    /// Returns whether the hint has been dismissed.
    #[must_use]
    pub const fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// Returns whether the hint is the message currently on the sink.
    #[must_use]
    pub const fn is_shown(&self) -> bool {
        self.shown
    }

    /// Shows `message` unless a surface has already been found.
    pub fn begin(&mut self, message: &str, sink: &mut dyn StatusSink) {
        if !self.dismissed {
            sink.show_message(message);
            self.shown = true;
        }
    }

    /// Records that another message replaced the hint on the sink.
    pub fn replaced(&mut self) {
        self.shown = false;
    }

    /// Hides the hint once, on the first tracked upward-facing plane.
    ///
    /// Returns `true` on the frame the hint is dismissed.
    pub fn observe(&mut self, planes: &[Trackable], sink: &mut dyn StatusSink) -> bool {
        if self.dismissed || !self.shown || !sink.is_showing() {
            return false;
        }
        let found = planes.iter().filter_map(Trackable::as_plane).any(|plane| {
            plane.plane_type == PlaneType::HorizontalUpwardFacing
                && plane.tracking_state.is_tracking()
        });
        if found {
            log::debug!("upward-facing surface tracked, hiding search hint");
            sink.hide();
            self.dismissed = true;
            self.shown = false;
        }
        found
    }
}
