// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fault taxonomy for the frame loop.
//!
//! Every fault is frame-scoped: [`SceneHost`](crate::host::SceneHost) logs it
//! and the next frame starts fresh. Only [`TrackingError::CameraUnavailable`]
//! changes host state, by dropping the tracking source so the next resume
//! re-creates it.

use alloc::string::String;

/// Faults raised by a [`TrackingSource`](crate::tracking::TrackingSource).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TrackingError {
    /// No frame could be produced this iteration.
    #[error("tracking source could not produce a frame")]
    TrackingUnavailable,
    /// The camera was taken by another client or disconnected.
    #[error("camera not available")]
    CameraUnavailable,
    /// Any other platform fault (resource exhaustion, invalid state).
    #[error("tracking source fault: {0}")]
    Source(String),
}

impl TrackingError {
    /// Returns the copyable classification used in trace events.
    #[must_use]
    pub const fn kind(&self) -> FaultKind {
        match self {
            Self::TrackingUnavailable => FaultKind::TrackingUnavailable,
            Self::CameraUnavailable => FaultKind::CameraUnavailable,
            Self::Source(_) => FaultKind::Source,
        }
    }
}

/// Faults raised while a renderer loads its assets.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    /// An asset file could not be read or decoded.
    #[error("failed to read asset `{path}`: {reason}")]
    Read {
        /// Asset path as given to the renderer.
        path: String,
        /// Underlying cause.
        reason: String,
    },
    /// A GPU resource (program, buffer, texture) could not be created.
    #[error("failed to create renderer resource `{name}`")]
    Resource {
        /// Resource name.
        name: String,
    },
}

/// Classification of a frame fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// See [`TrackingError::TrackingUnavailable`].
    TrackingUnavailable,
    /// See [`TrackingError::CameraUnavailable`].
    CameraUnavailable,
    /// See [`TrackingError::Source`].
    Source,
}
