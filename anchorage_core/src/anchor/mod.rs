// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placed anchors and their bounded registry.
//!
//! An *anchor* is a user-placed point in world space that the tracking
//! platform keeps refining. Each entry has:
//!
//! - An identity ([`AnchorId`]) — assigned by the registry in placement
//!   order; only used for diagnostics and explicit removal.
//! - A platform handle ([`AnchorHandle`](crate::tracking::AnchorHandle)) —
//!   valid until released; released exactly once, either by eviction,
//!   explicit removal, or when the registry is cleared or dropped.
//! - A display color.
//!
//! The world transform is never stored. It is derived from the handle's pose
//! every frame, since the platform refines it on every update.
//!
//! # Eviction
//!
//! The registry holds at most `capacity` anchors in insertion order. Adding
//! to a full registry first evicts the single oldest anchor. Anchors that
//! lose tracking are kept; the composer skips them.

mod id;
mod registry;

pub use id::AnchorId;
pub use registry::{Admission, AnchorRegistry, PlacedAnchor};
