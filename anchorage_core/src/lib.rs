// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded anchor registry, tap placement and frame-synchronized scene
//! composition for augmented-reality overlays.
//!
//! `anchorage_core` owns the small amount of state an AR overlay keeps on its
//! own side of the platform boundary: the anchors the user placed, the rule
//! deciding which tap becomes an anchor, and the order in which a frame is
//! drawn. Pose tracking, plane detection, hit testing and rasterization all
//! live behind traits. It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! One render-loop thread drives every frame:
//!
//! ```text
//!   TapSlot (input thread) ──► poll_tap()
//!                                  │
//!   TrackingSource::update() ──► FrameSnapshot
//!                                  │
//!                                  ▼
//!            PlacementPolicy::consider_tap() ──► AnchorRegistry::add_with()
//!                                  │
//!                                  ▼
//!            SceneComposer::compose() ──► ScenePlan ──► SceneRenderer
//! ```
//!
//! **[`tracking`]** — Snapshot, trackable and hit-test types plus the
//! [`TrackingSource`](tracking::TrackingSource) and
//! [`AnchorHandle`](tracking::AnchorHandle) traits platform glue implements.
//!
//! **[`anchor`]** — Insertion-ordered registry with a fixed capacity and
//! oldest-first eviction. Evicted handles are released before the
//! replacement is acquired.
//!
//! **[`placement`]** — Accept/reject rules for hit-test results; the nearest
//! qualifying hit wins.
//!
//! **[`compose`]** — Per-frame draw ordering with a hard short-circuit to
//! background-only when the camera is not tracking.
//!
//! **[`render`]** — [`ScenePlan`](render::ScenePlan) and the
//! [`SceneRenderer`](render::SceneRenderer) trait it is submitted to.
//!
//! **[`host`]** — [`SceneHost`](host::SceneHost), the frame routine that
//! catches every per-frame fault, plus session resume and pause.
//!
//! **[`input`]** / **[`status`]** — Single-slot tap handoff and the
//! surface-search status latch.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod anchor;
pub mod compose;
pub mod config;
pub mod error;
pub mod host;
pub mod input;
pub mod placement;
pub mod pose;
pub mod render;
pub mod status;
pub mod trace;
pub mod tracking;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_support;
