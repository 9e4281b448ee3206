// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded, insertion-ordered anchor storage with oldest-first eviction.

use alloc::collections::VecDeque;
use core::fmt;

use crate::config::Color;
use crate::pose::Pose;
use crate::tracking::{AnchorHandle, TrackingState};
use crate::transform::Transform3d;

use super::id::AnchorId;

/// One placed anchor: identity, platform handle and display color.
pub struct PlacedAnchor<H> {
    id: AnchorId,
    handle: H,
    color: Color,
}

impl<H: AnchorHandle> PlacedAnchor<H> {
    /// Returns the anchor's registry id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> AnchorId {
        self.id
    }

    /// Returns the platform handle.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Returns the display color.
    #[inline]
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Returns the handle's current tracking state.
    #[inline]
    #[must_use]
    pub fn tracking_state(&self) -> TrackingState {
        self.handle.tracking_state()
    }

    /// Returns the handle's current world pose.
    #[inline]
    #[must_use]
    pub fn pose(&self) -> Pose {
        self.handle.pose()
    }

    /// Derives this frame's world transform from the handle.
    #[inline]
    #[must_use]
    pub fn world_transform(&self) -> Transform3d {
        self.handle.pose().to_transform()
    }
}

impl<H> fmt::Debug for PlacedAnchor<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlacedAnchor")
            .field("id", &self.id)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

/// Result of admitting an anchor into the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Admission {
    /// Id of the newly added anchor.
    pub id: AnchorId,
    /// Id of the anchor evicted to make room, if the registry was full.
    pub evicted: Option<AnchorId>,
}

/// Bounded, insertion-ordered storage for placed anchors.
///
/// Holds at most [`capacity`](Self::capacity) anchors. Adding to a full
/// registry evicts the oldest anchor first, releasing its handle. Every
/// handle still held when the registry is dropped is released.
pub struct AnchorRegistry<H: AnchorHandle> {
    entries: VecDeque<PlacedAnchor<H>>,
    capacity: usize,
    next_sequence: u64,
}

impl<H: AnchorHandle> fmt::Debug for AnchorRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorRegistry")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("next_sequence", &self.next_sequence)
            .finish_non_exhaustive()
    }
}

impl<H: AnchorHandle> AnchorRegistry<H> {
    /// Creates an empty registry that holds at most `capacity` anchors.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "anchor capacity must be at least 1");
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_sequence: 0,
        }
    }

    /// Maximum number of anchors held at once.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of anchors currently held.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no anchors are held.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an anchor whose handle was already acquired.
    ///
    /// Evicts the oldest anchor first if the registry is full.
    pub fn add(&mut self, handle: H, color: Color) -> Admission {
        match self.add_with(color, || Ok::<H, core::convert::Infallible>(handle)) {
            Ok(admission) => admission,
            Err(never) => match never {},
        }
    }

    /// Makes room if needed, then acquires a handle with `acquire` and
    /// appends it.
    ///
    /// The evicted handle is released before `acquire` runs. If `acquire`
    /// fails the eviction stands and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns whatever `acquire` returns.
    pub fn add_with<E>(
        &mut self,
        color: Color,
        acquire: impl FnOnce() -> Result<H, E>,
    ) -> Result<Admission, E> {
        let evicted = if self.entries.len() >= self.capacity {
            self.evict_oldest()
        } else {
            None
        };

        let handle = acquire()?;
        let id = AnchorId(self.next_sequence);
        self.next_sequence += 1;
        self.entries.push_back(PlacedAnchor { id, handle, color });
        debug_assert!(
            self.entries.len() <= self.capacity,
            "registry grew past capacity"
        );

        Ok(Admission { id, evicted })
    }

    /// Iterates over all anchors, oldest first.
    ///
    /// The iterator borrows the registry; call again to restart.
    pub fn iter(&self) -> impl Iterator<Item = &PlacedAnchor<H>> + '_ {
        self.entries.iter()
    }

    /// Iterates over anchors whose handle reports
    /// [`Tracking`](TrackingState::Tracking) this frame.
    pub fn tracking(&self) -> impl Iterator<Item = &PlacedAnchor<H>> + '_ {
        self.entries
            .iter()
            .filter(|anchor| anchor.tracking_state().is_tracking())
    }

    /// Returns the anchor with the given id, if still held.
    #[must_use]
    pub fn get(&self, id: AnchorId) -> Option<&PlacedAnchor<H>> {
        self.entries.iter().find(|anchor| anchor.id == id)
    }

    /// Returns whether an anchor with the given id is still held.
    #[must_use]
    pub fn contains(&self, id: AnchorId) -> bool {
        self.get(id).is_some()
    }

    /// Removes and releases the anchor with the given id.
    ///
    /// Returns `false` if no such anchor is held.
    pub fn remove(&mut self, id: AnchorId) -> bool {
        let Some(pos) = self.entries.iter().position(|anchor| anchor.id == id) else {
            return false;
        };
        if let Some(anchor) = self.entries.remove(pos) {
            log::debug!("releasing {:?} on request", anchor.id);
            anchor.handle.release();
        }
        true
    }

    /// Releases every anchor, oldest first.
    pub fn clear(&mut self) {
        while let Some(anchor) = self.entries.pop_front() {
            anchor.handle.release();
        }
    }

    // -- Internal helpers --

    fn evict_oldest(&mut self) -> Option<AnchorId> {
        let oldest = self.entries.pop_front()?;
        log::debug!(
            "anchor capacity {} reached, evicting {:?}",
            self.capacity,
            oldest.id
        );
        let id = oldest.id;
        oldest.handle.release();
        Some(id)
    }
}

impl<H: AnchorHandle> Drop for AnchorRegistry<H> {
    fn drop(&mut self) {
        self.clear();
    }
}
