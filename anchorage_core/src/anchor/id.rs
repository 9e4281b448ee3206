// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Anchor identity.

use core::fmt;

/// Identifies an anchor in an [`AnchorRegistry`](super::AnchorRegistry).
///
/// Ids are handed out in placement order and never reused by the same
/// registry, so a stale id simply stops matching.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnchorId(pub(crate) u64);

impl AnchorId {
    /// Returns the placement sequence number (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn sequence(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnchorId(#{})", self.0)
    }
}
