// Copyright 2026 the Anchorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-slot tap handoff between the input thread and the render loop.
//!
//! Taps arrive far less often than frames, so the render loop handles at
//! most one per frame. [`TapSlot`] keeps only the latest unread tap:
//! [`offer`](TapSlot::offer) overwrites, [`poll`](TapSlot::poll) takes and
//! clears. Both sides are lock-free.

use core::sync::atomic::{AtomicU64, Ordering};

use kurbo::Point;

/// Source of screen taps polled once per frame.
pub trait TapSource {
    /// Takes the pending tap, if any.
    fn poll_tap(&self) -> Option<Point>;
}

/// Bit pattern never produced by [`pack`]: both halves are NaN.
const EMPTY: u64 = u64::MAX;

/// Lock-free single-slot tap buffer.
///
/// Coordinates are stored as `f32` screen pixels. Taps that are not finite
/// once narrowed to `f32` are dropped on [`offer`](Self::offer).
#[derive(Debug)]
pub struct TapSlot {
    bits: AtomicU64,
}

impl Default for TapSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl TapSlot {
    /// Creates an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bits: AtomicU64::new(EMPTY),
        }
    }

    /// Stores `tap`, replacing any unread tap.
    ///
    /// Returns `false` if the tap was rejected as non-finite.
    pub fn offer(&self, tap: Point) -> bool {
        let Some(bits) = pack(tap) else {
            return false;
        };
        self.bits.store(bits, Ordering::Release);
        true
    }

    /// Takes the pending tap and clears the slot.
    pub fn poll(&self) -> Option<Point> {
        match self.bits.swap(EMPTY, Ordering::AcqRel) {
            EMPTY => None,
            bits => Some(unpack(bits)),
        }
    }

    /// Returns whether a tap is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.bits.load(Ordering::Acquire) != EMPTY
    }
}

impl TapSource for TapSlot {
    fn poll_tap(&self) -> Option<Point> {
        self.poll()
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "screen coordinates fit in f32; the slot stores pixels, not world units"
)]
fn pack(tap: Point) -> Option<u64> {
    let (x, y) = (tap.x as f32, tap.y as f32);
    // Finite f64 values past f32::MAX narrow to infinity.
    if !(x.is_finite() && y.is_finite()) {
        return None;
    }
    Some((u64::from(x.to_bits()) << 32) | u64::from(y.to_bits()))
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "each half of the packed word is one f32 bit pattern"
)]
fn unpack(bits: u64) -> Point {
    let x = f32::from_bits((bits >> 32) as u32);
    let y = f32::from_bits(bits as u32);
    Point::new(f64::from(x), f64::from(y))
}
