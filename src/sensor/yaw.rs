// src/sensor/yaw.rs

//! Quadrature yaw decoding and the one-shot yaw reference.

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, Ordering};

/// Re-maps `value` into `[-half_range, half_range]` by one full span.
///
/// Values exactly at either bound are kept. Callers only ever move one step
/// at a time, so a single correction is enough.
pub const fn wrap_steps(value: i32, half_range: i32) -> i32 {
    if value > half_range {
        -half_range + (value - half_range)
    } else if value < -half_range {
        half_range + (value + half_range)
    } else {
        value
    }
}

/// Rotation implied by a quadrature phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// No transition.
    Hold,
    /// One step forward (clockwise).
    Forward,
    /// One step in reverse (counter-clockwise).
    Reverse,
}

impl Step {
    /// Classifies a transition between two 2-bit phases.
    ///
    /// `00 -> 01 -> 11 -> 10 -> 00` is reverse rotation. Every other change,
    /// including pairs that skip a phase and cannot occur on a correctly
    /// wired encoder, counts as forward.
    pub const fn classify(last: u8, phase: u8) -> Self {
        match (last & 0b11, phase & 0b11) {
            (a, b) if a == b => Step::Hold,
            (0b00, 0b01) | (0b01, 0b11) | (0b11, 0b10) | (0b10, 0b00) => Step::Reverse,
            _ => Step::Forward,
        }
    }
}

/// Quadrature decoder for the yaw encoder.
///
/// Only the edge handler calls [`on_edge`](Self::on_edge); the main loop
/// reads [`position`](Self::position).
pub struct YawDecoder {
    last_phase: AtomicU8,
    position: AtomicI32,
    half_revolution: i32,
}

impl YawDecoder {
    /// Creates a decoder at `initial` steps with the last phase at `00`.
    pub const fn new(initial: i32, half_revolution: i32) -> Self {
        Self {
            last_phase: AtomicU8::new(0),
            position: AtomicI32::new(initial),
            half_revolution,
        }
    }

    /// Handles one pin edge with the current 2-bit phase.
    pub fn on_edge(&self, phase: u8) {
        let phase = phase & 0b11;
        let last = self.last_phase.load(Ordering::Relaxed);
        let delta = match Step::classify(last, phase) {
            Step::Hold => return,
            Step::Forward => 1,
            Step::Reverse => -1,
        };
        let position = self.position.load(Ordering::Relaxed) + delta;
        self.position
            .store(wrap_steps(position, self.half_revolution), Ordering::Release);
        self.last_phase.store(phase, Ordering::Relaxed);
    }

    /// Marks the current orientation as zero.
    pub fn set_zero(&self) {
        self.position.store(0, Ordering::Release);
    }

    /// Current position in encoder steps.
    pub fn position(&self) -> i32 {
        self.position.load(Ordering::Acquire)
    }
}

/// One-shot latch for the physical yaw reference sensor.
///
/// The first notification raises a pending bit for the main loop. Later
/// notifications are ignored, as if edge detection had been disabled.
pub struct YawReference {
    fired: AtomicBool,
    pending: AtomicBool,
}

impl YawReference {
    /// Creates an armed latch.
    pub const fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
            pending: AtomicBool::new(false),
        }
    }

    /// Records the reference edge. Returns `true` only the first time.
    pub fn notify(&self) -> bool {
        if self.fired.load(Ordering::Acquire) {
            return false;
        }
        self.fired.store(true, Ordering::Relaxed);
        self.pending.store(true, Ordering::Release);
        true
    }

    /// Consumes the pending bit, if set.
    pub fn take(&self) -> bool {
        if self.pending.load(Ordering::Acquire) {
            self.pending.store(false, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Whether the reference has been seen.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

impl Default for YawReference {
    fn default() -> Self {
        Self::new()
    }
}
