// src/controller.rs

//! # Rotor Controllers
//!
//! Discrete-time PID controllers for the main (altitude) and tail (yaw)
//! rotors. Each controller owns its own [`ControllerMemory`] and a
//! `piddiy::PidController` driven by the matching compute callback from
//! [`crate::pid`].
//!
//! Both controllers share the same anti-windup rule. The integral
//! accumulator only advances on ticks where the unclamped duty stayed inside
//! the duty range; the previous sensor value advances every tick.

mod altitude;
pub use altitude::*;
mod yaw;
pub use yaw::*;

use num_traits::{FromPrimitive, ToPrimitive};
use piddiy::Number as PiddiyNumber;

/// Custom trait to encapsulate base number requirements.
///
/// On top of the arithmetic `piddiy` needs, controllers convert integer
/// sensor counts into `T` and truncate outputs back into duty percentages.
pub trait Number: PiddiyNumber + FromPrimitive + ToPrimitive {}

impl<T: PiddiyNumber + FromPrimitive + ToPrimitive> Number for T {}

/// Persistent per-axis controller state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerMemory<T> {
    /// Accumulated `error * dt`, advanced only on non-saturating ticks.
    pub integral: T,
    /// Sensor reading from the previous tick.
    pub previous_measurement: T,
}

impl<T: Number> ControllerMemory<T> {
    /// Power-on memory: both fields zero.
    pub fn new() -> Self {
        ControllerMemory {
            integral: T::zero(),
            previous_measurement: T::zero(),
        }
    }
}

impl<T: Number> Default for ControllerMemory<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Duty cycle percentages for both rotors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyCycle {
    /// Main rotor duty, percent.
    pub main: u8,
    /// Tail rotor duty, percent.
    pub tail: u8,
}

/// Converts an integer count into `T`.
///
/// Sensor counts are far inside the range of any supported `T`, so the
/// fallback only guards against exotic number types.
pub(crate) fn from_count<T: Number>(value: i32) -> T {
    T::from_i32(value).unwrap_or_else(T::zero)
}

/// Truncates a controller output toward zero, saturating at the `i32` range.
pub(crate) fn truncate<T: Number>(value: T) -> i32 {
    value.to_i32().unwrap_or(if value > T::zero() {
        i32::MAX
    } else {
        i32::MIN
    })
}

/// Clamps a truncated output into `[min, max]` and reports whether it had to.
pub(crate) fn saturate(control: i32, min: u8, max: u8) -> (u8, bool) {
    let clamped = control.clamp(i32::from(min), i32::from(max));
    // `clamped` lies within two `u8` bounds.
    (clamped as u8, clamped != control)
}
