// src/pid/altitude.rs

//! # Altitude PID Control Module
//!
//! This module provides a compute function and control data structure
//! to perform altitude PID calculations for the main rotor.
//!
//! The altitude sensor reads lower as the rig climbs, so the derivative is
//! taken on the measurement (`previous - current`) rather than on the error.
//! This keeps setpoint steps from kicking the derivative term.

use crate::Number;
use piddiy::PidController;

/// Control data for the altitude PID compute callback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AltitudeControlData<T> {
    /// The current altitude reading, in raw sensor counts.
    pub measurement: T,
    /// The altitude reading from the previous control tick.
    pub previous_measurement: T,
    /// The committed integral accumulator, in `error * dt` units.
    pub integral: T,
    /// The time delta between control ticks.
    pub dt: T,
}

/// Altitude PID compute callback.
///
/// Returns `(error, integral, derivative)` where `integral` is the committed
/// accumulator plus this tick's candidate. The caller decides whether the
/// candidate is kept.
pub fn compute_altitude<T: Number>(
    pid: &mut PidController<T, AltitudeControlData<T>>,
    data: AltitudeControlData<T>,
) -> (T, T, T) {
    let error = pid.set_point - data.measurement;
    let integral = data.integral + error * data.dt;
    let derivative = (data.previous_measurement - data.measurement) / data.dt;

    (error, integral, derivative)
}
