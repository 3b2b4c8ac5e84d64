// src/pid/yaw.rs

//! # Yaw PID Control Module
//!
//! This module provides a compute function and control data structure
//! to perform yaw PID calculations for the tail rotor.

use crate::Number;
use piddiy::PidController;

/// Control data for the yaw PID compute callback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct YawControlData<T> {
    /// The current yaw position, in encoder steps.
    pub measurement: T,
    /// The yaw position from the previous control tick.
    pub previous_measurement: T,
    /// Largest error magnitude before it is taken the short way round.
    pub error_limit: T,
    /// Encoder steps in one full revolution.
    pub revolution: T,
    /// The time delta between control ticks.
    pub dt: T,
    /// Suppresses wraparound correction so a full sweep can be commanded.
    pub sweep: bool,
}

/// Yaw PID compute callback.
///
/// Returns `(error, integral, derivative)`. The integral is this tick's
/// candidate only; the tail output does not carry the accumulator.
pub fn compute_yaw<T: Number>(
    pid: &mut PidController<T, YawControlData<T>>,
    data: YawControlData<T>,
) -> (T, T, T) {
    let mut error = pid.set_point - data.measurement;
    if !data.sweep {
        if error < -data.error_limit {
            error = error + data.revolution;
        } else if data.error_limit < error {
            error = error - data.revolution;
        }
    }
    let integral = error * data.dt;
    let derivative = (data.previous_measurement - data.measurement) / data.dt;

    (error, integral, derivative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn yaw_data(measurement: f32, sweep: bool) -> YawControlData<f32> {
        YawControlData {
            measurement,
            previous_measurement: measurement,
            error_limit: 224.0,
            revolution: 448.0,
            dt: 1.0,
            sweep,
        }
    }

    /// Test that an error past half a revolution is taken the short way.
    #[test]
    fn test_pid_yaw_wraparound() {
        let mut pid = PidController::new();
        pid.compute_fn(compute_yaw)
            .set_point(200.0)
            .kp(1.0)
            .ki(0.0)
            .kd(0.0);

        let (error, _, _) = compute_yaw(&mut pid, yaw_data(-200.0, false));
        assert!(value_close(-48.0, error), "Error should wrap to -48.");

        pid.set_point(-200.0);
        let (error, _, _) = compute_yaw(&mut pid, yaw_data(200.0, false));
        assert!(value_close(48.0, error), "Error should wrap to 48.");
    }

    /// Test that the error limit itself is not wrapped.
    #[test]
    fn test_pid_yaw_wraparound_boundary() {
        let mut pid = PidController::new();
        pid.compute_fn(compute_yaw)
            .set_point(224.0)
            .kp(1.0)
            .ki(0.0)
            .kd(0.0);

        let (error, _, _) = compute_yaw(&mut pid, yaw_data(0.0, false));
        assert!(value_close(224.0, error), "Error at the limit should stay.");
    }

    /// Test that sweeping suppresses wraparound correction.
    #[test]
    fn test_pid_yaw_sweep_suppresses_wraparound() {
        let mut pid = PidController::new();
        pid.compute_fn(compute_yaw)
            .set_point(223.0)
            .kp(1.0)
            .ki(0.0)
            .kd(0.0);

        let (error, _, _) = compute_yaw(&mut pid, yaw_data(-223.0, true));
        assert!(
            value_close(446.0, error),
            "Sweep error should span the long way round."
        );
    }

    /// Test PID specific response with non-zero values.
    #[test]
    fn test_pid_yaw_specific_output() {
        let mut pid = PidController::new();
        pid.compute_fn(compute_yaw)
            .set_point(10.0)
            .kp(2.0)
            .ki(1.0)
            .kd(1.0);
        let data = YawControlData {
            measurement: 4.0,
            previous_measurement: 1.0,
            dt: 0.5,
            ..yaw_data(0.0, false)
        };

        let (error, integral, derivative) = compute_yaw(&mut pid, data);
        let output = pid.compute(data);

        assert!(value_close(6.0, error), "Error should be 6.");
        assert!(value_close(3.0, integral), "Candidate should be 6 * 0.5.");
        assert!(value_close(-6.0, derivative), "Derivative should be -3 / 0.5.");
        assert!(
            value_close(9.0, output),
            "Output should be 12 + 3 - 6."
        );

        // The candidate does not accumulate across ticks.
        let (_, integral_second, _) = compute_yaw(&mut pid, data);
        assert!(value_close(3.0, integral_second), "Candidate should not grow.");
    }
}
