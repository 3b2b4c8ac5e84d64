// src/controller/altitude.rs

//! # Altitude Controller
//!
//! Main rotor PID controller. The sensor reads lower as the rig climbs, so
//! the PID term is subtracted from the gravity feed-forward:
//!
//! `duty = gravity - (P + I + D)`, clamped to the main rotor duty range.

use crate::controller::{from_count, saturate, truncate, ControllerMemory};
use crate::pid::{compute_altitude, AltitudeControlData};
use crate::{AltitudeGains, Number};
use piddiy::PidController;

/// Main rotor (altitude) controller.
pub struct AltitudeController<T: Number> {
    pid: PidController<T, AltitudeControlData<T>>,
    memory: ControllerMemory<T>,
    gravity: T,
    duty_min: u8,
    duty_max: u8,
    dt: T,
}

impl<T: Number> AltitudeController<T> {
    /// Creates a new controller using the provided gains and time step.
    pub fn with_config(gains: AltitudeGains<T>, dt: T) -> Self {
        let mut pid = PidController::new();
        pid.compute_fn(compute_altitude)
            .set_point(T::zero())
            .kp(gains.kp)
            .ki(gains.ki)
            .kd(gains.kd);

        AltitudeController {
            pid,
            memory: ControllerMemory::new(),
            gravity: gains.gravity,
            duty_min: gains.duty_min,
            duty_max: gains.duty_max,
            dt,
        }
    }

    /// Runs one control tick and returns the main rotor duty, in percent.
    pub fn update(&mut self, set_point: i32, measurement: u16) -> u8 {
        let measurement: T = from_count(i32::from(measurement));
        self.pid.set_point(from_count(set_point));

        let data = AltitudeControlData {
            measurement,
            previous_measurement: self.memory.previous_measurement,
            integral: self.memory.integral,
            dt: self.dt,
        };
        let control = truncate(self.gravity - self.pid.compute(data));
        let (duty, saturated) = saturate(control, self.duty_min, self.duty_max);

        // Anti-windup: keep the candidate only while the output is in range.
        if !saturated {
            self.memory.integral = self.pid.integral;
        }
        self.memory.previous_measurement = measurement;

        duty
    }

    /// Persistent controller state.
    pub fn memory(&self) -> ControllerMemory<T> {
        self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use fixed::types::I16F16;

    /// Integral-only gains with a unit time step.
    fn integral_gains() -> AltitudeGains<f32> {
        AltitudeGains {
            kp: 0.0,
            ki: 1.0,
            kd: 0.0,
            gravity: 50.0,
            duty_min: 15,
            duty_max: 80,
        }
    }

    /// Test the no error condition.
    #[test]
    fn test_altitude_no_error_is_feed_forward() {
        let mut gains = integral_gains();
        gains.kp = 1.0;
        let mut controller = AltitudeController::with_config(gains, 1.0);

        let duty = controller.update(2000, 2000);
        // The first tick sees a derivative from zero, but kd is zero.
        assert_eq!(50, duty, "Duty should be the feed-forward alone.");
    }

    /// Test the sign convention: a setpoint above the rig raises duty.
    #[test]
    fn test_altitude_climb_raises_duty() {
        let mut gains = integral_gains();
        gains.kp = 0.5;
        gains.ki = 0.0;
        let mut controller = AltitudeController::with_config(gains, 1.0);

        // Setpoint 20 counts lower means 20 counts higher.
        assert_eq!(60, controller.update(1980, 2000));
        // And the reverse pulls duty down.
        assert_eq!(40, controller.update(2020, 2000));
    }

    /// Test that the integral is held on saturating ticks and resumes after.
    #[test]
    fn test_altitude_anti_windup() {
        let mut controller = AltitudeController::with_config(integral_gains(), 1.0);

        // In range: 50 - 10 = 40, integral commits 10.
        assert_eq!(40, controller.update(100, 90));
        assert!(value_close(10.0, controller.memory().integral));

        // In range: 50 - 20 = 30, integral commits 20.
        assert_eq!(30, controller.update(100, 90));
        let held = controller.memory().integral;
        assert!(value_close(20.0, held));

        // Saturating: 50 - (20 - 100) = 130, clamped.
        assert_eq!(80, controller.update(100, 200));
        assert_eq!(
            held.to_bits(),
            controller.memory().integral.to_bits(),
            "Integral must be untouched while saturated."
        );
        assert!(
            value_close(200.0, controller.memory().previous_measurement),
            "Previous measurement advances regardless."
        );

        // Low side saturation holds too: 50 - (20 + 60) = -30.
        assert_eq!(15, controller.update(100, 40));
        assert_eq!(held.to_bits(), controller.memory().integral.to_bits());

        // Back in range: 50 - (20 + 5) = 25, accumulation resumes.
        assert_eq!(25, controller.update(100, 95));
        assert!(value_close(25.0, controller.memory().integral));
    }

    /// Test that the derivative acts on the measurement change.
    #[test]
    fn test_altitude_derivative_on_measurement() {
        let gains = AltitudeGains {
            kp: 0.0,
            ki: 0.0,
            kd: 0.01,
            gravity: 40.0,
            duty_min: 15,
            duty_max: 80,
        };
        let mut controller = AltitudeController::with_config(gains, 0.004);
        let _ = controller.update(1000, 1000);

        // Reading fell by 2 counts (climbing): D = 0.01 * 2 / 0.004 = 5.
        assert_eq!(35, controller.update(1000, 998));
        // Steady again: no derivative.
        assert_eq!(40, controller.update(1000, 998));
    }

    /// Test that a fractional output truncates before clamping.
    #[test]
    fn test_altitude_truncates_output() {
        let gains = AltitudeGains {
            kp: 0.06,
            ki: 0.0,
            kd: 0.0,
            gravity: 31.0,
            duty_min: 15,
            duty_max: 80,
        };
        let mut controller = AltitudeController::with_config(gains, 0.004);
        // 31 + 0.06 * 100 = 37.0
        assert_eq!(37, controller.update(2400, 2500));
        // 31 + 0.06 * 110 = 37.6
        assert_eq!(37, controller.update(2390, 2500));
    }

    /// Test the controller on a fixed-point number type.
    #[test]
    fn test_altitude_fixed_point() {
        let gains = AltitudeGains {
            kp: I16F16::from_num(0),
            ki: I16F16::from_num(1),
            kd: I16F16::from_num(0),
            gravity: I16F16::from_num(50),
            duty_min: 15,
            duty_max: 80,
        };
        let mut controller = AltitudeController::with_config(gains, I16F16::from_num(1));

        assert_eq!(40, controller.update(100, 90));
        assert_eq!(30, controller.update(100, 90));
        assert_eq!(80, controller.update(100, 200));
        assert_eq!(I16F16::from_num(20), controller.memory().integral);
    }
}
