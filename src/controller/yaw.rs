// src/controller/yaw.rs

//! # Yaw Controller
//!
//! Tail rotor PID controller. The PID term is capped at a ceiling, then a
//! share of the main rotor duty is added to cancel the main rotor's torque
//! before the final clamp to the tail duty range.
//!
//! While the supervisor sweeps for the yaw reference, wraparound correction
//! of the error is suppressed so the tail can drive a full revolution.

use crate::controller::{from_count, saturate, truncate, ControllerMemory};
use crate::pid::{compute_yaw, YawControlData};
use crate::{Number, SetpointConfig, YawGains};
use piddiy::PidController;

/// Tail rotor (yaw) controller.
pub struct YawController<T: Number> {
    pid: PidController<T, YawControlData<T>>,
    memory: ControllerMemory<T>,
    pid_max: T,
    coupling: T,
    duty_min: u8,
    duty_max: u8,
    error_limit: T,
    revolution: T,
    dt: T,
}

impl<T: Number> YawController<T> {
    /// Creates a new controller using the provided gains, encoder geometry
    /// and time step.
    pub fn with_config(gains: YawGains<T>, setpoint: SetpointConfig, dt: T) -> Self {
        let mut pid = PidController::new();
        pid.compute_fn(compute_yaw)
            .set_point(T::zero())
            .kp(gains.kp)
            .ki(gains.ki)
            .kd(gains.kd);

        YawController {
            pid,
            memory: ControllerMemory::new(),
            pid_max: gains.pid_max,
            coupling: gains.coupling,
            duty_min: gains.duty_min,
            duty_max: gains.duty_max,
            error_limit: from_count(setpoint.yaw_half_revolution()),
            revolution: from_count(setpoint.yaw_revolution),
            dt,
        }
    }

    /// Runs one control tick and returns the tail rotor duty, in percent.
    ///
    /// `main_duty` is this tick's main rotor output.
    pub fn update(&mut self, set_point: i32, measurement: i32, main_duty: u8, sweep: bool) -> u8 {
        let measurement: T = from_count(measurement);
        self.pid.set_point(from_count(set_point));

        let data = YawControlData {
            measurement,
            previous_measurement: self.memory.previous_measurement,
            error_limit: self.error_limit,
            revolution: self.revolution,
            dt: self.dt,
            sweep,
        };
        let mut effort = self.pid.compute(data);
        if self.pid_max < effort {
            effort = self.pid_max;
        }
        let coupling = from_count::<T>(i32::from(main_duty)) * self.coupling;
        let control = truncate(effort + coupling);
        let (duty, saturated) = saturate(control, self.duty_min, self.duty_max);

        // Anti-windup: keep the candidate only while the output is in range.
        if !saturated {
            self.memory.integral = self.memory.integral + self.pid.integral;
        }
        self.memory.previous_measurement = measurement;

        duty
    }

    /// Persistent controller state.
    pub fn memory(&self) -> ControllerMemory<T> {
        self.memory
    }
}
