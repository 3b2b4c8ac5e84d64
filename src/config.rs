// src/config.rs

//! Configuration for the rig's controllers, setpoints, supervisor and task
//! rates. Everything here is fixed at startup; there is no runtime tuning.

use crate::controller::from_count;
use crate::Number;
use core::fmt;

/// Gains and limits for the main rotor (altitude) controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeGains<T> {
    /// Proportional gain.
    pub kp: T,
    /// Integral gain.
    pub ki: T,
    /// Derivative gain.
    pub kd: T,
    /// Constant duty offset that holds the rig against gravity.
    pub gravity: T,
    /// Lowest main rotor duty, percent.
    pub duty_min: u8,
    /// Highest main rotor duty, percent.
    pub duty_max: u8,
}

/// Gains and limits for the tail rotor (yaw) controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YawGains<T> {
    /// Proportional gain.
    pub kp: T,
    /// Integral gain.
    pub ki: T,
    /// Derivative gain.
    pub kd: T,
    /// Ceiling on the PID term before coupling is added.
    pub pid_max: T,
    /// Fraction of the main rotor duty fed into the tail rotor.
    pub coupling: T,
    /// Lowest tail rotor duty, percent.
    pub duty_min: u8,
    /// Highest tail rotor duty, percent.
    pub duty_max: u8,
}

/// Setpoint steps and encoder geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetpointConfig {
    /// Sensor counts between ground and full height. The sensor reads lower
    /// as the rig climbs.
    pub altitude_full_scale: i32,
    /// Altitude change per button push, in sensor counts.
    pub altitude_step: i32,
    /// Encoder steps per revolution.
    pub yaw_revolution: i32,
    /// Yaw change per button push, in encoder steps.
    pub yaw_step: i32,
    /// Yaw setpoint before the reference is found.
    pub yaw_initial: i32,
}

impl SetpointConfig {
    /// Half a revolution; positions and setpoints wrap past this.
    pub const fn yaw_half_revolution(&self) -> i32 {
        self.yaw_revolution / 2
    }
}

/// Tolerances and targets for the automatic maneuvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightConfig {
    /// Takeoff target above ground, in sensor counts.
    pub takeoff_offset: i32,
    /// Altitude tolerance band for takeoff and touchdown, in sensor counts.
    pub altitude_band: i32,
    /// Yaw tolerance before descending, in encoder steps.
    pub yaw_window: i32,
    /// Yaw setpoint commanded while sweeping for the reference.
    pub sweep_target: i32,
}

/// Task periods, in hardware ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPeriods {
    /// Control loop period.
    pub control: u16,
    /// Input polling and supervisor period.
    pub supervisory: u16,
    /// Display refresh period.
    pub display: u16,
    /// Telemetry period.
    pub telemetry: u16,
}

impl TaskPeriods {
    /// Periods in task table order.
    pub const fn as_array(&self) -> [u16; 4] {
        [self.control, self.supervisory, self.display, self.telemetry]
    }
}

/// Full configuration for the rig.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeliConfig<T> {
    /// Main rotor controller.
    pub altitude: AltitudeGains<T>,
    /// Tail rotor controller.
    pub yaw: YawGains<T>,
    /// Setpoint steps and encoder geometry.
    pub setpoint: SetpointConfig,
    /// Takeoff and landing tolerances.
    pub flight: FlightConfig,
    /// Task periods.
    pub periods: TaskPeriods,
    /// Time between control ticks, in seconds.
    pub dt: T,
}

/// Hardware tick rate.
pub const TICK_RATE_HZ: u32 = 1000;

/// Rig defaults that do not depend on the numeric type.
pub const DEFAULT_SETPOINT: SetpointConfig = SetpointConfig {
    altitude_full_scale: 1240,
    altitude_step: 124,
    yaw_revolution: 448,
    yaw_step: 19,
    yaw_initial: -223,
};

/// Takeoff and landing defaults.
pub const DEFAULT_FLIGHT: FlightConfig = FlightConfig {
    takeoff_offset: 62,
    altitude_band: 24,
    yaw_window: 6,
    sweep_target: 223,
};

/// Control at 250 Hz, inputs at 100 Hz, display at ~67 Hz, telemetry at 5 Hz.
pub const DEFAULT_PERIODS: TaskPeriods = TaskPeriods {
    control: 4,
    supervisory: 10,
    display: 15,
    telemetry: 200,
};

impl<T: Number> HeliConfig<T> {
    /// Creates a new configuration with neutral gains and the rig's limits.
    /// Gains default to one or zero and should be replaced with values tuned
    /// for the hardware.
    ///
    /// Example Usage
    /// ```
    /// use tethered_heli_control::HeliConfig;
    ///
    /// let mut config = HeliConfig::<f32>::new();
    ///
    /// // Main rotor gains and feed-forward.
    /// config.altitude.kp = 0.06;
    /// config.altitude.ki = 0.08;
    /// config.altitude.kd = 0.0001;
    /// config.altitude.gravity = 31.0;
    ///
    /// // Tail rotor gains and coupling.
    /// config.yaw.kp = 1.2;
    /// config.yaw.ki = 0.01;
    /// config.yaw.coupling = 0.8;
    ///
    /// // Control period at the default rates.
    /// config.dt = 0.004;
    ///
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new() -> Self {
        Self {
            altitude: AltitudeGains {
                kp: T::one(),
                ki: T::zero(),
                kd: T::zero(),
                gravity: T::zero(),
                duty_min: 15,
                duty_max: 80,
            },
            yaw: YawGains {
                kp: T::one(),
                ki: T::zero(),
                kd: T::zero(),
                pid_max: from_count(25),
                coupling: T::zero(),
                duty_min: 5,
                duty_max: 85,
            },
            setpoint: DEFAULT_SETPOINT,
            flight: DEFAULT_FLIGHT,
            periods: DEFAULT_PERIODS,
            dt: T::one(),
        }
    }

    /// Checks the configuration for values the controllers cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.periods.as_array().contains(&0) {
            return Err(ConfigError::ZeroTaskPeriod);
        }
        if self.dt <= T::zero() {
            return Err(ConfigError::NonPositiveTimeStep);
        }
        for (min, max) in [
            (self.altitude.duty_min, self.altitude.duty_max),
            (self.yaw.duty_min, self.yaw.duty_max),
        ] {
            if max < min {
                return Err(ConfigError::InvertedDutyRange);
            }
            if 100 < max {
                return Err(ConfigError::DutyAbovePercent);
            }
        }
        let setpoint = &self.setpoint;
        if setpoint.altitude_full_scale <= 0 {
            return Err(ConfigError::InvalidAltitudeScale);
        }
        if setpoint.altitude_step <= 0 {
            return Err(ConfigError::InvalidAltitudeStep);
        }
        let revolution = setpoint.yaw_revolution;
        if revolution < 2 || revolution % 2 != 0 {
            return Err(ConfigError::InvalidYawRevolution);
        }
        // One wrap correction per step only holds up to half a revolution.
        if !(1..=setpoint.yaw_half_revolution()).contains(&setpoint.yaw_step) {
            return Err(ConfigError::InvalidYawStep);
        }
        Ok(())
    }
}

impl<T: Number> Default for HeliConfig<T> {
    /// Tuned values for the rig.
    fn default() -> Self {
        let mut config = Self::new();

        config.altitude.kp = from_ratio(6, 100);
        config.altitude.ki = from_ratio(8, 100);
        config.altitude.kd = from_ratio(1, 10_000);
        config.altitude.gravity = from_count(31);

        config.yaw.kp = from_ratio(12, 10);
        config.yaw.ki = from_ratio(1, 100);
        config.yaw.kd = T::zero();
        config.yaw.coupling = from_ratio(8, 10);

        config.dt = from_ratio(i32::from(DEFAULT_PERIODS.control), TICK_RATE_HZ as i32);

        config
    }
}

fn from_ratio<T: Number>(numerator: i32, denominator: i32) -> T {
    from_count::<T>(numerator) / from_count::<T>(denominator)
}

/// Reasons a configuration is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A task period of zero ticks.
    ZeroTaskPeriod,
    /// A control time step that is zero or negative.
    NonPositiveTimeStep,
    /// A duty range whose minimum is above its maximum.
    InvertedDutyRange,
    /// A duty limit above 100 percent.
    DutyAbovePercent,
    /// An altitude full scale that is zero or negative.
    InvalidAltitudeScale,
    /// An altitude button step that is zero or negative.
    InvalidAltitudeStep,
    /// An encoder revolution that cannot be split into two equal halves.
    InvalidYawRevolution,
    /// A yaw button step outside one step to half a revolution.
    InvalidYawStep,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ConfigError::ZeroTaskPeriod => "task period must be at least one tick",
            ConfigError::NonPositiveTimeStep => "control time step must be positive",
            ConfigError::InvertedDutyRange => "duty minimum exceeds duty maximum",
            ConfigError::DutyAbovePercent => "duty limit exceeds 100 percent",
            ConfigError::InvalidAltitudeScale => "altitude full scale must be positive",
            ConfigError::InvalidAltitudeStep => "altitude step must be positive",
            ConfigError::InvalidYawRevolution => "yaw revolution must be a positive even count",
            ConfigError::InvalidYawStep => "yaw step must be between one and half a revolution",
        };
        f.write_str(message)
    }
}
