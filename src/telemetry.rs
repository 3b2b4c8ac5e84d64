// src/telemetry.rs

//! Read-only snapshot for display and telemetry consumers. Formatting and
//! transport belong to the consumer.

use crate::{DutyCycle, FlightState};

/// Centidegrees in one revolution.
const CENTIDEGREES_PER_REV: i32 = 360 * 100;

/// Altitude as a percentage of full height, in integer math.
///
/// `ground` is the landed reading and `full_scale` the counts between ground
/// and full height. Readings below ground give negative percentages.
pub const fn altitude_percent(ground: i32, reading: i32, full_scale: i32) -> i32 {
    (ground - reading) * 100 / full_scale
}

/// Yaw in hundredths of a degree, in integer math.
pub const fn yaw_centidegrees(steps: i32, steps_per_rev: i32) -> i32 {
    steps * CENTIDEGREES_PER_REV / steps_per_rev
}

/// Snapshot of the rig for display and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Telemetry {
    /// Measured altitude, percent of full height.
    pub altitude_percent: i32,
    /// Commanded altitude, percent of full height.
    pub altitude_setpoint_percent: i32,
    /// Measured yaw, centidegrees.
    pub yaw_centidegrees: i32,
    /// Commanded yaw, centidegrees.
    pub yaw_setpoint_centidegrees: i32,
    /// Supervisor state.
    pub state: FlightState,
    /// Last duty output.
    pub duty: DutyCycle,
}
