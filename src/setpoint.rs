// src/setpoint.rs

//! # Setpoint Store
//!
//! Altitude and yaw setpoints plus the altitude limits learned once at
//! startup. Manual step commands clamp or wrap; the direct setters used by
//! automatic maneuvers write through unchecked.
//!
//! The altitude sensor reads lower as the rig climbs, so the "maximum"
//! altitude is the smaller sensor count.

use crate::sensor::wrap_steps;
use crate::SetpointConfig;

/// Altitude readings at ground level and full height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationLimits {
    /// Sensor reading with the rig landed.
    pub min_altitude: i32,
    /// Sensor reading at full height.
    pub max_altitude: i32,
}

impl CalibrationLimits {
    /// Derives both limits from the first settled reading on the ground.
    pub const fn from_landed_reading(reading: u16, full_scale: i32) -> Self {
        let landed = reading as i32;
        Self {
            min_altitude: landed,
            max_altitude: landed - full_scale,
        }
    }
}

/// Current setpoints and the immutable calibration limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetpointStore {
    altitude: i32,
    yaw: i32,
    limits: CalibrationLimits,
    config: SetpointConfig,
}

impl SetpointStore {
    /// Calibrates the limits from the landed reading and seeds the altitude
    /// setpoint at ground level.
    pub fn init_limits(landed_reading: u16, config: SetpointConfig) -> Self {
        let limits = CalibrationLimits::from_landed_reading(landed_reading, config.altitude_full_scale);
        log_info!(
            "altitude limits: ground {=i32}, full height {=i32}",
            limits.min_altitude,
            limits.max_altitude
        );
        Self {
            altitude: limits.min_altitude,
            yaw: config.yaw_initial,
            limits,
            config,
        }
    }

    /// Lowest altitude a manual step may command.
    fn lowest_manual_altitude(&self) -> i32 {
        self.limits.min_altitude - self.config.altitude_step
    }

    /// Steps the altitude setpoint up, stopping at full height.
    pub fn inc_altitude(&mut self) {
        self.altitude = (self.altitude - self.config.altitude_step).max(self.limits.max_altitude);
    }

    /// Steps the altitude setpoint down, stopping one step above ground.
    pub fn dec_altitude(&mut self) {
        self.altitude = (self.altitude + self.config.altitude_step).min(self.lowest_manual_altitude());
    }

    /// Writes the altitude setpoint without clamping.
    pub fn set_altitude(&mut self, altitude: i32) {
        self.altitude = altitude;
    }

    /// Steps the yaw setpoint clockwise, wrapping at half a revolution.
    pub fn inc_yaw(&mut self) {
        self.yaw = wrap_steps(
            self.yaw + self.config.yaw_step,
            self.config.yaw_half_revolution(),
        );
    }

    /// Steps the yaw setpoint counter-clockwise, wrapping at half a revolution.
    pub fn dec_yaw(&mut self) {
        self.yaw = wrap_steps(
            self.yaw - self.config.yaw_step,
            self.config.yaw_half_revolution(),
        );
    }

    /// Writes the yaw setpoint without wrapping.
    pub fn set_yaw(&mut self, yaw: i32) {
        self.yaw = yaw;
    }

    /// Current altitude setpoint, in sensor counts.
    pub fn altitude(&self) -> i32 {
        self.altitude
    }

    /// Current yaw setpoint, in encoder steps.
    pub fn yaw(&self) -> i32 {
        self.yaw
    }

    /// Limits learned at startup.
    pub fn limits(&self) -> CalibrationLimits {
        self.limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_SETPOINT;

    const LANDED: u16 = 2500;

    fn store() -> SetpointStore {
        SetpointStore::init_limits(LANDED, DEFAULT_SETPOINT)
    }

    /// Test the limits and the seeded setpoints.
    #[test]
    fn test_setpoint_init_limits() {
        let store = store();
        assert_eq!(
            CalibrationLimits {
                min_altitude: 2500,
                max_altitude: 1260,
            },
            store.limits()
        );
        assert_eq!(2500, store.altitude(), "Altitude starts on the ground.");
        assert_eq!(-223, store.yaw());
    }

    /// Test that repeated climbs stop at full height.
    #[test]
    fn test_setpoint_inc_altitude_clamps() {
        let mut store = store();
        for _ in 0..50 {
            store.inc_altitude();
            assert!(store.altitude() >= 1260, "Climbed past full height.");
        }
        assert_eq!(1260, store.altitude());
    }

    /// Test that repeated descents stop one step above ground.
    #[test]
    fn test_setpoint_dec_altitude_clamps() {
        let mut store = store();
        store.dec_altitude();
        assert_eq!(2376, store.altitude(), "First step pulls off the ground value.");
        for _ in 0..5 {
            store.inc_altitude();
        }
        for _ in 0..50 {
            store.dec_altitude();
            assert!(store.altitude() <= 2376, "Descended below the manual floor.");
        }
        assert_eq!(2376, store.altitude());
    }

    /// Test that any mix of steps stays inside the manual band.
    #[test]
    fn test_setpoint_altitude_mixed_steps() {
        let mut store = store();
        store.dec_altitude();
        let pattern = [true, true, false, true, true, true, false, false, true];
        for _ in 0..20 {
            for up in pattern {
                if up {
                    store.inc_altitude();
                } else {
                    store.dec_altitude();
                }
                assert!((1260..=2376).contains(&store.altitude()));
            }
        }
    }

    /// Test yaw wraparound in both directions.
    #[test]
    fn test_setpoint_yaw_wraps() {
        let mut store = store();
        store.set_yaw(220);
        store.inc_yaw();
        assert_eq!(-209, store.yaw(), "239 should wrap to -209.");
        store.dec_yaw();
        assert_eq!(220, store.yaw(), "-228 should wrap to 220.");
    }

    /// Test that the largest yaw step keeps the setpoint inside the range.
    #[test]
    fn test_setpoint_yaw_half_revolution_step() {
        let config = SetpointConfig {
            yaw_step: DEFAULT_SETPOINT.yaw_half_revolution(),
            ..DEFAULT_SETPOINT
        };
        let mut store = SetpointStore::init_limits(LANDED, config);
        store.set_yaw(0);
        for _ in 0..10 {
            store.inc_yaw();
            assert!((-224..=224).contains(&store.yaw()), "Yaw {} escaped", store.yaw());
        }
        store.set_yaw(-223);
        for _ in 0..10 {
            store.dec_yaw();
            assert!((-224..=224).contains(&store.yaw()), "Yaw {} escaped", store.yaw());
        }
    }

    /// Test that direct writes bypass clamping.
    #[test]
    fn test_setpoint_direct_writes() {
        let mut store = store();
        store.set_altitude(2500 - 62);
        assert_eq!(2438, store.altitude());
        store.set_altitude(2500);
        assert_eq!(2500, store.altitude());
        store.set_yaw(400);
        assert_eq!(400, store.yaw());
    }
}
