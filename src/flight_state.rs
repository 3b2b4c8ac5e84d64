// src/flight_state.rs

//! # Flight State Machine
//!
//! Four-state supervisor that arms on the mode switch, climbs to a takeoff
//! height while sweeping for the yaw reference, hands over to manual control,
//! and lands back on the reference heading.
//!
//! The transition itself is the pure function [`transition`]. It takes the
//! current [`FlightStatus`] and one tick of [`FlightInputs`] and returns the
//! next status with the [`FlightEffects`] the caller must apply.
//!
//! No maneuver has a timeout. If the yaw reference never fires the machine
//! stays in [`FlightState::TakingOff`].

use crate::setpoint::CalibrationLimits;
use crate::FlightConfig;

/// Supervisor states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlightState {
    /// On the ground with the rotors off.
    #[default]
    Landed,
    /// Climbing to the takeoff height and sweeping for the yaw reference.
    TakingOff,
    /// Under manual setpoint control.
    Flying,
    /// Returning to the reference heading, then descending.
    Landing,
}

impl FlightState {
    /// Display name of the state.
    pub const fn name(self) -> &'static str {
        match self {
            FlightState::Landed => "LANDED",
            FlightState::TakingOff => "TAKING OFF",
            FlightState::Flying => "FLYING",
            FlightState::Landing => "LANDING",
        }
    }
}

/// Supervisor state plus its two latches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlightStatus {
    /// Current state.
    pub state: FlightState,
    /// Holds the rig landed until the mode switch has been seen low.
    pub landed_lock: bool,
    /// Set until the yaw reference has been found.
    pub scanning: bool,
}

impl FlightStatus {
    /// Power-on status: landed, locked and scanning.
    pub const fn new() -> Self {
        Self {
            state: FlightState::Landed,
            landed_lock: true,
            scanning: true,
        }
    }
}

impl Default for FlightStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// One supervisory tick of inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightInputs {
    /// Mode switch level; high requests flight.
    pub switch_high: bool,
    /// Mean altitude reading, in sensor counts.
    pub altitude: i32,
    /// Yaw position, in encoder steps.
    pub yaw: i32,
}

/// What the caller must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlightEffects {
    /// Enable the rotor outputs.
    pub rotors_enabled: bool,
    /// Overwrite the altitude setpoint.
    pub altitude_setpoint: Option<i32>,
    /// Overwrite the yaw setpoint.
    pub yaw_setpoint: Option<i32>,
    /// Apply manual button steps to the setpoints.
    pub manual_control: bool,
}

/// Advances the supervisor by one tick.
pub fn transition(
    status: FlightStatus,
    inputs: &FlightInputs,
    limits: &CalibrationLimits,
    config: &FlightConfig,
) -> (FlightStatus, FlightEffects) {
    let mut next = status;
    let mut effects = FlightEffects::default();
    let ground = limits.min_altitude;

    match status.state {
        FlightState::Landed => {
            if !inputs.switch_high {
                next.landed_lock = false;
            }
            if !next.landed_lock && inputs.switch_high {
                next.state = FlightState::TakingOff;
            }
        }
        FlightState::TakingOff => {
            let target = ground - config.takeoff_offset;
            effects.altitude_setpoint = Some(target);
            if inputs.altitude < target + config.altitude_band {
                if status.scanning {
                    effects.yaw_setpoint = Some(config.sweep_target);
                } else {
                    next.state = FlightState::Flying;
                }
            }
        }
        FlightState::Flying => {
            effects.manual_control = true;
            if !inputs.switch_high {
                next.state = FlightState::Landing;
            }
        }
        FlightState::Landing => {
            effects.yaw_setpoint = Some(0);
            if (-config.yaw_window..config.yaw_window).contains(&inputs.yaw) {
                effects.altitude_setpoint = Some(ground);
                if (ground - config.altitude_band..=ground).contains(&inputs.altitude) {
                    next.state = FlightState::Landed;
                }
            }
        }
    }

    effects.rotors_enabled = next.state != FlightState::Landed;
    (next, effects)
}

/// Owner of the supervisor status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlightStateMachine {
    status: FlightStatus,
}

impl FlightStateMachine {
    /// Creates a machine in the power-on status.
    pub const fn new() -> Self {
        Self {
            status: FlightStatus::new(),
        }
    }

    /// Runs one supervisory tick and returns the effects to apply.
    pub fn update(
        &mut self,
        inputs: &FlightInputs,
        limits: &CalibrationLimits,
        config: &FlightConfig,
    ) -> FlightEffects {
        let (next, effects) = transition(self.status, inputs, limits, config);
        if next.state != self.status.state {
            log_info!(
                "flight state {} -> {}",
                self.status.state,
                next.state
            );
        }
        self.status = next;
        effects
    }

    /// Records that the yaw reference has been found.
    pub fn complete_scan(&mut self) {
        if self.status.scanning {
            log_info!("yaw reference acquired in {}", self.status.state);
        }
        self.status.scanning = false;
    }

    /// Current state.
    pub fn state(&self) -> FlightState {
        self.status.state
    }

    /// Current state and latches.
    pub fn status(&self) -> FlightStatus {
        self.status
    }

    /// Whether the yaw controller should suppress wraparound.
    pub fn sweeping(&self) -> bool {
        self.status.state == FlightState::TakingOff
    }
}
