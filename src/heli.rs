// src/heli.rs

//! # Rig Runtime
//!
//! [`HeliShared`] holds everything the interrupt handlers write: the
//! altitude sample ring, the yaw decoder, the task latches and the yaw
//! reference latch. It is `const` constructible so firmware can keep it in a
//! `static` and call its `on_*` methods from the matching handlers.
//!
//! [`Heli`] is the single owner of setpoints, supervisor and controller
//! memory. The main loop calls [`Heli::poll`] repeatedly; it never blocks
//! and only runs a task whose latch the tick handler has raised.

use crate::sensor::{AltitudeSampler, YawDecoder, YawReference, SAMPLE_CAPACITY};
use crate::setpoint::SetpointStore;
use crate::telemetry::{altitude_percent, yaw_centidegrees, Telemetry};
use crate::{
    AltitudeController, ConfigError, DutyCycle, FlightInputs, FlightState, FlightStateMachine,
    HeliConfig, Number, Task, TaskPeriods, TickScheduler, YawController, TASK_COUNT,
};

/// Interrupt-shared rig state.
pub struct HeliShared<const N: usize = SAMPLE_CAPACITY> {
    /// Altitude samples, written by the conversion handler.
    pub sampler: AltitudeSampler<N>,
    /// Yaw position, written by the quadrature edge handler.
    pub decoder: YawDecoder,
    /// Task latches, raised by the tick handler.
    pub scheduler: TickScheduler<TASK_COUNT>,
    /// One-shot yaw reference latch.
    pub yaw_reference: YawReference,
}

impl<const N: usize> HeliShared<N> {
    /// Creates the shared state for the given task rates and yaw geometry.
    pub const fn new(periods: TaskPeriods, initial_yaw: i32, half_revolution: i32) -> Self {
        Self {
            sampler: AltitudeSampler::new(),
            decoder: YawDecoder::new(initial_yaw, half_revolution),
            scheduler: TickScheduler::new(periods.as_array()),
            yaw_reference: YawReference::new(),
        }
    }

    /// Creates the shared state matching a rig configuration.
    pub fn from_config<T>(config: &HeliConfig<T>) -> Self {
        Self::new(
            config.periods,
            config.setpoint.yaw_initial,
            config.setpoint.yaw_half_revolution(),
        )
    }

    /// Periodic tick handler.
    pub fn on_tick(&self) {
        self.scheduler.tick();
    }

    /// ADC conversion complete handler.
    pub fn on_conversion(&self, sample: u16) {
        self.sampler.push(sample);
    }

    /// Quadrature pin edge handler.
    pub fn on_quadrature_edge(&self, phase: u8) {
        self.decoder.on_edge(phase);
    }

    /// Yaw reference sensor handler. Only the first call has any effect.
    pub fn on_yaw_reference(&self) {
        if self.yaw_reference.notify() {
            self.decoder.set_zero();
        }
    }
}

/// Discrete inputs sampled once per supervisory tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DiscreteInputs {
    /// Mode switch level; high requests flight.
    pub switch_high: bool,
    /// Up button pushed since the last poll.
    pub up: bool,
    /// Down button pushed since the last poll.
    pub down: bool,
    /// Left button pushed since the last poll.
    pub left: bool,
    /// Right button pushed since the last poll.
    pub right: bool,
    /// Reset button held.
    pub reset: bool,
}

/// Hardware collaborators the runtime drives.
pub trait HeliIo {
    /// Samples the mode switch and button events.
    fn read_inputs(&mut self) -> DiscreteInputs;

    /// Applies both duty cycles.
    fn apply_duty(&mut self, duty: DutyCycle);

    /// Turns both rotor outputs on or off.
    fn set_rotors_enabled(&mut self, enabled: bool);

    /// Restarts the whole system.
    fn system_reset(&mut self);

    /// Refreshes the display.
    fn display(&mut self, _telemetry: &Telemetry) {}

    /// Sends a telemetry frame.
    fn telemetry(&mut self, _telemetry: &Telemetry) {}
}

/// Main-loop owner of setpoints, supervisor and both controllers.
pub struct Heli<T: Number> {
    config: HeliConfig<T>,
    setpoints: SetpointStore,
    machine: FlightStateMachine,
    altitude: AltitudeController<T>,
    yaw: YawController<T>,
    altitude_reading: u16,
    yaw_position: i32,
    duty: DutyCycle,
    rotors_enabled: bool,
}

impl<T: Number> Heli<T> {
    /// Validates the configuration and calibrates the altitude limits from
    /// the settled landed reading.
    pub fn new(config: HeliConfig<T>, landed_reading: u16) -> Result<Self, ConfigError> {
        config.validate().map_err(|error| {
            log_warn!("rejected configuration: {}", error);
            error
        })?;

        let setpoints = SetpointStore::init_limits(landed_reading, config.setpoint);
        let altitude = AltitudeController::with_config(config.altitude, config.dt);
        let yaw = YawController::with_config(config.yaw, config.setpoint, config.dt);
        let yaw_position = config.setpoint.yaw_initial;

        Ok(Heli {
            config,
            setpoints,
            machine: FlightStateMachine::new(),
            altitude,
            yaw,
            altitude_reading: landed_reading,
            yaw_position,
            duty: DutyCycle::default(),
            rotors_enabled: false,
        })
    }

    /// Runs one main-loop iteration.
    pub fn poll<const N: usize, Io: HeliIo>(&mut self, shared: &HeliShared<N>, io: &mut Io) {
        if shared.yaw_reference.take() {
            self.acquire_yaw_reference();
        }

        let scheduler = &shared.scheduler;
        for task in Task::ALL {
            if !scheduler.is_ready(task.index()) {
                continue;
            }
            match task {
                Task::Control => {
                    let duty = self.control(shared.sampler.mean(), shared.decoder.position());
                    io.apply_duty(duty);
                }
                Task::Supervisory => {
                    let inputs = io.read_inputs();
                    if inputs.reset {
                        io.system_reset();
                    }
                    self.supervise(&inputs);
                    io.set_rotors_enabled(self.rotors_enabled);
                }
                Task::Display => io.display(&self.telemetry()),
                Task::Telemetry => io.telemetry(&self.telemetry()),
            }
            scheduler.clear(task.index());
        }
    }

    /// Control task body: reads the sensors and runs both controllers.
    pub fn control(&mut self, altitude_reading: u16, yaw_position: i32) -> DutyCycle {
        self.altitude_reading = altitude_reading;
        self.yaw_position = yaw_position;

        let main = self
            .altitude
            .update(self.setpoints.altitude(), altitude_reading);
        let tail = self.yaw.update(
            self.setpoints.yaw(),
            yaw_position,
            main,
            self.machine.sweeping(),
        );
        self.duty = DutyCycle { main, tail };
        self.duty
    }

    /// Supervisory task body: advances the supervisor on the latest sensor
    /// snapshot and applies its effects and, in flight, the button steps.
    pub fn supervise(&mut self, inputs: &DiscreteInputs) {
        let flight_inputs = FlightInputs {
            switch_high: inputs.switch_high,
            altitude: i32::from(self.altitude_reading),
            yaw: self.yaw_position,
        };
        let effects = self.machine.update(
            &flight_inputs,
            &self.setpoints.limits(),
            &self.config.flight,
        );

        if effects.manual_control {
            if inputs.left {
                self.setpoints.dec_yaw();
            }
            if inputs.right {
                self.setpoints.inc_yaw();
            }
            if inputs.up {
                self.setpoints.inc_altitude();
            }
            if inputs.down {
                self.setpoints.dec_altitude();
            }
        }
        if let Some(altitude) = effects.altitude_setpoint {
            self.setpoints.set_altitude(altitude);
        }
        if let Some(yaw) = effects.yaw_setpoint {
            self.setpoints.set_yaw(yaw);
        }
        self.rotors_enabled = effects.rotors_enabled;
    }

    /// Consumes the yaw reference: heading zero becomes the setpoint and the
    /// supervisor stops sweeping.
    fn acquire_yaw_reference(&mut self) {
        log_debug!("yaw reference latch consumed");
        self.setpoints.set_yaw(0);
        self.machine.complete_scan();
    }

    /// Snapshot for display and telemetry.
    pub fn telemetry(&self) -> Telemetry {
        let ground = self.setpoints.limits().min_altitude;
        let full_scale = self.config.setpoint.altitude_full_scale;
        let revolution = self.config.setpoint.yaw_revolution;
        Telemetry {
            altitude_percent: altitude_percent(
                ground,
                i32::from(self.altitude_reading),
                full_scale,
            ),
            altitude_setpoint_percent: altitude_percent(
                ground,
                self.setpoints.altitude(),
                full_scale,
            ),
            yaw_centidegrees: yaw_centidegrees(self.yaw_position, revolution),
            yaw_setpoint_centidegrees: yaw_centidegrees(self.setpoints.yaw(), revolution),
            state: self.machine.state(),
            duty: self.duty,
        }
    }

    /// Supervisor state.
    pub fn state(&self) -> FlightState {
        self.machine.state()
    }

    /// Supervisor.
    pub fn machine(&self) -> &FlightStateMachine {
        &self.machine
    }

    /// Setpoints and calibration limits.
    pub fn setpoints(&self) -> &SetpointStore {
        &self.setpoints
    }

    /// Whether the rotor outputs are enabled.
    pub fn rotors_enabled(&self) -> bool {
        self.rotors_enabled
    }

    /// Last duty output.
    pub fn duty(&self) -> DutyCycle {
        self.duty
    }
}
