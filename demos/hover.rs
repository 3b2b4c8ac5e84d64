// demos/hover.rs

use tethered_heli_control::{
    DiscreteInputs, DutyCycle, Heli, HeliConfig, HeliIo, HeliShared, Telemetry, TICK_RATE_HZ,
};

/// Landed altitude reading of the toy rig.
const GROUND: u16 = 2500;

/// Encoder phases in reverse rotation order.
const PHASES: [u8; 4] = [0b00, 0b01, 0b11, 0b10];

/// Crude model of the rig: a damped mass on the altitude axis and a
/// torque-driven yaw axis with a reference mark at true heading zero.
struct ToyRig {
    height: f32,
    climb_rate: f32,
    yaw_rate: f32,
    yaw_fraction: f32,
    true_heading: i32,
    phase: usize,
}

impl ToyRig {
    fn new() -> Self {
        ToyRig {
            height: 0.0,
            climb_rate: 0.0,
            yaw_rate: 0.0,
            yaw_fraction: 0.0,
            true_heading: 150,
            phase: 0,
        }
    }

    /// Advances the model by one hardware tick and drives the interrupt
    /// handlers the real rig would trigger.
    fn step(&mut self, duty: DutyCycle, enabled: bool, shared: &HeliShared) {
        let dt = 1.0 / TICK_RATE_HZ as f32;
        let (main, tail) = if enabled {
            (f32::from(duty.main), f32::from(duty.tail))
        } else {
            (0.0, 0.0)
        };

        // Lift balances the rig's weight at 31 percent duty.
        self.climb_rate += (main - 31.0) * 400.0 * dt;
        self.climb_rate *= 0.995;
        self.height += self.climb_rate * dt;
        if self.height <= 0.0 {
            self.height = 0.0;
            self.climb_rate = 0.0;
        }

        // Tail torque against the main rotor's reaction torque.
        self.yaw_rate += (tail - 0.8 * main) * 40.0 * dt;
        self.yaw_rate *= 0.99;
        if self.height == 0.0 {
            self.yaw_rate = 0.0;
        }
        self.yaw_fraction += self.yaw_rate * dt;
        while self.yaw_fraction.abs() >= 1.0 {
            let forward = self.yaw_fraction > 0.0;
            self.yaw_fraction -= self.yaw_fraction.signum();
            self.phase = if forward {
                (self.phase + 3) % 4
            } else {
                (self.phase + 1) % 4
            };
            shared.on_quadrature_edge(PHASES[self.phase]);

            self.true_heading = (self.true_heading + if forward { 1 } else { -1 }).rem_euclid(448);
            if self.true_heading == 0 {
                shared.on_yaw_reference();
            }
        }

        let reading = (f32::from(GROUND) - self.height).clamp(0.0, 4095.0);
        shared.on_conversion(reading as u16);
    }
}

/// Operator script and collaborator callbacks.
struct DemoIo {
    time: f32,
    duty: DutyCycle,
    rotors_enabled: bool,
    pushed_up: bool,
    pushed_right: bool,
}

impl HeliIo for DemoIo {
    fn read_inputs(&mut self) -> DiscreteInputs {
        let mut inputs = DiscreteInputs {
            switch_high: (0.5..20.0).contains(&self.time),
            ..DiscreteInputs::default()
        };
        if 8.0 <= self.time && !self.pushed_up {
            inputs.up = true;
            self.pushed_up = true;
        }
        if 10.0 <= self.time && !self.pushed_right {
            inputs.right = true;
            self.pushed_right = true;
        }
        inputs
    }

    fn apply_duty(&mut self, duty: DutyCycle) {
        self.duty = duty;
    }

    fn set_rotors_enabled(&mut self, enabled: bool) {
        self.rotors_enabled = enabled;
    }

    fn system_reset(&mut self) {
        println!("reset requested");
    }

    fn telemetry(&mut self, telemetry: &Telemetry) {
        println!(
            "t = {:6.2}  {:<10}  alt {:4}% (sp {:4}%)  yaw {:8.2} (sp {:8.2})  main {:2}%  tail {:2}%",
            self.time,
            telemetry.state.name(),
            telemetry.altitude_percent,
            telemetry.altitude_setpoint_percent,
            telemetry.yaw_centidegrees as f32 / 100.0,
            telemetry.yaw_setpoint_centidegrees as f32 / 100.0,
            telemetry.duty.main,
            telemetry.duty.tail,
        );
    }
}

fn main() {
    let config = HeliConfig::<f32>::default();
    let shared: HeliShared = HeliShared::from_config(&config);

    // Settle the sample ring before calibrating.
    let mut rig = ToyRig::new();
    for _ in 0..100 {
        rig.step(DutyCycle::default(), false, &shared);
    }

    let mut heli = match Heli::new(config, shared.sampler.mean()) {
        Ok(heli) => heli,
        Err(error) => {
            eprintln!("configuration rejected: {}", error);
            return;
        }
    };

    let mut io = DemoIo {
        time: 0.0,
        duty: DutyCycle::default(),
        rotors_enabled: false,
        pushed_up: false,
        pushed_right: false,
    };

    for tick in 0..30 * TICK_RATE_HZ {
        io.time = tick as f32 / TICK_RATE_HZ as f32;
        shared.on_tick();
        rig.step(io.duty, io.rotors_enabled, &shared);
        heli.poll(&shared, &mut io);
    }
}
