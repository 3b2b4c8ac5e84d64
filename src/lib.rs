// src/lib.rs

//! # Tethered Twin-Rotor Helicopter Control
//!
//! This crate provides a `no_std`, no-alloc control core for a tethered
//! twin-rotor helicopter test rig. It holds altitude and yaw at commanded
//! setpoints with two independent PID loops, derives clean state from a
//! noisy analog altitude sensor and a quadrature yaw encoder, and sequences
//! takeoff and landing through a four-state supervisor.
//!
//! The pieces touched from interrupt context live in [`HeliShared`] and use
//! single-word atomics only. Everything else is owned by one [`Heli`]
//! context that the main loop drives through [`Heli::poll`].

#![no_std]
#![deny(missing_docs)]

#[macro_use]
mod log;

pub mod config;
pub mod controller;
pub mod flight_state;
pub mod heli;
pub mod pid;
pub mod scheduler;
pub mod sensor;
pub mod setpoint;
pub mod telemetry;

#[doc(inline)]
pub use config::*;
#[doc(inline)]
pub use controller::*;
#[doc(inline)]
pub use flight_state::*;
#[doc(inline)]
pub use heli::*;
#[doc(inline)]
pub use scheduler::*;
#[doc(inline)]
pub use sensor::*;
#[doc(inline)]
pub use setpoint::*;
#[doc(inline)]
pub use telemetry::*;

#[cfg(test)]
mod test_utils;
