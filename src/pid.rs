// src/pid.rs

//! # PID Control Module
//!
//! This module provides compute callbacks and control data structures
//! for the `piddiy` PID controllers that drive each rotor.

pub mod altitude;
pub use altitude::*;
pub mod yaw;
pub use yaw::*;
