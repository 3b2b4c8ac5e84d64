// src/sensor.rs

//! # Sensor Processing
//!
//! Interrupt-fed sensor state. Each type is written from exactly one
//! interrupt source and read from the main loop, using single-word atomic
//! loads and stores only, so the types work as `static` items on cores
//! without compare-and-swap.

mod altitude;
pub use altitude::*;
mod yaw;
pub use yaw::*;
