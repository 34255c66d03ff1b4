//! Utility re-exports for the robot OpMode library.
//!
//! This module groups the hardware seam, timing, compensation math, and the
//! OpMode routines themselves:
//!
//! - `hardware`: motor, voltage-sensor, and telemetry traits plus the PWM motor binding
//! - `math`: battery-voltage compensation arithmetic
//! - `sequence`: stopwatch, phase driver, and the OpMode lifecycle state machine
//! - `opmodes`: the three timed routines (autonomous drive-and-shoot, timed
//!   reverse teleop, constant drive)

pub mod hardware;
pub mod math;
pub mod opmodes;
pub mod sequence;

pub use embassy_time::*;
pub use hardware::{HardwareMap, Telemetry};
pub use sequence::{Sequencer, Stopwatch};
