//! Core OpMode routines and host-runtime abstractions for a timed FTC-style robot.
//!
//! For a runnable simulation, see the `mock-rig` binary crate.
#![no_std]

pub mod utils;
