//! Arithmetic helpers for open-loop power commands.

pub mod compensation;
