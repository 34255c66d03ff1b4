//! Battery-voltage compensation for open-loop power commands.
//!
//! A fully charged battery and a sagging one deliver noticeably different
//! wheel speeds for the same duty cycle. The routines sample the battery once
//! at activation, derive a multiplicative modifier from the deviation off the
//! nominal voltage, and divide the commanded power by it so delivered torque
//! stays roughly constant as the battery drains.
//!
//! # Example
//! ```rust
//! use ftcbot_core::utils::math::compensation::{compensated_power, voltage_modifier};
//! let modifier = voltage_modifier(11.5);
//! let power = compensated_power(1.0, modifier);
//! assert!((power - 1.087).abs() < 1e-3);
//! ```

/// Battery voltage the power constants were tuned at.
pub const NOMINAL_VOLTAGE: f32 = 12.5;

/// Encoder resolution of the shooter motor.
pub const SHOOTER_ENCODER_TICKS_PER_ROTATION: u32 = 28;

/// Flywheel speed the shooter is tuned for.
pub const SHOOTER_TARGET_RPM: u32 = 2150;

/// Scale factor for a battery at `measured` volts.
///
/// `1.0` at nominal, below `1.0` for a sagging battery, above for a fresh one.
pub fn voltage_modifier(measured: f32) -> f32 {
    1.0 + (measured - NOMINAL_VOLTAGE) / NOMINAL_VOLTAGE
}

/// Divide a base power by the voltage modifier.
///
/// The result is intentionally not clamped to `[-1.0, 1.0]`: a battery far
/// enough off nominal yields an out-of-range command, exactly as the robot
/// ships. Hardware bindings may still saturate at their own layer.
pub fn compensated_power(
    base: f32,
    modifier: f32,
) -> f32 {
    base / modifier
}

/// Encoder ticks per second at the shooter's target RPM.
///
/// Integer division first, matching the tuned-on-robot value (35 * 28 = 980).
pub fn shooter_ticks_per_second() -> u32 {
    (SHOOTER_TARGET_RPM / 60) * SHOOTER_ENCODER_TICKS_PER_ROTATION
}
