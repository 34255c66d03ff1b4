//! Hardware seam between the OpMode routines and the robot controller runtime.
//!
//! Actuators and sensors are registered under configuration names and handed
//! out by a [`HardwareMap`]. A lookup for an unregistered name is fatal to the
//! routine that requested it; there is no retry path. Telemetry is a
//! write-only, fire-and-forget display sink.

pub mod pwm;

use core::fmt;

/// Rotation direction of a DC motor.
///
/// Reversing a motor flips the sign convention of every subsequent power
/// command, the same way wiring it backwards would.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Run mode of a motor controller channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Open-loop: the commanded power maps directly to output duty.
    RunWithoutEncoder,
    /// Closed-loop velocity mode using the motor's encoder.
    RunUsingEncoder,
}

/// Errors raised when resolving named devices from the hardware configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareError {
    /// No device with this name exists in the active configuration.
    MissingDevice(&'static str),
}

/// A DC motor channel accepting a direction and a signed power command.
///
/// `power` is nominally in `[-1.0, 1.0]`. The trait does not clamp; whether an
/// out-of-range command saturates or misbehaves is up to the implementation.
pub trait DcMotor {
    type Error: fmt::Debug;

    fn set_direction(
        &mut self,
        direction: Direction,
    ) -> Result<(), Self::Error>;

    fn set_power(
        &mut self,
        power: f32,
    ) -> Result<(), Self::Error>;
}

/// A motor channel with encoder feedback available to the controller.
pub trait EncoderMotor: DcMotor {
    fn set_run_mode(
        &mut self,
        mode: RunMode,
    ) -> Result<(), Self::Error>;

    /// Cap the controller's velocity loop at `ticks_per_second` encoder ticks.
    fn set_max_speed(
        &mut self,
        ticks_per_second: u32,
    ) -> Result<(), Self::Error>;
}

/// A battery voltage sensor, sampled on demand.
pub trait VoltageSensor {
    type Error: fmt::Debug;

    fn voltage(&mut self) -> Result<f32, Self::Error>;
}

/// Named device lookup backed by the robot's hardware configuration.
pub trait HardwareMap {
    type Error: fmt::Debug;
    type Motor: DcMotor<Error = Self::Error>;
    type Voltage: VoltageSensor<Error = Self::Error>;

    fn dc_motor(
        &mut self,
        name: &'static str,
    ) -> Result<Self::Motor, HardwareError>;

    fn voltage_sensor(
        &mut self,
        name: &'static str,
    ) -> Result<Self::Voltage, HardwareError>;
}

/// Write-only status display. Data flows out, never back.
///
/// `add_data` stages one key/value line; `update` pushes the staged lines to
/// the driver station. Implementations may also emit immediately on
/// `add_data` and treat `update` as a no-op.
pub trait Telemetry {
    fn add_data(
        &mut self,
        key: &str,
        value: fmt::Arguments<'_>,
    );

    fn update(&mut self);
}

impl<T: Telemetry + ?Sized> Telemetry for &mut T {
    fn add_data(
        &mut self,
        key: &str,
        value: fmt::Arguments<'_>,
    ) {
        (**self).add_data(key, value)
    }

    fn update(&mut self) {
        (**self).update()
    }
}

/// Telemetry sink that discards everything.
pub struct NullTelemetry;

impl Telemetry for NullTelemetry {
    fn add_data(
        &mut self,
        _key: &str,
        _value: fmt::Arguments<'_>,
    ) {
    }

    fn update(&mut self) {}
}
