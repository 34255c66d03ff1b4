//! PWM binding for the [`DcMotor`] trait.
//!
//! Drives one motor through an `embedded-hal` PWM channel plus a direction
//! pin. The signed power command is split into a duty magnitude and a
//! direction level; the configured [`Direction`] composes with the sign of
//! the command, so a reversed motor runs backwards on positive power.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use super::{DcMotor, Direction};

/// Errors from the underlying PWM channel or direction pin.
#[derive(Debug)]
pub enum PwmMotorError<PE, DE> {
    Duty(PE),
    Pin(DE),
}

/// One motor driven by a PWM duty channel and a direction output pin.
///
/// The direction pin is low for forward rotation and high for reverse.
/// Command magnitude saturates at full duty; the sign selects the pin level.
pub struct PwmMotor<P, D> {
    pwm: P,
    dir_pin: D,
    direction: Direction,
}

impl<P, D> PwmMotor<P, D>
where
    P: SetDutyCycle,
    D: OutputPin,
{
    /// Wrap a PWM channel and direction pin. The motor starts out forward.
    pub fn new(
        pwm: P,
        dir_pin: D,
    ) -> Self {
        Self {
            pwm,
            dir_pin,
            direction: Direction::Forward,
        }
    }

    /// Release the underlying PWM channel and pin.
    pub fn release(self) -> (P, D) {
        (self.pwm, self.dir_pin)
    }
}

impl<P, D> DcMotor for PwmMotor<P, D>
where
    P: SetDutyCycle,
    D: OutputPin,
{
    type Error = PwmMotorError<P::Error, D::Error>;

    fn set_direction(
        &mut self,
        direction: Direction,
    ) -> Result<(), Self::Error> {
        self.direction = direction;
        Ok(())
    }

    fn set_power(
        &mut self,
        power: f32,
    ) -> Result<(), Self::Error> {
        let forward = (power >= 0.0) == (self.direction == Direction::Forward);
        if forward {
            self.dir_pin.set_low().map_err(PwmMotorError::Pin)?;
        } else {
            self.dir_pin.set_high().map_err(PwmMotorError::Pin)?;
        }

        let magnitude = power.abs().min(1.0);
        let duty = (magnitude * self.pwm.max_duty_cycle() as f32) as u16;
        self.pwm.set_duty_cycle(duty).map_err(PwmMotorError::Duty)
    }
}
