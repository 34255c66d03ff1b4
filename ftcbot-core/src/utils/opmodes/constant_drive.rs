//! Continuous single-motor drive.
//!
//! Commands one motor forward at constant power every poll tick, idempotent
//! over time, until the host deactivates the routine.

use crate::utils::hardware::{DcMotor, Direction, HardwareMap, Telemetry};
use crate::utils::opmodes::OpModeError;
use crate::utils::sequence::{Clock, Host, Sequencer};

pub const FORWARD_SPEED: f32 = 0.6;

/// Linear-style routine that drives `left_drive` until deactivation.
pub struct ConstantDrive<H: HardwareMap> {
    motor: H::Motor,
}

impl<H: HardwareMap> ConstantDrive<H> {
    /// Acquire the drive motor and set it forward.
    pub fn init(hw: &mut H) -> Result<Self, OpModeError<H::Error>> {
        let mut motor = hw.dc_motor("left_drive")?;
        motor
            .set_direction(Direction::Forward)
            .map_err(OpModeError::Device)?;
        Ok(Self { motor })
    }

    /// Poll the constant forward command until the host deactivates.
    pub fn run<C, Ho, T>(
        &mut self,
        seq: &mut Sequencer<C, Ho, T>,
    ) -> Result<(), OpModeError<H::Error>>
    where
        C: Clock,
        Ho: Host,
        T: Telemetry,
    {
        seq.run_until_inactive(self, |drive| drive.motor.set_power(FORWARD_SPEED))
            .map_err(OpModeError::Device)
    }
}
