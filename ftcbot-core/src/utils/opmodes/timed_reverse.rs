//! Iterative teleop with a one-way regime change.
//!
//! Drives one motor forward at constant power until 4.0 seconds have elapsed
//! since PLAY, then flips its direction exactly once and drops to a lower
//! power for the rest of the activation. There is no transition back; only a
//! host stop ends the slow-reverse regime.

use embassy_time::Duration;

use crate::utils::hardware::{DcMotor, Direction, HardwareMap, Telemetry};
use crate::utils::opmodes::OpModeError;
use crate::utils::sequence::lifecycle::IterativeOpMode;
use crate::utils::sequence::{Clock, Stopwatch};

pub const FORWARD_SPEED: f32 = 0.6;
pub const FORWARD_SLOW_SPEED: f32 = 0.3;

/// Elapsed time after which the regime change fires.
const REVERSE_AFTER: Duration = Duration::from_secs(4);

/// The two regimes of the routine. `SlowReverse` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Normal,
    SlowReverse,
}

/// One-motor teleop OpMode with a time-triggered direction flip.
pub struct TimedReverse<H: HardwareMap, C: Clock, T: Telemetry> {
    hw: H,
    telemetry: T,
    stopwatch: Stopwatch<C>,
    motor: Option<H::Motor>,
    regime: Regime,
}

impl<H, C, T> TimedReverse<H, C, T>
where
    H: HardwareMap,
    C: Clock,
    T: Telemetry,
{
    pub fn new(
        hw: H,
        clock: C,
        telemetry: T,
    ) -> Self {
        Self {
            hw,
            telemetry,
            stopwatch: Stopwatch::start(clock),
            motor: None,
            regime: Regime::Normal,
        }
    }

    pub fn regime(&self) -> Regime {
        self.regime
    }
}

impl<H, C, T> IterativeOpMode for TimedReverse<H, C, T>
where
    H: HardwareMap,
    C: Clock,
    T: Telemetry,
{
    type Error = OpModeError<H::Error>;

    fn init(&mut self) -> Result<(), Self::Error> {
        let mut motor = self.hw.dc_motor("left_drive")?;
        motor
            .set_direction(Direction::Forward)
            .map_err(OpModeError::Device)?;
        self.motor = Some(motor);
        self.telemetry.add_data("Status", format_args!("Initialized"));
        self.telemetry.update();
        Ok(())
    }

    fn start(&mut self) -> Result<(), Self::Error> {
        self.stopwatch.reset();
        Ok(())
    }

    fn tick(&mut self) -> Result<(), Self::Error> {
        self.telemetry.add_data(
            "Status",
            format_args!("Running: {:.2} s", self.stopwatch.seconds()),
        );
        self.telemetry.update();

        let motor = self.motor.as_mut().ok_or(OpModeError::NotInitialized)?;
        match self.regime {
            Regime::Normal => {
                if self.stopwatch.elapsed() >= REVERSE_AFTER {
                    // Fires exactly once; the flip is irreversible for the
                    // rest of the activation.
                    motor
                        .set_direction(Direction::Reverse)
                        .map_err(OpModeError::Device)?;
                    motor
                        .set_power(FORWARD_SLOW_SPEED)
                        .map_err(OpModeError::Device)?;
                    self.regime = Regime::SlowReverse;
                } else {
                    motor.set_power(FORWARD_SPEED).map_err(OpModeError::Device)?;
                }
            }
            Regime::SlowReverse => {
                motor
                    .set_power(FORWARD_SLOW_SPEED)
                    .map_err(OpModeError::Device)?;
            }
        }
        Ok(())
    }
}
