//! Autonomous drive-and-shoot sequence.
//!
//! On activation the routine samples the battery once, spins the shooter up
//! at a voltage-compensated power, drives forward for a fixed time, then
//! feeds the conveyor through an on/pause/on pattern before shutting both
//! down. Drivetrain power is deliberately *not* compensated; only the
//! shooter is. Each leg is a timed phase executed by the shared
//! [`Sequencer`] driver.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::utils::hardware::{
    DcMotor, Direction, EncoderMotor, HardwareMap, RunMode, Telemetry, VoltageSensor,
};
use crate::utils::math::compensation::{
    compensated_power, shooter_ticks_per_second, voltage_modifier,
};
use crate::utils::opmodes::OpModeError;
use crate::utils::sequence::{Clock, Host, Outcome, Phase, Sequencer};

/// Timing and power parameters of the sequence.
///
/// Defaults are the values tuned on the robot; a host can override them from
/// a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoDriveShootConfig {
    /// Initial forward drive leg (ms).
    pub drive_ms: u64,
    /// First conveyor feed (ms).
    pub conveyor_feed_ms: u64,
    /// Pause between feeds (ms).
    pub conveyor_pause_ms: u64,
    /// Final conveyor run (ms).
    pub conveyor_finish_ms: u64,
    /// Hold after shutdown before the routine returns (ms).
    pub shutdown_hold_ms: u64,
    /// Drivetrain forward power.
    pub forward_speed: f32,
    /// Conveyor power during feeds.
    pub conveyor_power: f32,
    /// Shooter base power before compensation.
    pub shooter_power: f32,
}

impl Default for AutoDriveShootConfig {
    fn default() -> Self {
        Self {
            drive_ms: 800,
            conveyor_feed_ms: 500,
            conveyor_pause_ms: 750,
            conveyor_finish_ms: 3000,
            shutdown_hold_ms: 1000,
            forward_speed: 0.6,
            conveyor_power: 0.5,
            shooter_power: 1.0,
        }
    }
}

/// The drive-and-shoot routine, bound to its acquired actuators.
pub struct AutoDriveShoot<H: HardwareMap> {
    front_left: H::Motor,
    front_right: H::Motor,
    back_left: H::Motor,
    back_right: H::Motor,
    // Acquired and configured like the rest, but never powered by this
    // particular sequence.
    #[allow(dead_code)]
    side_sweeper: H::Motor,
    #[allow(dead_code)]
    sweeper: H::Motor,
    conveyor: H::Motor,
    shooter: H::Motor,
    voltage_modifier: f32,
    config: AutoDriveShootConfig,
}

impl<H> AutoDriveShoot<H>
where
    H: HardwareMap,
    H::Motor: EncoderMotor,
{
    /// Acquire and configure every actuator, then sample the battery once.
    ///
    /// Reverses the right-side drivetrain and the sweeper, and puts the
    /// shooter in encoder velocity mode capped at twice its target tick
    /// rate. Any lookup or device failure is fatal and propagates.
    pub fn init(
        hw: &mut H,
        config: AutoDriveShootConfig,
    ) -> Result<Self, OpModeError<H::Error>> {
        let front_left = hw.dc_motor("front_left")?;
        let mut front_right = hw.dc_motor("front_right")?;
        let back_left = hw.dc_motor("back_left")?;
        let mut back_right = hw.dc_motor("back_right")?;
        let side_sweeper = hw.dc_motor("side_sweeper")?;
        let mut sweeper = hw.dc_motor("sweeper")?;
        let conveyor = hw.dc_motor("back_conveyor")?;
        let mut shooter = hw.dc_motor("shooter")?;
        let mut voltage_sensor = hw.voltage_sensor("Etc Motor Controller")?;

        front_right
            .set_direction(Direction::Reverse)
            .map_err(OpModeError::Device)?;
        back_right
            .set_direction(Direction::Reverse)
            .map_err(OpModeError::Device)?;
        sweeper
            .set_direction(Direction::Reverse)
            .map_err(OpModeError::Device)?;

        shooter
            .set_run_mode(RunMode::RunUsingEncoder)
            .map_err(OpModeError::Device)?;
        shooter
            .set_max_speed(2 * shooter_ticks_per_second())
            .map_err(OpModeError::Device)?;

        let voltage = voltage_sensor.voltage().map_err(OpModeError::Device)?;
        let modifier = voltage_modifier(voltage);
        tracing::info!(voltage, modifier, "battery sampled");

        Ok(Self {
            front_left,
            front_right,
            back_left,
            back_right,
            side_sweeper,
            sweeper,
            conveyor,
            shooter,
            voltage_modifier: modifier,
            config,
        })
    }

    /// The modifier derived from the one-time battery sample.
    pub fn voltage_modifier(&self) -> f32 {
        self.voltage_modifier
    }

    /// Execute the full sequence through the shared phase driver.
    ///
    /// On cancellation the sequencer returns within one poll tick and the
    /// remaining legs, including the shutdown commands, do not run.
    pub fn run<C, Ho, T>(
        &mut self,
        seq: &mut Sequencer<C, Ho, T>,
    ) -> Result<Outcome, OpModeError<H::Error>>
    where
        C: Clock,
        Ho: Host,
        T: Telemetry,
    {
        seq.telemetry()
            .add_data("Status", format_args!("Ready to run"));
        seq.telemetry().update();

        let phases: [Phase<Self, H::Error>; 5] = [
            Phase {
                label: "Leg 1",
                duration: Duration::from_millis(self.config.drive_ms),
                enter: Self::enter_drive,
            },
            Phase {
                label: "Conveyor feed",
                duration: Duration::from_millis(self.config.conveyor_feed_ms),
                enter: Self::enter_conveyor_feed,
            },
            Phase {
                label: "Conveyor pause",
                duration: Duration::from_millis(self.config.conveyor_pause_ms),
                enter: Self::enter_conveyor_pause,
            },
            Phase {
                label: "Conveyor finish",
                duration: Duration::from_millis(self.config.conveyor_finish_ms),
                enter: Self::enter_conveyor_finish,
            },
            Phase {
                label: "Shutdown",
                duration: Duration::from_millis(self.config.shutdown_hold_ms),
                enter: Self::enter_shutdown,
            },
        ];

        let outcome = seq.run(self, &phases).map_err(OpModeError::Device)?;
        if outcome == Outcome::Completed {
            seq.telemetry().add_data("Path", format_args!("Complete"));
            seq.telemetry().update();
        }
        Ok(outcome)
    }

    /// Shooter on at compensated power, drivetrain forward.
    fn enter_drive(&mut self) -> Result<(), H::Error> {
        self.shooter.set_power(compensated_power(
            self.config.shooter_power,
            self.voltage_modifier,
        ))?;
        self.front_left.set_power(self.config.forward_speed)?;
        self.back_left.set_power(self.config.forward_speed)?;
        self.front_right.set_power(self.config.forward_speed)?;
        self.back_right.set_power(self.config.forward_speed)?;
        Ok(())
    }

    /// Drivetrain stopped, conveyor feeding.
    fn enter_conveyor_feed(&mut self) -> Result<(), H::Error> {
        self.front_left.set_power(0.0)?;
        self.back_left.set_power(0.0)?;
        self.front_right.set_power(0.0)?;
        self.back_right.set_power(0.0)?;
        self.conveyor.set_power(self.config.conveyor_power)?;
        Ok(())
    }

    fn enter_conveyor_pause(&mut self) -> Result<(), H::Error> {
        self.conveyor.set_power(0.0)
    }

    fn enter_conveyor_finish(&mut self) -> Result<(), H::Error> {
        self.conveyor.set_power(self.config.conveyor_power)
    }

    /// Shooter and conveyor off.
    fn enter_shutdown(&mut self) -> Result<(), H::Error> {
        self.shooter.set_power(0.0)?;
        self.conveyor.set_power(0.0)?;
        Ok(())
    }
}
