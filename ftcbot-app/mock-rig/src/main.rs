use core::convert::Infallible;
use core::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration as StdDuration, Instant as StdInstant};

use clap::Parser;
use embassy_time::Instant;
use ftcbot_core::utils::hardware::{
    DcMotor, Direction, EncoderMotor, HardwareError, HardwareMap, RunMode, Telemetry,
    VoltageSensor,
};
use ftcbot_core::utils::opmodes::{AutoDriveShoot, AutoDriveShootConfig, ConstantDrive, TimedReverse};
use ftcbot_core::utils::sequence::lifecycle::OpModeRunner;
use ftcbot_core::utils::sequence::{Clock, Host, Sequencer};
use tracing::{error, info};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// Routine to run
    #[clap(long, value_enum, default_value = "auto")]
    routine: Routine,
    /// Simulated battery voltage (V)
    #[clap(long, default_value_t = 12.5)]
    voltage: f32,
    /// Host poll period in milliseconds
    #[clap(long, default_value_t = 20)]
    poll_ms: u64,
    /// Seconds before the host deactivates open-ended routines
    #[clap(long, default_value_t = 10.0)]
    run_for: f32,
    /// JSON file overriding the autonomous timing config
    #[clap(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Routine {
    Auto,
    TimedReverse,
    Constant,
}

/// Motor handle that logs every command instead of driving hardware.
struct SimMotor {
    name: &'static str,
}

impl DcMotor for SimMotor {
    type Error = Infallible;

    fn set_direction(&mut self, direction: Direction) -> Result<(), Infallible> {
        info!(motor = self.name, ?direction, "set_direction");
        Ok(())
    }

    fn set_power(&mut self, power: f32) -> Result<(), Infallible> {
        info!(motor = self.name, power, "set_power");
        Ok(())
    }
}

impl EncoderMotor for SimMotor {
    fn set_run_mode(&mut self, mode: RunMode) -> Result<(), Infallible> {
        info!(motor = self.name, ?mode, "set_run_mode");
        Ok(())
    }

    fn set_max_speed(&mut self, ticks_per_second: u32) -> Result<(), Infallible> {
        info!(motor = self.name, ticks_per_second, "set_max_speed");
        Ok(())
    }
}

struct SimVoltage {
    volts: f32,
}

impl VoltageSensor for SimVoltage {
    type Error = Infallible;

    fn voltage(&mut self) -> Result<f32, Infallible> {
        Ok(self.volts)
    }
}

/// Simulated hardware configuration: every name the routines use is
/// registered, so lookups only fail if a routine asks for something new.
struct SimHardware {
    volts: f32,
}

const REGISTERED_MOTORS: &[&str] = &[
    "front_right",
    "front_left",
    "back_right",
    "back_left",
    "side_sweeper",
    "back_conveyor",
    "sweeper",
    "shooter",
    "left_drive",
];

impl HardwareMap for SimHardware {
    type Error = Infallible;
    type Motor = SimMotor;
    type Voltage = SimVoltage;

    fn dc_motor(&mut self, name: &'static str) -> Result<SimMotor, HardwareError> {
        if !REGISTERED_MOTORS.contains(&name) {
            return Err(HardwareError::MissingDevice(name));
        }
        Ok(SimMotor { name })
    }

    fn voltage_sensor(&mut self, name: &'static str) -> Result<SimVoltage, HardwareError> {
        if name != "Etc Motor Controller" {
            return Err(HardwareError::MissingDevice(name));
        }
        Ok(SimVoltage { volts: self.volts })
    }
}

/// Wall-clock time through embassy-time's std driver.
#[derive(Clone, Copy)]
struct WallClock;

impl Clock for WallClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Host that sleeps one poll period per idle and deactivates at a deadline.
struct DeadlineHost {
    deadline: StdInstant,
    poll: StdDuration,
}

impl Host for DeadlineHost {
    fn is_active(&self) -> bool {
        StdInstant::now() < self.deadline
    }

    fn idle(&mut self) {
        thread::sleep(self.poll);
    }
}

/// Telemetry sink that forwards each line to the log.
struct LogTelemetry;

impl Telemetry for LogTelemetry {
    fn add_data(&mut self, key: &str, value: fmt::Arguments<'_>) {
        info!("{} | {}", key, value);
    }

    fn update(&mut self) {}
}

fn load_auto_config(opts: &Opts) -> Result<AutoDriveShootConfig, String> {
    match &opts.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("reading {}: {e}", path.display()))?;
            serde_json::from_str(&raw).map_err(|e| format!("parsing {}: {e}", path.display()))
        }
        None => Ok(AutoDriveShootConfig::default()),
    }
}

fn run(opts: Opts) -> Result<(), String> {
    let mut hw = SimHardware { volts: opts.voltage };
    let poll = StdDuration::from_millis(opts.poll_ms);
    let deadline = StdInstant::now() + StdDuration::from_secs_f32(opts.run_for);

    match opts.routine {
        Routine::Auto => {
            let config = load_auto_config(&opts)?;
            let mut auto = AutoDriveShoot::init(&mut hw, config)
                .map_err(|e| format!("init failed: {e:?}"))?;
            let host = DeadlineHost { deadline, poll };
            let mut seq = Sequencer::new(WallClock, host, LogTelemetry);
            let outcome = auto.run(&mut seq).map_err(|e| format!("run failed: {e:?}"))?;
            info!(?outcome, "autonomous finished");
        }
        Routine::TimedReverse => {
            let mut runner =
                OpModeRunner::new(TimedReverse::new(hw, WallClock, LogTelemetry));
            runner.init().map_err(|e| format!("init failed: {e:?}"))?;
            runner.start().map_err(|e| format!("start failed: {e:?}"))?;
            while StdInstant::now() < deadline {
                runner.tick().map_err(|e| format!("tick failed: {e:?}"))?;
                thread::sleep(poll);
            }
            runner.stop().map_err(|e| format!("stop failed: {e:?}"))?;
            info!("timed-reverse stopped");
        }
        Routine::Constant => {
            let mut drive =
                ConstantDrive::init(&mut hw).map_err(|e| format!("init failed: {e:?}"))?;
            let host = DeadlineHost { deadline, poll };
            let mut seq = Sequencer::new(WallClock, host, LogTelemetry);
            drive.run(&mut seq).map_err(|e| format!("run failed: {e:?}"))?;
            info!("constant drive stopped");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    match run(opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
