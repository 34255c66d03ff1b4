use core::convert::Infallible;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embassy_time::Instant;
use ftcbot_core::utils::hardware::{
    DcMotor, Direction, EncoderMotor, HardwareError, HardwareMap, NullTelemetry, RunMode,
    VoltageSensor,
};
use ftcbot_core::utils::opmodes::{
    AutoDriveShoot, AutoDriveShootConfig, ConstantDrive, OpModeError, TimedReverse,
};
use ftcbot_core::utils::sequence::lifecycle::{OpModeRunner, OpModeState};
use ftcbot_core::utils::sequence::{Clock, Host, Outcome, Sequencer};

/// Everything the routines command on the hardware, in order.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Direction(&'static str, Direction),
    Power(&'static str, f32),
    RunMode(&'static str, RunMode),
    MaxSpeed(&'static str, u32),
}

type Log = Rc<RefCell<Vec<Command>>>;

struct SimMotor {
    name: &'static str,
    log: Log,
}

impl DcMotor for SimMotor {
    type Error = Infallible;

    fn set_direction(
        &mut self,
        direction: Direction,
    ) -> Result<(), Infallible> {
        self.log
            .borrow_mut()
            .push(Command::Direction(self.name, direction));
        Ok(())
    }

    fn set_power(
        &mut self,
        power: f32,
    ) -> Result<(), Infallible> {
        self.log.borrow_mut().push(Command::Power(self.name, power));
        Ok(())
    }
}

impl EncoderMotor for SimMotor {
    fn set_run_mode(
        &mut self,
        mode: RunMode,
    ) -> Result<(), Infallible> {
        self.log.borrow_mut().push(Command::RunMode(self.name, mode));
        Ok(())
    }

    fn set_max_speed(
        &mut self,
        ticks_per_second: u32,
    ) -> Result<(), Infallible> {
        self.log
            .borrow_mut()
            .push(Command::MaxSpeed(self.name, ticks_per_second));
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

/// Hardware map with a fixed set of registered names.
struct SimHardware {
    log: Log,
    volts: f32,
    names: &'static [&'static str],
}

impl SimHardware {
    fn new(volts: f32) -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            volts,
            names: &[
                "front_right",
                "front_left",
                "back_right",
                "back_left",
                "side_sweeper",
                "back_conveyor",
                "sweeper",
                "shooter",
                "left_drive",
            ],
        }
    }
}

impl HardwareMap for SimHardware {
    type Error = Infallible;
    type Motor = SimMotor;
    type Voltage = SimVoltage;

    fn dc_motor(
        &mut self,
        name: &'static str,
    ) -> Result<SimMotor, HardwareError> {
        if !self.names.contains(&name) {
            return Err(HardwareError::MissingDevice(name));
        }
        Ok(SimMotor {
            name,
            log: self.log.clone(),
        })
    }

    fn voltage_sensor(
        &mut self,
        name: &'static str,
    ) -> Result<SimVoltage, HardwareError> {
        if name != "Etc Motor Controller" {
            return Err(HardwareError::MissingDevice(name));
        }
        Ok(SimVoltage { volts: self.volts })
    }
}

#[derive(Clone)]
struct TestClock {
    micros: Rc<Cell<u64>>,
}

impl TestClock {
    fn new() -> Self {
        Self {
            micros: Rc::new(Cell::new(0)),
        }
    }

    fn advance_ms(
        &self,
        ms: u64,
    ) {
        self.micros.set(self.micros.get() + ms * 1000);
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        Instant::from_micros(self.micros.get())
    }
}

/// Host whose idle advances the shared clock by one poll period and whose
/// active flag drops at a fixed instant.
struct TestHost {
    clock: TestClock,
    step_ms: u64,
    active_until_ms: u64,
}

impl Host for TestHost {
    fn is_active(&self) -> bool {
        self.clock.micros.get() < self.active_until_ms * 1000
    }

    fn idle(&mut self) {
        self.clock.advance_ms(self.step_ms);
    }
}

fn powers_for<'a>(
    log: &'a [Command],
    name: &str,
) -> Vec<f32> {
    log.iter()
        .filter_map(|c| match c {
            Command::Power(n, p) if *n == name => Some(*p),
            _ => None,
        })
        .collect()
}

#[test]
fn test_auto_init_configures_directions_and_shooter() {
    let mut hw = SimHardware::new(12.5);
    let auto = AutoDriveShoot::init(&mut hw, AutoDriveShootConfig::default()).unwrap();
    assert!((auto.voltage_modifier() - 1.0).abs() < 1e-6);

    let log = hw.log.borrow();
    assert_eq!(
        &log[..],
        &[
            Command::Direction("front_right", Direction::Reverse),
            Command::Direction("back_right", Direction::Reverse),
            Command::Direction("sweeper", Direction::Reverse),
            Command::RunMode("shooter", RunMode::RunUsingEncoder),
            Command::MaxSpeed("shooter", 1960),
        ]
    );
}

#[test]
fn test_auto_full_sequence_at_nominal_voltage() {
    let mut hw = SimHardware::new(12.5);
    let mut auto = AutoDriveShoot::init(&mut hw, AutoDriveShootConfig::default()).unwrap();
    hw.log.borrow_mut().clear();

    let clock = TestClock::new();
    let host = TestHost {
        clock: clock.clone(),
        step_ms: 50,
        active_until_ms: u64::MAX / 1000,
    };
    let mut seq = Sequencer::new(clock.clone(), host, NullTelemetry);
    let outcome = auto.run(&mut seq).unwrap();
    assert_eq!(outcome, Outcome::Completed);

    let log = hw.log.borrow();
    // Leg 1: compensated shooter first, then all four drivetrain motors at
    // the same forward power.
    assert_eq!(log[0], Command::Power("shooter", 1.0));
    for (i, name) in ["front_left", "back_left", "front_right", "back_right"]
        .into_iter()
        .enumerate()
    {
        assert_eq!(log[1 + i], Command::Power(name, 0.6));
    }
    // Drivetrain zeroed at the leg boundary, then the conveyor pattern
    // strictly on/pause/on, then shooter and conveyor shut down.
    for (i, name) in ["front_left", "back_left", "front_right", "back_right"]
        .into_iter()
        .enumerate()
    {
        assert_eq!(log[5 + i], Command::Power(name, 0.0));
    }
    assert_eq!(
        &log[9..],
        &[
            Command::Power("back_conveyor", 0.5),
            Command::Power("back_conveyor", 0.0),
            Command::Power("back_conveyor", 0.5),
            Command::Power("shooter", 0.0),
            Command::Power("back_conveyor", 0.0),
        ]
    );
    // Full dwell: 800 + 500 + 750 + 3000 + 1000 ms.
    assert_eq!(clock.micros.get(), 6_050_000);
}

#[test]
fn test_auto_compensates_shooter_only() {
    let mut hw = SimHardware::new(11.5);
    let mut auto = AutoDriveShoot::init(&mut hw, AutoDriveShootConfig::default()).unwrap();
    // The one-time battery sample flows through the voltage sensor into the
    // stored modifier.
    assert!((auto.voltage_modifier() - 0.92).abs() < 1e-6);
    hw.log.borrow_mut().clear();

    let clock = TestClock::new();
    let host = TestHost {
        clock: clock.clone(),
        step_ms: 50,
        active_until_ms: u64::MAX / 1000,
    };
    let mut seq = Sequencer::new(clock, host, NullTelemetry);
    auto.run(&mut seq).unwrap();

    let log = hw.log.borrow();
    let shooter = powers_for(&log, "shooter");
    // 1.0 / 0.92: above full power and not clamped.
    assert!((shooter[0] - 1.0869565).abs() < 1e-4);
    // Drivetrain power is untouched by the modifier.
    assert_eq!(powers_for(&log, "front_left")[0], 0.6);
}

#[test]
fn test_auto_cancellation_skips_shutdown() {
    let mut hw = SimHardware::new(12.5);
    let mut auto = AutoDriveShoot::init(&mut hw, AutoDriveShootConfig::default()).unwrap();
    hw.log.borrow_mut().clear();

    let clock = TestClock::new();
    // Deactivate 300 ms into the 800 ms drive leg.
    let host = TestHost {
        clock: clock.clone(),
        step_ms: 50,
        active_until_ms: 300,
    };
    let mut seq = Sequencer::new(clock.clone(), host, NullTelemetry);
    let outcome = auto.run(&mut seq).unwrap();
    assert_eq!(outcome, Outcome::Cancelled);

    let log = hw.log.borrow();
    // Only the drive-leg commands ran; the drivetrain is still powered and
    // no zeroing or shutdown command was ever issued.
    assert_eq!(log.len(), 5);
    assert!(powers_for(&log, "front_left").iter().all(|&p| p == 0.6));
    assert!(powers_for(&log, "back_conveyor").is_empty());
    // The wait exited within one poll tick of deactivation.
    assert_eq!(clock.micros.get(), 300_000);
}

#[test]
fn test_auto_missing_device_is_fatal() {
    struct EmptyHardware;
    impl HardwareMap for EmptyHardware {
        type Error = Infallible;
        type Motor = SimMotor;
        type Voltage = SimVoltage;

        fn dc_motor(
            &mut self,
            name: &'static str,
        ) -> Result<SimMotor, HardwareError> {
            Err(HardwareError::MissingDevice(name))
        }

        fn voltage_sensor(
            &mut self,
            name: &'static str,
        ) -> Result<SimVoltage, HardwareError> {
            Err(HardwareError::MissingDevice(name))
        }
    }

    let result = AutoDriveShoot::init(&mut EmptyHardware, AutoDriveShootConfig::default());
    assert!(matches!(
        result,
        Err(OpModeError::Hardware(HardwareError::MissingDevice(
            "front_left"
        )))
    ));
}

#[test]
fn test_timed_reverse_regime_change() {
    let hw = SimHardware::new(12.5);
    let log = hw.log.clone();
    let clock = TestClock::new();
    let mut runner = OpModeRunner::new(TimedReverse::new(hw, clock.clone(), NullTelemetry));

    runner.init().unwrap();
    runner.start().unwrap();

    // 500 ms poll period: eight ticks under the threshold.
    for _ in 0..8 {
        runner.tick().unwrap();
        clock.advance_ms(500);
    }
    {
        let log = log.borrow();
        let powers = powers_for(&log, "left_drive");
        assert_eq!(powers.len(), 8);
        assert!(powers.iter().all(|&p| p == 0.6));
    }

    // From 4.0 s on: one irreversible flip, then 0.3 every tick.
    for _ in 0..8 {
        runner.tick().unwrap();
        clock.advance_ms(500);
    }
    let log = log.borrow();
    let reversals = log
        .iter()
        .filter(|c| matches!(c, Command::Direction("left_drive", Direction::Reverse)))
        .count();
    assert_eq!(reversals, 1);
    let powers = powers_for(&log, "left_drive");
    assert_eq!(powers.len(), 16);
    assert!(powers[8..].iter().all(|&p| p == 0.3));
}

#[test]
fn test_timed_reverse_lifecycle_is_enforced() {
    let hw = SimHardware::new(12.5);
    let clock = TestClock::new();
    let mut runner = OpModeRunner::new(TimedReverse::new(hw, clock, NullTelemetry));

    assert!(runner.tick().is_err());
    assert!(runner.start().is_err());
    runner.init().unwrap();
    assert_eq!(runner.state(), OpModeState::Initialized);
    runner.init_loop().unwrap();
    runner.start().unwrap();
    runner.tick().unwrap();
    runner.stop().unwrap();
    assert_eq!(runner.state(), OpModeState::Stopped);
    assert!(runner.tick().is_err());
}

#[test]
fn test_constant_drive_runs_until_deactivation() {
    let mut hw = SimHardware::new(12.5);
    let mut drive = ConstantDrive::init(&mut hw).unwrap();

    let clock = TestClock::new();
    let host = TestHost {
        clock: clock.clone(),
        step_ms: 20,
        active_until_ms: 100,
    };
    let mut seq = Sequencer::new(clock, host, NullTelemetry);
    drive.run(&mut seq).unwrap();

    let log = hw.log.borrow();
    assert_eq!(log[0], Command::Direction("left_drive", Direction::Forward));
    let powers = powers_for(&log, "left_drive");
    // Five 20 ms ticks inside the 100 ms activation, identical every time.
    assert_eq!(powers.len(), 5);
    assert!(powers.iter().all(|&p| p == 0.6));
}

mod pwm_binding {
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::pwm::{Mock as PwmMock, Transaction as PwmTransaction};
    use ftcbot_core::utils::hardware::pwm::PwmMotor;
    use ftcbot_core::utils::hardware::{DcMotor, Direction};

    #[test]
    fn test_forward_power_maps_to_duty() {
        let pwm_expectations = [
            PwmTransaction::max_duty_cycle(100),
            PwmTransaction::set_duty_cycle(60),
        ];
        let pin_expectations = [PinTransaction::set(PinState::Low)];
        let mut motor = PwmMotor::new(
            PwmMock::new(&pwm_expectations),
            PinMock::new(&pin_expectations),
        );

        motor.set_power(0.6).unwrap();

        let (mut pwm, mut pin) = motor.release();
        pwm.done();
        pin.done();
    }

    #[test]
    fn test_reversed_motor_flips_pin_level() {
        let pwm_expectations = [
            PwmTransaction::max_duty_cycle(100),
            PwmTransaction::set_duty_cycle(60),
        ];
        let pin_expectations = [PinTransaction::set(PinState::High)];
        let mut motor = PwmMotor::new(
            PwmMock::new(&pwm_expectations),
            PinMock::new(&pin_expectations),
        );

        motor.set_direction(Direction::Reverse).unwrap();
        motor.set_power(0.6).unwrap();

        let (mut pwm, mut pin) = motor.release();
        pwm.done();
        pin.done();
    }

    #[test]
    fn test_negative_power_runs_backwards() {
        let pwm_expectations = [
            PwmTransaction::max_duty_cycle(100),
            PwmTransaction::set_duty_cycle(25),
        ];
        let pin_expectations = [PinTransaction::set(PinState::High)];
        let mut motor = PwmMotor::new(
            PwmMock::new(&pwm_expectations),
            PinMock::new(&pin_expectations),
        );

        motor.set_power(-0.25).unwrap();

        let (mut pwm, mut pin) = motor.release();
        pwm.done();
        pin.done();
    }

    #[test]
    fn test_overrange_command_saturates_at_full_duty() {
        let pwm_expectations = [
            PwmTransaction::max_duty_cycle(100),
            PwmTransaction::set_duty_cycle(100),
        ];
        let pin_expectations = [PinTransaction::set(PinState::Low)];
        let mut motor = PwmMotor::new(
            PwmMock::new(&pwm_expectations),
            PinMock::new(&pin_expectations),
        );

        // A compensated command can exceed 1.0; the duty layer saturates.
        motor.set_power(1.5).unwrap();

        let (mut pwm, mut pin) = motor.release();
        pwm.done();
        pin.done();
    }
}
