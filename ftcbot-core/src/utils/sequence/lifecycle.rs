//! Host-driven OpMode lifecycle as an explicit state machine.
//!
//! The robot controller runtime drives an iterative OpMode through a fixed
//! cycle: init once, optionally poll `init_loop`, start once on activation,
//! poll `tick` while active, stop once on deactivation. [`OpModeRunner`]
//! makes that cycle an explicit `{Idle, Initialized, Running, Stopped}`
//! machine and rejects out-of-order transitions instead of trusting the
//! caller.

use core::fmt;

/// Lifecycle states of an iterative OpMode. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpModeState {
    Idle,
    Initialized,
    Running,
    Stopped,
}

/// The hook set of an iterative (poll-style) OpMode.
pub trait IterativeOpMode {
    type Error: fmt::Debug;

    /// Runs once when the driver hits INIT.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Polled between INIT and PLAY.
    fn init_loop(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Runs once when the driver hits PLAY.
    fn start(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Polled while the OpMode is active.
    fn tick(&mut self) -> Result<(), Self::Error>;

    /// Runs once when the driver hits STOP.
    fn stop(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Errors from driving the lifecycle machine.
#[derive(Debug)]
pub enum LifecycleError<E> {
    /// The event is not legal in the current state.
    InvalidTransition {
        from: OpModeState,
        event: &'static str,
    },
    /// The OpMode hook itself failed.
    OpMode(E),
}

/// Drives an [`IterativeOpMode`] through its lifecycle, one explicit
/// transition call per host event.
pub struct OpModeRunner<O> {
    opmode: O,
    state: OpModeState,
}

impl<O: IterativeOpMode> OpModeRunner<O> {
    pub fn new(opmode: O) -> Self {
        Self {
            opmode,
            state: OpModeState::Idle,
        }
    }

    pub fn state(&self) -> OpModeState {
        self.state
    }

    pub fn opmode(&self) -> &O {
        &self.opmode
    }

    pub fn opmode_mut(&mut self) -> &mut O {
        &mut self.opmode
    }

    pub fn into_inner(self) -> O {
        self.opmode
    }

    /// INIT: legal only from `Idle`.
    pub fn init(&mut self) -> Result<(), LifecycleError<O::Error>> {
        match self.state {
            OpModeState::Idle => {
                self.opmode.init().map_err(LifecycleError::OpMode)?;
                self.state = OpModeState::Initialized;
                Ok(())
            }
            from => Err(LifecycleError::InvalidTransition {
                from,
                event: "init",
            }),
        }
    }

    /// Pre-start poll: legal only while `Initialized`.
    pub fn init_loop(&mut self) -> Result<(), LifecycleError<O::Error>> {
        match self.state {
            OpModeState::Initialized => self.opmode.init_loop().map_err(LifecycleError::OpMode),
            from => Err(LifecycleError::InvalidTransition {
                from,
                event: "init_loop",
            }),
        }
    }

    /// PLAY: legal only from `Initialized`.
    pub fn start(&mut self) -> Result<(), LifecycleError<O::Error>> {
        match self.state {
            OpModeState::Initialized => {
                self.opmode.start().map_err(LifecycleError::OpMode)?;
                self.state = OpModeState::Running;
                Ok(())
            }
            from => Err(LifecycleError::InvalidTransition {
                from,
                event: "start",
            }),
        }
    }

    /// Active poll: legal only while `Running`.
    pub fn tick(&mut self) -> Result<(), LifecycleError<O::Error>> {
        match self.state {
            OpModeState::Running => self.opmode.tick().map_err(LifecycleError::OpMode),
            from => Err(LifecycleError::InvalidTransition {
                from,
                event: "tick",
            }),
        }
    }

    /// STOP: legal from `Initialized` or `Running`; `Stopped` is terminal.
    pub fn stop(&mut self) -> Result<(), LifecycleError<O::Error>> {
        match self.state {
            OpModeState::Initialized | OpModeState::Running => {
                self.opmode.stop().map_err(LifecycleError::OpMode)?;
                self.state = OpModeState::Stopped;
                Ok(())
            }
            from => Err(LifecycleError::InvalidTransition {
                from,
                event: "stop",
            }),
        }
    }
}
