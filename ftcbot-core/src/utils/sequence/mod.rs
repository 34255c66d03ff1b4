//! Time-sliced sequencing primitives shared by every OpMode routine.
//!
//! The routines express their behavior as a declarative list of
//! [`Phase`]s (an action plus a dwell duration) executed by a single
//! [`Sequencer`] driver that samples a monotonic [`Clock`] and the host's
//! cooperative cancellation flag once per poll tick. The host-driven
//! init/start/loop/stop cycle is modeled by the state machine in
//! [`lifecycle`].

pub mod lifecycle;

use embassy_time::{Duration, Instant};

use crate::utils::hardware::Telemetry;

/// Source of monotonic time.
///
/// The routines never read the system clock directly; they sample whatever
/// clock the host hands them, so tests and simulators control time.
pub trait Clock {
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Elapsed-time counter over a [`Clock`].
///
/// Reset before each timed phase; it carries no state across resets.
pub struct Stopwatch<C: Clock> {
    clock: C,
    started: Instant,
}

impl<C: Clock> Stopwatch<C> {
    /// Start counting from the clock's current instant.
    pub fn start(clock: C) -> Self {
        let started = clock.now();
        Self { clock, started }
    }

    /// Restart the count from now.
    pub fn reset(&mut self) {
        self.started = self.clock.now();
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.now().duration_since(self.started)
    }

    /// Elapsed time as fractional seconds, for telemetry display.
    pub fn seconds(&self) -> f32 {
        self.elapsed().as_micros() as f32 / 1_000_000.0
    }
}

/// The host runtime's side of the polling contract.
///
/// `is_active` is the cooperative cancellation flag, sampled once per poll
/// tick; `idle` yields control back to the host for one tick.
pub trait Host {
    fn is_active(&self) -> bool;

    fn idle(&mut self);
}

impl<H: Host + ?Sized> Host for &mut H {
    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn idle(&mut self) {
        (**self).idle()
    }
}

/// How a phase sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every phase ran its full dwell.
    Completed,
    /// The host deactivated mid-sequence. Actuators keep whatever power was
    /// last commanded; later phases do not run.
    Cancelled,
}

/// One step of a timed sequence: apply `enter`, then dwell for `duration`.
///
/// A zero duration applies the action and falls straight through.
pub struct Phase<R, E> {
    pub label: &'static str,
    pub duration: Duration,
    pub enter: fn(&mut R) -> Result<(), E>,
}

/// The single phase driver serving all routines.
///
/// Per phase: apply the action, reset the stopwatch, then poll
/// `active && elapsed < duration`, emitting a telemetry line and yielding to
/// the host once per iteration. Cancellation is observed within one tick.
pub struct Sequencer<C, H, T> {
    clock: C,
    host: H,
    telemetry: T,
}

impl<C, H, T> Sequencer<C, H, T>
where
    C: Clock,
    H: Host,
    T: Telemetry,
{
    pub fn new(
        clock: C,
        host: H,
        telemetry: T,
    ) -> Self {
        Self {
            clock,
            host,
            telemetry,
        }
    }

    pub fn telemetry(&mut self) -> &mut T {
        &mut self.telemetry
    }

    /// Run a phase list to completion or cancellation.
    ///
    /// A device failure inside an action propagates immediately; no retries.
    pub fn run<R, E>(
        &mut self,
        robot: &mut R,
        phases: &[Phase<R, E>],
    ) -> Result<Outcome, E> {
        for phase in phases {
            if !self.host.is_active() {
                return Ok(Outcome::Cancelled);
            }
            (phase.enter)(robot)?;

            let stopwatch = Stopwatch::start(&self.clock);
            loop {
                if !self.host.is_active() {
                    return Ok(Outcome::Cancelled);
                }
                if stopwatch.elapsed() >= phase.duration {
                    break;
                }
                self.telemetry.add_data(
                    "Path",
                    format_args!("{}: {:.5} s elapsed", phase.label, stopwatch.seconds()),
                );
                self.telemetry.update();
                self.host.idle();
            }
        }
        Ok(Outcome::Completed)
    }

    /// Poll one action every tick until the host deactivates.
    pub fn run_until_inactive<R, E, F>(
        &mut self,
        robot: &mut R,
        mut tick: F,
    ) -> Result<(), E>
    where
        F: FnMut(&mut R) -> Result<(), E>,
    {
        let stopwatch = Stopwatch::start(&self.clock);
        while self.host.is_active() {
            self.telemetry.add_data(
                "Status",
                format_args!("Run Time: {:.2} s", stopwatch.seconds()),
            );
            self.telemetry.update();
            tick(robot)?;
            self.host.idle();
        }
        Ok(())
    }
}
