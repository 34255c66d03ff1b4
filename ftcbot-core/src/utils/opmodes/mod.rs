//! The robot's OpMode routines.
//!
//! - `auto_drive_shoot`: voltage-compensated autonomous drive-and-shoot sequence
//! - `timed_reverse`: iterative teleop with a one-way regime change at 4 s
//! - `constant_drive`: continuous forward drive until the host deactivates
//!
//! All three share the same failure posture: a missing device or a device
//! fault aborts the routine through normal error propagation; there are no
//! retries and no recovery.

pub mod auto_drive_shoot;
pub mod constant_drive;
pub mod timed_reverse;

pub use auto_drive_shoot::{AutoDriveShoot, AutoDriveShootConfig};
pub use constant_drive::ConstantDrive;
pub use timed_reverse::TimedReverse;

use crate::utils::hardware::HardwareError;

/// Errors surfaced by an OpMode routine.
#[derive(Debug)]
pub enum OpModeError<E> {
    /// A named actuator or sensor is absent from the hardware configuration.
    Hardware(HardwareError),
    /// An acquired device failed a command.
    Device(E),
    /// A hook ran before `init` acquired the hardware.
    NotInitialized,
}

impl<E> From<HardwareError> for OpModeError<E> {
    fn from(err: HardwareError) -> Self {
        OpModeError::Hardware(err)
    }
}
