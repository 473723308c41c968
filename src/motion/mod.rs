//! Motion module for motion-core.
//!
//! Provides the stepper step generator and the software PWM, both writing
//! into the shared register image.

mod diagnostics;
mod pwm;
mod steppers;

pub use diagnostics::TimingDiagnostics;
pub use pwm::{PwmController, PWM_CHANNELS};
pub use steppers::{SteppersController, TickOutcome, DEFAULT_MIN_UPDATE_INTERVAL};
