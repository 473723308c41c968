//! Commands executor and its hardware seams.
//!
//! The executor owns the register image, exchanges it with a
//! [`RegisterTransfer`] implementation every tick and is paced by a
//! [`Clock`].

mod bus;
mod clock;
mod control;
mod registers;

pub use bus::{RegisterBus, RegisterTransfer};
#[cfg(feature = "std")]
pub use clock::SystemClock;
pub use clock::Clock;
pub use control::{CommandsExecutor, ExecutorSettings};
pub use registers::{
    RegisterImage, DEFAULT_REGISTER_BYTES, DIRECTION_REGISTER, ENABLE_REGISTER,
    MAX_REGISTER_BYTES, MIN_REGISTER_BYTES, PWM_REGISTER, STEP_REGISTER,
};
