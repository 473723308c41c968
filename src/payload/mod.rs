//! Payload types and their codecs.
//!
//! Every payload carried by a command or an answer envelope has a decoder
//! and an encoder built on the [`crate::codec`] framework.

mod enable;
mod inputs;
mod movement;
mod pwm;

pub use enable::{EnableSteppersDecoder, EnableSteppersEncoder, EnableSteppersPayload};
pub use inputs::{InputsState, InputsStateDecoder, InputsStateEncoder, ADC_CHANNELS};
pub use movement::{
    StepperMove, StepperMovementDecoder, StepperMovementEncoder, StepperMovementPayload, MAX_MOVES,
};
pub use pwm::{PwmDecoder, PwmEncoder, PwmPayload};
