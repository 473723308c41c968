//! Command/answer protocol.
//!
//! Every command travels as `id: u16 | code: u8 | payload` and every answer
//! as `id: u16 | code: u8 | state: u8 | payload`, all little-endian. The
//! code selects the nested payload codec.

mod answer;
mod codes;
mod command;

pub use answer::{Answer, AnswerDecoder, AnswerEncoder, AnswerPayload};
pub use codes::{
    is_immediate, CommandCode, DEFAULT_SEQUENCE_MODULUS, IMMEDIATE_FLAG, STATE_OK, STATE_REJECTED,
};
pub use command::{Command, CommandDecoder, CommandEncoder, Payload};
