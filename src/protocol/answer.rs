//! Answer envelope: `id: u16 | code: u8 | state: u8 | payload`.

use crate::codec::{ByteDecoder, ByteEncoder, LeAccumulator, LeEmitter, Step};
use crate::error::ProtocolError;
use crate::payload::{InputsState, InputsStateDecoder, InputsStateEncoder};

use super::codes::{CommandCode, STATE_OK};
use super::command::Command;

/// Answer payload. Only READ_INPUTS answers carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnswerPayload {
    /// No payload beyond the state byte.
    #[default]
    Empty,
    /// Sampled inputs.
    Inputs(InputsState),
}

/// Completion report for one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Answer {
    /// Id of the originating command.
    pub id: u16,
    /// Code of the originating command.
    pub code: CommandCode,
    /// Zero on success.
    pub state: u8,
    /// Payload matching `code`.
    pub payload: AnswerPayload,
}

impl Answer {
    /// Answer without payload.
    pub fn new(id: u16, code: CommandCode, state: u8) -> Self {
        Self {
            id,
            code,
            state,
            payload: AnswerPayload::Empty,
        }
    }

    /// Answer to `command` without payload.
    pub fn to_command(command: &Command, state: u8) -> Self {
        Self::new(command.id, command.code, state)
    }

    /// Successful READ_INPUTS answer.
    pub fn inputs(id: u16, inputs: InputsState) -> Self {
        Self {
            id,
            code: CommandCode::ReadInputs,
            state: STATE_OK,
            payload: AnswerPayload::Inputs(inputs),
        }
    }

    /// Whether the command succeeded.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.state == STATE_OK
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnswerField {
    Id,
    Code,
    State,
    Payload,
    Done,
}

/// Answer encoder.
///
/// A freshly created encoder is idle (done) until [`ByteEncoder::init`]
/// loads an answer.
#[derive(Debug, Clone)]
pub struct AnswerEncoder {
    field: AnswerField,
    emitter: LeEmitter,
    answer: Option<Answer>,
    payload: Option<InputsStateEncoder>,
}

impl Default for AnswerEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerEncoder {
    /// Create an idle encoder.
    pub fn new() -> Self {
        Self {
            field: AnswerField::Done,
            emitter: LeEmitter::default(),
            answer: None,
            payload: None,
        }
    }
}

impl ByteEncoder for AnswerEncoder {
    type Input = Answer;

    fn init(&mut self, answer: Answer) -> Result<(), ProtocolError> {
        self.payload = match (answer.code, answer.payload) {
            (CommandCode::ReadInputs, AnswerPayload::Inputs(inputs)) if answer.state == STATE_OK => {
                Some(InputsStateEncoder::new(inputs))
            }
            (CommandCode::ReadInputs, AnswerPayload::Empty) if answer.state != STATE_OK => None,
            (CommandCode::ReadInputs, _) | (_, AnswerPayload::Inputs(_)) => {
                return Err(ProtocolError::PayloadMismatch {
                    code: answer.code.as_u8(),
                })
            }
            (_, AnswerPayload::Empty) => None,
        };
        self.emitter = LeEmitter::of(answer.id);
        self.answer = Some(answer);
        self.field = AnswerField::Id;
        Ok(())
    }

    fn emit(&mut self) -> Result<u8, ProtocolError> {
        let answer = self.answer.ok_or(ProtocolError::AlreadyDone)?;
        match self.field {
            AnswerField::Id => {
                let byte = self.emitter.pop().ok_or(ProtocolError::AlreadyDone)?;
                if self.emitter.is_empty() {
                    self.field = AnswerField::Code;
                }
                Ok(byte)
            }
            AnswerField::Code => {
                self.field = AnswerField::State;
                Ok(answer.code.as_u8())
            }
            AnswerField::State => {
                self.field = if self.payload.is_some() {
                    AnswerField::Payload
                } else {
                    AnswerField::Done
                };
                Ok(answer.state)
            }
            AnswerField::Payload => {
                let encoder = self.payload.as_mut().ok_or(ProtocolError::AlreadyDone)?;
                let byte = encoder.next()?;
                if encoder.done() {
                    self.payload = None;
                    self.field = AnswerField::Done;
                }
                Ok(byte)
            }
            AnswerField::Done => Err(ProtocolError::AlreadyDone),
        }
    }

    fn done(&self) -> bool {
        self.field == AnswerField::Done
    }
}

/// Answer decoder, the dual of [`AnswerEncoder`]. Used on the host side.
///
/// A READ_INPUTS answer with a success state carries an [`InputsState`];
/// every other answer ends with the state byte.
#[derive(Debug, Clone)]
pub struct AnswerDecoder {
    field: AnswerField,
    acc: LeAccumulator,
    partial: Answer,
    payload: Option<InputsStateDecoder>,
    output: Option<Answer>,
}

impl Default for AnswerDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerDecoder {
    /// Create a decoder waiting for the id.
    pub fn new() -> Self {
        let mut acc = LeAccumulator::default();
        acc.start::<u16>();
        Self {
            field: AnswerField::Id,
            acc,
            partial: Answer::new(0, CommandCode::Move, STATE_OK),
            payload: None,
            output: None,
        }
    }

    fn finish(&mut self) -> Step {
        self.output = Some(self.partial);
        self.payload = None;
        self.field = AnswerField::Done;
        Step::Done
    }
}

impl ByteDecoder for AnswerDecoder {
    type Output = Answer;

    fn step(&mut self, byte: u8) -> Result<Step, ProtocolError> {
        match self.field {
            AnswerField::Id => {
                if self.acc.push(byte) {
                    self.partial.id = self.acc.value();
                    self.field = AnswerField::Code;
                }
                Ok(Step::Pending)
            }
            AnswerField::Code => {
                self.partial.code = CommandCode::try_from(byte)?;
                self.field = AnswerField::State;
                Ok(Step::Pending)
            }
            AnswerField::State => {
                self.partial.state = byte;
                if self.partial.code == CommandCode::ReadInputs && byte == STATE_OK {
                    self.payload = Some(InputsStateDecoder::new());
                    self.field = AnswerField::Payload;
                    return Ok(Step::Pending);
                }
                Ok(self.finish())
            }
            AnswerField::Payload => {
                let decoder = self.payload.as_mut().ok_or(ProtocolError::AlreadyDone)?;
                if decoder.next(byte)?.is_done() {
                    if let Some(inputs) = decoder.take_output() {
                        self.partial.payload = AnswerPayload::Inputs(inputs);
                    }
                    return Ok(self.finish());
                }
                Ok(Step::Pending)
            }
            AnswerField::Done => Err(ProtocolError::AlreadyDone),
        }
    }

    fn done(&self) -> bool {
        self.field == AnswerField::Done
    }

    fn output(&self) -> Option<&Answer> {
        self.output.as_ref()
    }

    fn take_output(&mut self) -> Option<Answer> {
        self.output.take()
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
