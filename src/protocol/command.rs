//! Command envelope: `id: u16 | code: u8 | payload`.

use crate::codec::{ByteDecoder, ByteEncoder, LeAccumulator, LeEmitter, Step};
use crate::error::ProtocolError;
use crate::payload::{
    EnableSteppersDecoder, EnableSteppersEncoder, EnableSteppersPayload, PwmDecoder, PwmEncoder,
    PwmPayload, StepperMovementDecoder, StepperMovementEncoder, StepperMovementPayload,
};

use super::codes::{is_immediate, CommandCode, IMMEDIATE_FLAG};

/// Command payload, one variant per payload shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    /// No payload.
    #[default]
    Empty,
    /// PWM channel configuration.
    Pwm(PwmPayload),
    /// Stepper enable mask.
    EnableSteppers(EnableSteppersPayload),
    /// Stepper movement.
    Movement(StepperMovementPayload),
}

/// Decoded command.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Bit 15: immediate flag. Bits 0-14: sequence number.
    pub id: u16,
    /// Dispatch code.
    pub code: CommandCode,
    /// Payload matching `code`.
    pub payload: Payload,
}

impl Command {
    /// READ_INPUTS command.
    pub fn read_inputs(id: u16) -> Self {
        Self {
            id,
            code: CommandCode::ReadInputs,
            payload: Payload::Empty,
        }
    }

    /// PWM command.
    pub fn pwm(id: u16, pwm: PwmPayload) -> Self {
        Self {
            id,
            code: CommandCode::Pwm,
            payload: Payload::Pwm(pwm),
        }
    }

    /// ENABLE_STEPPERS command.
    pub fn enable_steppers(id: u16, mask: u8) -> Self {
        Self {
            id,
            code: CommandCode::EnableSteppers,
            payload: Payload::EnableSteppers(EnableSteppersPayload { mask }),
        }
    }

    /// MOVE command.
    pub fn movement(id: u16, movement: StepperMovementPayload) -> Self {
        Self {
            id,
            code: CommandCode::Move,
            payload: Payload::Movement(movement),
        }
    }

    /// Same command with the immediate flag set.
    pub fn immediate(mut self) -> Self {
        self.id |= IMMEDIATE_FLAG;
        self
    }

    /// Whether the command bypasses the ordered sequence.
    #[inline]
    pub fn is_immediate(&self) -> bool {
        is_immediate(self.id)
    }

    /// Sequence number (id without the immediate flag).
    #[inline]
    pub fn sequence(&self) -> u16 {
        self.id & !IMMEDIATE_FLAG
    }
}

/// Nested payload decoder selected by the envelope code.
#[derive(Debug, Clone)]
enum PayloadDecoder {
    Pwm(PwmDecoder),
    EnableSteppers(EnableSteppersDecoder),
    Movement(StepperMovementDecoder),
}

impl PayloadDecoder {
    /// Dispatch table. `None` means the code carries no payload.
    fn for_code(code: CommandCode) -> Option<Self> {
        match code {
            CommandCode::ReadInputs => None,
            CommandCode::Pwm => Some(PayloadDecoder::Pwm(PwmDecoder::new())),
            CommandCode::EnableSteppers => {
                Some(PayloadDecoder::EnableSteppers(EnableSteppersDecoder::new()))
            }
            CommandCode::Move => Some(PayloadDecoder::Movement(StepperMovementDecoder::new())),
        }
    }

    fn next(&mut self, byte: u8) -> Result<Step, ProtocolError> {
        match self {
            PayloadDecoder::Pwm(d) => d.next(byte),
            PayloadDecoder::EnableSteppers(d) => d.next(byte),
            PayloadDecoder::Movement(d) => d.next(byte),
        }
    }

    fn take_payload(&mut self) -> Payload {
        let payload = match self {
            PayloadDecoder::Pwm(d) => d.take_output().map(Payload::Pwm),
            PayloadDecoder::EnableSteppers(d) => d.take_output().map(Payload::EnableSteppers),
            PayloadDecoder::Movement(d) => d.take_output().map(Payload::Movement),
        };
        payload.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnvelopeField {
    Id,
    Code,
    Payload,
    Done,
}

/// Command decoder.
///
/// Reads the id and the code, then forwards every following byte to the
/// payload decoder selected by the code.
#[derive(Debug, Clone)]
pub struct CommandDecoder {
    field: EnvelopeField,
    acc: LeAccumulator,
    id: u16,
    code: Option<CommandCode>,
    payload: Option<PayloadDecoder>,
    output: Option<Command>,
}

impl Default for CommandDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandDecoder {
    /// Create a decoder waiting for the id.
    pub fn new() -> Self {
        let mut acc = LeAccumulator::default();
        acc.start::<u16>();
        Self {
            field: EnvelopeField::Id,
            acc,
            id: 0,
            code: None,
            payload: None,
            output: None,
        }
    }

    /// Whether a command is partially decoded.
    pub fn in_progress(&self) -> bool {
        match self.field {
            EnvelopeField::Id => self.acc.filled() > 0,
            EnvelopeField::Code | EnvelopeField::Payload => true,
            EnvelopeField::Done => false,
        }
    }

    fn finish(&mut self, code: CommandCode, payload: Payload) -> Step {
        self.output = Some(Command {
            id: self.id,
            code,
            payload,
        });
        self.payload = None;
        self.field = EnvelopeField::Done;
        Step::Done
    }
}

impl ByteDecoder for CommandDecoder {
    type Output = Command;

    fn step(&mut self, byte: u8) -> Result<Step, ProtocolError> {
        match self.field {
            EnvelopeField::Id => {
                if self.acc.push(byte) {
                    self.id = self.acc.value();
                    self.field = EnvelopeField::Code;
                }
                Ok(Step::Pending)
            }
            EnvelopeField::Code => {
                let code = CommandCode::try_from(byte)?;
                self.code = Some(code);
                match PayloadDecoder::for_code(code) {
                    Some(decoder) => {
                        self.payload = Some(decoder);
                        self.field = EnvelopeField::Payload;
                        Ok(Step::Pending)
                    }
                    None => Ok(self.finish(code, Payload::Empty)),
                }
            }
            EnvelopeField::Payload => {
                let (Some(code), Some(decoder)) = (self.code, self.payload.as_mut()) else {
                    return Err(ProtocolError::AlreadyDone);
                };
                if decoder.next(byte)?.is_done() {
                    let payload = decoder.take_payload();
                    return Ok(self.finish(code, payload));
                }
                Ok(Step::Pending)
            }
            EnvelopeField::Done => Err(ProtocolError::AlreadyDone),
        }
    }

    fn done(&self) -> bool {
        self.field == EnvelopeField::Done
    }

    fn output(&self) -> Option<&Command> {
        self.output.as_ref()
    }

    fn take_output(&mut self) -> Option<Command> {
        self.output.take()
    }

    fn reset(&mut self) {
        self.field = EnvelopeField::Id;
        self.acc.start::<u16>();
        self.id = 0;
        self.code = None;
        self.payload = None;
        self.output = None;
    }
}

/// Nested payload encoder selected by the envelope code.
#[derive(Debug, Clone)]
enum PayloadEncoder {
    Pwm(PwmEncoder),
    EnableSteppers(EnableSteppersEncoder),
    Movement(StepperMovementEncoder),
}

impl PayloadEncoder {
    fn for_command(code: CommandCode, payload: Payload) -> Result<Option<Self>, ProtocolError> {
        match (code, payload) {
            (CommandCode::ReadInputs, Payload::Empty) => Ok(None),
            (CommandCode::Pwm, Payload::Pwm(p)) => Ok(Some(PayloadEncoder::Pwm(PwmEncoder::new(p)))),
            (CommandCode::EnableSteppers, Payload::EnableSteppers(p)) => {
                Ok(Some(PayloadEncoder::EnableSteppers(EnableSteppersEncoder::new(p))))
            }
            (CommandCode::Move, Payload::Movement(p)) => {
                Ok(Some(PayloadEncoder::Movement(StepperMovementEncoder::new(p))))
            }
            (code, _) => Err(ProtocolError::PayloadMismatch {
                code: code.as_u8(),
            }),
        }
    }

    fn next(&mut self) -> Result<u8, ProtocolError> {
        match self {
            PayloadEncoder::Pwm(e) => e.next(),
            PayloadEncoder::EnableSteppers(e) => e.next(),
            PayloadEncoder::Movement(e) => e.next(),
        }
    }

    fn done(&self) -> bool {
        match self {
            PayloadEncoder::Pwm(e) => e.done(),
            PayloadEncoder::EnableSteppers(e) => e.done(),
            PayloadEncoder::Movement(e) => e.done(),
        }
    }
}

/// Command encoder, the dual of [`CommandDecoder`]. Used on the host side.
#[derive(Debug, Clone)]
pub struct CommandEncoder {
    field: EnvelopeField,
    emitter: LeEmitter,
    code: u8,
    payload: Option<PayloadEncoder>,
}

impl Default for CommandEncoder {
    fn default() -> Self {
        Self {
            field: EnvelopeField::Done,
            emitter: LeEmitter::default(),
            code: 0,
            payload: None,
        }
    }
}

impl CommandEncoder {
    /// Create an encoder for `command`.
    pub fn new(command: Command) -> Result<Self, ProtocolError> {
        let mut encoder = Self::default();
        encoder.init(command)?;
        Ok(encoder)
    }
}

impl ByteEncoder for CommandEncoder {
    type Input = Command;

    fn init(&mut self, command: Command) -> Result<(), ProtocolError> {
        let Command { id, code, payload } = command;
        self.payload = PayloadEncoder::for_command(code, payload)?;
        self.code = code.as_u8();
        self.emitter = LeEmitter::of(id);
        self.field = EnvelopeField::Id;
        Ok(())
    }

    fn emit(&mut self) -> Result<u8, ProtocolError> {
        match self.field {
            EnvelopeField::Id => {
                let byte = self.emitter.pop().ok_or(ProtocolError::AlreadyDone)?;
                if self.emitter.is_empty() {
                    self.field = EnvelopeField::Code;
                }
                Ok(byte)
            }
            EnvelopeField::Code => {
                self.field = match &self.payload {
                    Some(p) if !p.done() => EnvelopeField::Payload,
                    _ => EnvelopeField::Done,
                };
                Ok(self.code)
            }
            EnvelopeField::Payload => {
                let encoder = self.payload.as_mut().ok_or(ProtocolError::AlreadyDone)?;
                let byte = encoder.next()?;
                if encoder.done() {
                    self.payload = None;
                    self.field = EnvelopeField::Done;
                }
                Ok(byte)
            }
            EnvelopeField::Done => Err(ProtocolError::AlreadyDone),
        }
    }

    fn done(&self) -> bool {
        self.field == EnvelopeField::Done
    }
}
