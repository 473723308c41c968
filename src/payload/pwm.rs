//! PWM request payload.

use crate::codec::{ByteDecoder, ByteEncoder, LeAccumulator, LeEmitter, Step};
use crate::error::ProtocolError;

/// Fraction of a period treated as a window edge.
const PHASE_TOLERANCE: f64 = 1e-9;

/// Duty-cycle request for one PWM channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PwmPayload {
    /// Channel (0-7).
    pub pin: u8,
    /// Fraction of the period the channel is active, in `[0, 1]`.
    pub duty: f64,
    /// Period in seconds.
    pub period: f64,
}

impl Default for PwmPayload {
    fn default() -> Self {
        Self {
            pin: 0,
            duty: 0.0,
            period: 1.0,
        }
    }
}

impl PwmPayload {
    /// Create a new PWM request.
    pub fn new(pin: u8, duty: f64, period: f64) -> Self {
        Self { pin, duty, period }
    }

    /// Whether the channel output is high at `now` (seconds).
    ///
    /// Phases within a billionth of a period of an edge snap to it: a
    /// sample on an edge reads the state of the window it starts.
    pub fn is_active(&self, now: f64) -> bool {
        let cycles = now / self.period;
        let mut phase = cycles - libm::floor(cycles);
        if 1.0 - phase < PHASE_TOLERANCE {
            phase = 0.0;
        }
        phase < self.duty - PHASE_TOLERANCE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PwmField {
    Pin,
    Duty,
    Period,
    Done,
}

/// Decoder: pin (1 byte), duty (f64), period (f64).
#[derive(Debug, Clone)]
pub struct PwmDecoder {
    field: PwmField,
    acc: LeAccumulator,
    partial: PwmPayload,
    output: Option<PwmPayload>,
}

impl Default for PwmDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PwmDecoder {
    /// Create a decoder waiting for the pin byte.
    pub fn new() -> Self {
        Self {
            field: PwmField::Pin,
            acc: LeAccumulator::default(),
            partial: PwmPayload::default(),
            output: None,
        }
    }
}

impl ByteDecoder for PwmDecoder {
    type Output = PwmPayload;

    fn step(&mut self, byte: u8) -> Result<Step, ProtocolError> {
        match self.field {
            PwmField::Pin => {
                self.partial.pin = byte;
                self.acc.start::<f64>();
                self.field = PwmField::Duty;
            }
            PwmField::Duty => {
                if self.acc.push(byte) {
                    self.partial.duty = self.acc.value();
                    self.acc.start::<f64>();
                    self.field = PwmField::Period;
                }
            }
            PwmField::Period => {
                if self.acc.push(byte) {
                    self.partial.period = self.acc.value();
                    self.output = Some(self.partial);
                    self.field = PwmField::Done;
                    return Ok(Step::Done);
                }
            }
            PwmField::Done => return Err(ProtocolError::AlreadyDone),
        }
        Ok(Step::Pending)
    }

    fn done(&self) -> bool {
        self.field == PwmField::Done
    }

    fn output(&self) -> Option<&PwmPayload> {
        self.output.as_ref()
    }

    fn take_output(&mut self) -> Option<PwmPayload> {
        self.output.take()
    }

    fn reset(&mut self) {
        self.field = PwmField::Pin;
        self.partial = PwmPayload::default();
        self.output = None;
    }
}

/// Encoder, the dual of [`PwmDecoder`].
#[derive(Debug, Clone)]
pub struct PwmEncoder {
    field: PwmField,
    input: PwmPayload,
    emitter: LeEmitter,
}

impl PwmEncoder {
    /// Create an encoder for `input`.
    pub fn new(input: PwmPayload) -> Self {
        Self {
            field: PwmField::Pin,
            input,
            emitter: LeEmitter::default(),
        }
    }
}

impl ByteEncoder for PwmEncoder {
    type Input = PwmPayload;

    fn init(&mut self, input: PwmPayload) -> Result<(), ProtocolError> {
        *self = Self::new(input);
        Ok(())
    }

    fn emit(&mut self) -> Result<u8, ProtocolError> {
        match self.field {
            PwmField::Pin => {
                self.emitter = LeEmitter::of(self.input.duty);
                self.field = PwmField::Duty;
                Ok(self.input.pin)
            }
            PwmField::Duty | PwmField::Period => {
                let byte = self.emitter.pop().ok_or(ProtocolError::AlreadyDone)?;
                if self.emitter.is_empty() {
                    if self.field == PwmField::Duty {
                        self.emitter = LeEmitter::of(self.input.period);
                        self.field = PwmField::Period;
                    } else {
                        self.field = PwmField::Done;
                    }
                }
                Ok(byte)
            }
            PwmField::Done => Err(ProtocolError::AlreadyDone),
        }
    }

    fn done(&self) -> bool {
        self.field == PwmField::Done
    }
}
