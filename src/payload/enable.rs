//! Enable-steppers payload: a single pin mask byte.

use crate::codec::{ByteDecoder, ByteEncoder, Step};
use crate::error::ProtocolError;

/// Steppers to enable, one bit per pin. Cleared bits are disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnableSteppersPayload {
    /// Enabled pins.
    pub mask: u8,
}

/// Decoder for [`EnableSteppersPayload`].
#[derive(Debug, Clone, Default)]
pub struct EnableSteppersDecoder {
    output: Option<EnableSteppersPayload>,
    done: bool,
}

impl EnableSteppersDecoder {
    /// Create a decoder waiting for the mask byte.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ByteDecoder for EnableSteppersDecoder {
    type Output = EnableSteppersPayload;

    fn step(&mut self, byte: u8) -> Result<Step, ProtocolError> {
        if self.done {
            return Err(ProtocolError::AlreadyDone);
        }
        self.output = Some(EnableSteppersPayload { mask: byte });
        self.done = true;
        Ok(Step::Done)
    }

    fn done(&self) -> bool {
        self.done
    }

    fn output(&self) -> Option<&EnableSteppersPayload> {
        self.output.as_ref()
    }

    fn take_output(&mut self) -> Option<EnableSteppersPayload> {
        self.output.take()
    }

    fn reset(&mut self) {
        self.output = None;
        self.done = false;
    }
}

/// Encoder for [`EnableSteppersPayload`].
#[derive(Debug, Clone)]
pub struct EnableSteppersEncoder {
    input: EnableSteppersPayload,
    done: bool,
}

impl EnableSteppersEncoder {
    /// Create an encoder for `input`.
    pub fn new(input: EnableSteppersPayload) -> Self {
        Self { input, done: false }
    }
}

impl ByteEncoder for EnableSteppersEncoder {
    type Input = EnableSteppersPayload;

    fn init(&mut self, input: EnableSteppersPayload) -> Result<(), ProtocolError> {
        *self = Self::new(input);
        Ok(())
    }

    fn emit(&mut self) -> Result<u8, ProtocolError> {
        if self.done {
            return Err(ProtocolError::AlreadyDone);
        }
        self.done = true;
        Ok(self.input.mask)
    }

    fn done(&self) -> bool {
        self.done
    }
}
