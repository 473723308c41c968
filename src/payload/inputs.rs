//! Inputs-state answer payload (READ_INPUTS).
//!
//! Wire layout: `pins_state: u16` followed by eight `u16` ADC values, all
//! little-endian (18 bytes).

use crate::codec::{ByteDecoder, ByteEncoder, LeAccumulator, LeEmitter, Step};
use crate::error::ProtocolError;

/// Number of ADC channels reported.
pub const ADC_CHANNELS: usize = 8;

/// Sampled inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputsState {
    /// Digital input levels, one bit per pin.
    pub pins_state: u16,
    /// Raw ADC readings.
    pub adc_values: [u16; ADC_CHANNELS],
}

impl InputsState {
    /// Inputs with the given digital levels and zeroed ADC readings.
    pub fn from_pins(pins_state: u16) -> Self {
        Self {
            pins_state,
            adc_values: [0; ADC_CHANNELS],
        }
    }
}

/// Field index: 0 is `pins_state`, `1..=ADC_CHANNELS` are ADC values.
const DONE: usize = ADC_CHANNELS + 1;

/// Decoder for [`InputsState`].
#[derive(Debug, Clone, Default)]
pub struct InputsStateDecoder {
    field: usize,
    acc: LeAccumulator,
    partial: InputsState,
    output: Option<InputsState>,
}

impl InputsStateDecoder {
    /// Create a decoder waiting for the pins state.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ByteDecoder for InputsStateDecoder {
    type Output = InputsState;

    fn step(&mut self, byte: u8) -> Result<Step, ProtocolError> {
        if self.field >= DONE {
            return Err(ProtocolError::AlreadyDone);
        }
        if self.acc.width() == 0 {
            self.acc.start::<u16>();
        }
        if !self.acc.push(byte) {
            return Ok(Step::Pending);
        }

        let value: u16 = self.acc.value();
        match self.field {
            0 => self.partial.pins_state = value,
            channel => self.partial.adc_values[channel - 1] = value,
        }
        self.field += 1;
        self.acc.start::<u16>();

        if self.field >= DONE {
            self.output = Some(self.partial);
            return Ok(Step::Done);
        }
        Ok(Step::Pending)
    }

    fn done(&self) -> bool {
        self.field >= DONE
    }

    fn output(&self) -> Option<&InputsState> {
        self.output.as_ref()
    }

    fn take_output(&mut self) -> Option<InputsState> {
        self.output.take()
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Encoder for [`InputsState`].
#[derive(Debug, Clone)]
pub struct InputsStateEncoder {
    field: usize,
    input: InputsState,
    emitter: LeEmitter,
}

impl InputsStateEncoder {
    /// Create an encoder for `input`.
    pub fn new(input: InputsState) -> Self {
        Self {
            field: 0,
            input,
            emitter: LeEmitter::of(input.pins_state),
        }
    }
}

impl ByteEncoder for InputsStateEncoder {
    type Input = InputsState;

    fn init(&mut self, input: InputsState) -> Result<(), ProtocolError> {
        *self = Self::new(input);
        Ok(())
    }

    fn emit(&mut self) -> Result<u8, ProtocolError> {
        let byte = self.emitter.pop().ok_or(ProtocolError::AlreadyDone)?;
        if self.emitter.is_empty() {
            self.field += 1;
            if self.field < DONE {
                self.emitter = LeEmitter::of(self.input.adc_values[self.field - 1]);
            }
        }
        Ok(byte)
    }

    fn done(&self) -> bool {
        self.field >= DONE
    }
}
