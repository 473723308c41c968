//! Byte codec framework.
//!
//! Decoders consume exactly one byte per call and encoders produce exactly
//! one byte per call. Both keep their position between calls so a value can
//! be assembled across many control loop iterations without blocking.

mod scalar;

pub use scalar::{LeAccumulator, LeEmitter, WireScalar};

use crate::error::ProtocolError;

/// Outcome of feeding one byte to a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// More bytes are needed.
    Pending,
    /// The value is complete and available through `output()`.
    Done,
}

impl Step {
    /// Whether the value is complete.
    #[inline]
    pub fn is_done(self) -> bool {
        self == Step::Done
    }
}

/// Resumable decoder consuming one byte per call.
pub trait ByteDecoder {
    /// Assembled value.
    type Output;

    /// State transition for one input byte.
    ///
    /// Only called while the decoder is not done; use [`ByteDecoder::next`].
    fn step(&mut self, byte: u8) -> Result<Step, ProtocolError>;

    /// Whether a complete value has been assembled.
    fn done(&self) -> bool;

    /// The assembled value, once done.
    fn output(&self) -> Option<&Self::Output>;

    /// Move the assembled value out of the decoder.
    ///
    /// The decoder stays done until it is reset.
    fn take_output(&mut self) -> Option<Self::Output>;

    /// Rewind to the first field, discarding any partial value.
    fn reset(&mut self);

    /// Feed one byte.
    ///
    /// Fails with [`ProtocolError::AlreadyDone`] if the decoder is done.
    fn next(&mut self, byte: u8) -> Result<Step, ProtocolError> {
        if self.done() {
            return Err(ProtocolError::AlreadyDone);
        }
        self.step(byte)
    }
}

/// Resumable encoder producing one byte per call.
pub trait ByteEncoder {
    /// Value being encoded.
    type Input;

    /// Load a value and rewind to the first byte.
    fn init(&mut self, input: Self::Input) -> Result<(), ProtocolError>;

    /// State transition producing one output byte.
    ///
    /// Only called while the encoder is not done; use [`ByteEncoder::next`].
    fn emit(&mut self) -> Result<u8, ProtocolError>;

    /// Whether every byte has been produced.
    fn done(&self) -> bool;

    /// Produce the next byte.
    ///
    /// Fails with [`ProtocolError::AlreadyDone`] if the encoder is done.
    fn next(&mut self) -> Result<u8, ProtocolError> {
        if self.done() {
            return Err(ProtocolError::AlreadyDone);
        }
        self.emit()
    }
}

/// Feed `bytes` into `decoder` until it is done.
///
/// Returns the number of bytes consumed, which is less than `bytes.len()`
/// when the value completes early.
pub fn decode_from<D: ByteDecoder>(decoder: &mut D, bytes: &[u8]) -> Result<usize, ProtocolError> {
    let mut consumed = 0;
    for &byte in bytes {
        consumed += 1;
        if decoder.next(byte)?.is_done() {
            break;
        }
    }
    Ok(consumed)
}

/// Drain `encoder` into `out`, returning the number of bytes written.
pub fn encode_into<E: ByteEncoder>(encoder: &mut E, out: &mut [u8]) -> Result<usize, ProtocolError> {
    let mut written = 0;
    while written < out.len() && !encoder.done() {
        out[written] = encoder.next()?;
        written += 1;
    }
    Ok(written)
}
