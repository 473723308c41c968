//! Command codes and answer states.

use crate::error::ProtocolError;

/// Bit 15 of a command id: executed out of order.
pub const IMMEDIATE_FLAG: u16 = 0x8000;

/// Default modulus of the sequence number carried in bits 0-14.
pub const DEFAULT_SEQUENCE_MODULUS: u16 = 0x8000;

/// Answer state: command executed.
pub const STATE_OK: u8 = 0;

/// Answer state: command refused by the executor.
pub const STATE_REJECTED: u8 = 1;

/// Codes with an entry in the dispatch table.
///
/// The remaining codes of the wire protocol (stop, pause, resume,
/// precision, capabilities, end-stops, homing) are reserved and decode as
/// [`ProtocolError::UnknownCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CommandCode {
    /// Sample digital and analog inputs. No command payload.
    ReadInputs = 0x05,
    /// Configure one PWM channel.
    Pwm = 0x08,
    /// Set the stepper enable mask.
    EnableSteppers = 0x09,
    /// Multi-pin stepper movement.
    Move = 0x0A,
}

impl CommandCode {
    /// Wire value.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for CommandCode {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x05 => Ok(CommandCode::ReadInputs),
            0x08 => Ok(CommandCode::Pwm),
            0x09 => Ok(CommandCode::EnableSteppers),
            0x0A => Ok(CommandCode::Move),
            other => Err(ProtocolError::UnknownCode(other)),
        }
    }
}

/// Whether `id` carries the immediate flag.
#[inline]
pub fn is_immediate(id: u16) -> bool {
    id & IMMEDIATE_FLAG != 0
}
