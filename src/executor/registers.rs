//! Register image exchanged with the I/O expander chain.

use crate::error::ConfigError;

/// Step pulse mask, one bit per stepper.
pub const STEP_REGISTER: usize = 0;
/// Direction mask, bit set for positive targets.
pub const DIRECTION_REGISTER: usize = 1;
/// Stepper enable mask, inverted: a cleared bit enables the driver.
pub const ENABLE_REGISTER: usize = 2;
/// PWM channel mask.
pub const PWM_REGISTER: usize = 3;

/// Smallest image holding every register above.
pub const MIN_REGISTER_BYTES: usize = 4;
/// Largest supported image.
pub const MAX_REGISTER_BYTES: usize = 32;
/// Image length of one expander group.
pub const DEFAULT_REGISTER_BYTES: usize = 6;

/// Outbound register bytes, rebuilt every tick.
///
/// Bytes past [`PWM_REGISTER`] are reserved and stay zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterImage {
    bytes: [u8; MAX_REGISTER_BYTES],
    len: usize,
}

impl Default for RegisterImage {
    fn default() -> Self {
        Self {
            bytes: [0; MAX_REGISTER_BYTES],
            len: DEFAULT_REGISTER_BYTES,
        }
    }
}

impl RegisterImage {
    /// Zeroed image of `len` bytes.
    pub fn new(len: usize) -> Result<Self, ConfigError> {
        if !(MIN_REGISTER_BYTES..=MAX_REGISTER_BYTES).contains(&len) {
            return Err(ConfigError::InvalidRegisterLength(len));
        }
        Ok(Self {
            bytes: [0; MAX_REGISTER_BYTES],
            len,
        })
    }

    /// Image length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; an image holds at least [`MIN_REGISTER_BYTES`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Register value.
    #[inline]
    pub fn get(&self, register: usize) -> u8 {
        self.bytes[register]
    }

    /// Overwrite a register.
    #[inline]
    pub fn set(&mut self, register: usize, value: u8) {
        self.bytes[register] = value;
    }

    /// Bytes sent on the bus.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}
