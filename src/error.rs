//! Error types for motion-core.
//!
//! Provides unified error handling across the wire protocol, the shared
//! memory transport, the register bus and configuration loading.
//!
//! Timing problems (missed steps, deadline overruns) are not errors; they
//! are counted in [`crate::motion::TimingDiagnostics`].

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all motion-core operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Malformed or out-of-order protocol traffic
    Protocol(ProtocolError),
    /// Shared memory region failure
    Transport(TransportError),
    /// Register transfer failure
    Bus(BusError),
    /// Configuration parsing or validation error
    Config(ConfigError),
}

/// Protocol errors.
///
/// Always fatal to the current decode or encode pass; the host is expected
/// to resynchronize by re-opening the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// `next` was called on a decoder or encoder that is already done
    AlreadyDone,
    /// Envelope code with no entry in the dispatch table
    UnknownCode(u8),
    /// Sequenced command id does not match the expected sequence number
    SequenceGap {
        /// Sequence number the decoder was waiting for
        expected: u16,
        /// Id carried by the command
        received: u16,
    },
    /// The producer got ahead of the consumer
    QueueOverflow {
        /// Id of the rejected command
        id: u16,
    },
    /// No room left in the outgoing answer queue
    AnswerQueueFull,
    /// Pin outside of the 8-bit register masks
    InvalidPin(u8),
    /// Two moves target the same pin
    DuplicatePin(u8),
    /// Payload variant does not match the envelope code
    PayloadMismatch {
        /// Envelope code
        code: u8,
    },
    /// Movement duration, initial speed or acceleration is NaN or infinite
    NonFiniteProfile,
}

/// Shared memory transport errors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Region is already opened
    AlreadyOpen,
    /// Region is not opened
    NotOpen,
    /// Region cannot hold the packet header
    RegionTooSmall {
        /// Region size in bytes
        size: usize,
        /// Minimum size in bytes
        minimum: usize,
    },
    /// Access past the end of the region
    OutOfBounds {
        /// Offset of the access
        offset: usize,
        /// Length of the access
        length: usize,
    },
    /// Payload does not fit in the region
    PayloadTooLarge {
        /// Payload length in bytes
        length: usize,
        /// Payload capacity of the region
        capacity: usize,
    },
    /// Operating system error (std only)
    #[cfg(feature = "std")]
    Io(heapless::String<128>),
}

/// Register bus errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// SPI transfer failed
    Transfer,
    /// Chip-select or parallel-load pin operation failed
    Pin,
    /// Inbound and outbound images differ in length
    LengthMismatch {
        /// Outbound image length
        out: usize,
        /// Inbound buffer length
        input: usize,
    },
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    Parse(heapless::String<128>),
    /// Minimum update interval must be finite and > 0
    InvalidUpdateInterval(f64),
    /// Sequence modulus must be a power of two in 2..=0x8000
    InvalidSequenceModulus(u16),
    /// Register image length must be in 4..=32
    InvalidRegisterLength(usize),
    /// Region size must exceed the packet header
    InvalidRegionSize(usize),
    /// Region name is empty
    EmptyRegionName,
    /// Commands and answers share one region name
    DuplicateRegionName,
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    Io(heapless::String<128>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Protocol(e) => write!(f, "Protocol error: {}", e),
            Error::Transport(e) => write!(f, "Transport error: {}", e),
            Error::Bus(e) => write!(f, "Register bus error: {}", e),
            Error::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::AlreadyDone => write!(f, "Codec is already done"),
            ProtocolError::UnknownCode(code) => write!(f, "Unknown code 0x{:02x}", code),
            ProtocolError::SequenceGap { expected, received } => {
                write!(f, "Expected command id {}, got {}", expected, received)
            }
            ProtocolError::QueueOverflow { id } => {
                write!(f, "Command queue overflow at id {}", id)
            }
            ProtocolError::AnswerQueueFull => write!(f, "Answer queue is full"),
            ProtocolError::InvalidPin(pin) => write!(f, "Invalid pin {}. Must be 0-7", pin),
            ProtocolError::DuplicatePin(pin) => write!(f, "Pin {} appears twice in movement", pin),
            ProtocolError::PayloadMismatch { code } => {
                write!(f, "Payload does not match code 0x{:02x}", code)
            }
            ProtocolError::NonFiniteProfile => {
                write!(f, "Movement profile must be finite")
            }
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::AlreadyOpen => write!(f, "Region already opened"),
            TransportError::NotOpen => write!(f, "Region not opened"),
            TransportError::RegionTooSmall { size, minimum } => {
                write!(f, "Region of {} bytes is too small, minimum is {}", size, minimum)
            }
            TransportError::OutOfBounds { offset, length } => {
                write!(f, "Access of {} bytes at offset {} is out of bounds", length, offset)
            }
            TransportError::PayloadTooLarge { length, capacity } => {
                write!(f, "Payload of {} bytes exceeds capacity {}", length, capacity)
            }
            #[cfg(feature = "std")]
            TransportError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::Transfer => write!(f, "SPI transfer failed"),
            BusError::Pin => write!(f, "GPIO pin operation failed"),
            BusError::LengthMismatch { out, input } => {
                write!(f, "Outbound image is {} bytes but inbound buffer is {}", out, input)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidUpdateInterval(v) => {
                write!(f, "Invalid update interval: {}. Must be > 0", v)
            }
            ConfigError::InvalidSequenceModulus(v) => {
                write!(f, "Invalid sequence modulus: {}. Must be a power of two in 2-32768", v)
            }
            ConfigError::InvalidRegisterLength(v) => {
                write!(f, "Invalid register length: {}. Must be 4-32", v)
            }
            ConfigError::InvalidRegionSize(v) => write!(f, "Invalid region size: {}", v),
            ConfigError::EmptyRegionName => write!(f, "Region name is empty"),
            ConfigError::DuplicateRegionName => {
                write!(f, "Commands and answers regions must have different names")
            }
            #[cfg(feature = "std")]
            ConfigError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

// Conversion impls
impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Error::Bus(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ProtocolError {}

#[cfg(feature = "std")]
impl std::error::Error for TransportError {}

#[cfg(feature = "std")]
impl std::error::Error for BusError {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
