//! # motion-core
//!
//! Control core of a stepper-motor / PWM motion controller.
//!
//! ## Features
//!
//! - **Resumable codecs**: commands and answers are decoded and encoded one
//!   byte per call, so a partial message survives across loop iterations
//! - **Ordered commands**: 15-bit sequence numbers with an immediate flag
//!   for out-of-order commands
//! - **Shared memory transport**: packet-id handshake with release/acquire
//!   ordering, one region per direction
//! - **Step generation**: closed-loop kinematics with a one-tick minimum
//!   pulse width and timing diagnostics
//! - **embedded-hal 1.0**: register image shifted over `SpiBus` with
//!   `OutputPin` chip-select and parallel-load lines
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use motion_core::{load_config, open_streams, CommandsExecutor, RegisterBus, SystemClock};
//!
//! // Load configuration from TOML
//! let config = motion_core::load_config("controller.toml")?;
//!
//! // Attach to the shared memory regions created by the host
//! let (commands, answers) = open_streams(&config.transport, false)?;
//!
//! // Drive the register chain with embedded-hal SPI and pins
//! let bus = RegisterBus::new(spi, cs_pin, pl_pin);
//! let mut executor =
//!     CommandsExecutor::new(commands, answers, bus, &config.executor_settings())?;
//!
//! // Runs until a protocol, transport or bus error
//! let error = executor.run(&mut SystemClock::new());
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables TOML loading, file-backed regions and the
//!   system clock
//! - `defmt`: Enables defmt formatting for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Core modules
pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod executor;
pub mod motion;
pub mod payload;
pub mod protocol;
pub mod transport;

// Re-exports for ergonomic API
pub use codec::{ByteDecoder, ByteEncoder, Step};
pub use commands::CommandsDecoder;
pub use config::{validate_config, ControllerConfig};
pub use error::{BusError, ConfigError, Error, ProtocolError, Result, TransportError};
pub use executor::{
    Clock, CommandsExecutor, ExecutorSettings, RegisterBus, RegisterImage, RegisterTransfer,
};
pub use motion::{PwmController, SteppersController, TimingDiagnostics};
pub use payload::{InputsState, PwmPayload, StepperMove, StepperMovementPayload};
pub use protocol::{
    Answer, AnswerDecoder, AnswerEncoder, Command, CommandCode, CommandDecoder, CommandEncoder,
};
pub use transport::{MemoryRegion, PacketStream};

// Configuration loading and OS-backed collaborators (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};
#[cfg(feature = "std")]
pub use executor::SystemClock;
#[cfg(feature = "std")]
pub use transport::{open_streams, FileRegion, HeapRegion};
