//! Controller configuration - root configuration structure.

use heapless::String;
use serde::Deserialize;

use crate::executor::{ExecutorSettings, DEFAULT_REGISTER_BYTES};
use crate::motion::DEFAULT_MIN_UPDATE_INTERVAL;
use crate::protocol::DEFAULT_SEQUENCE_MODULUS;

/// Maximum length of a region name.
pub const REGION_NAME_LEN: usize = 64;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct ControllerConfig {
    /// Shared memory regions.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Wire protocol settings.
    #[serde(default)]
    pub protocol: ProtocolConfig,

    /// Step generator settings.
    #[serde(default)]
    pub steppers: SteppersConfig,

    /// Register image settings.
    #[serde(default)]
    pub registers: RegistersConfig,
}

impl ControllerConfig {
    /// Settings for [`crate::executor::CommandsExecutor::new`].
    pub fn executor_settings(&self) -> ExecutorSettings {
        ExecutorSettings {
            sequence_modulus: self.protocol.sequence_modulus,
            min_update_interval: self.steppers.min_update_interval,
            enabled_mask: self.steppers.enabled_mask,
            register_length: self.registers.length,
        }
    }
}

/// Shared memory regions, one per direction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransportConfig {
    /// Region carrying commands from the host.
    #[serde(default = "default_commands_region")]
    pub commands_region: String<REGION_NAME_LEN>,

    /// Region carrying answers to the host.
    #[serde(default = "default_answers_region")]
    pub answers_region: String<REGION_NAME_LEN>,

    /// Size of each region in bytes, header included.
    #[serde(default = "default_region_size")]
    pub region_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            commands_region: default_commands_region(),
            answers_region: default_answers_region(),
            region_size: default_region_size(),
        }
    }
}

fn default_commands_region() -> String<REGION_NAME_LEN> {
    String::try_from("/dev/shm/motion-commands").unwrap_or_default()
}

fn default_answers_region() -> String<REGION_NAME_LEN> {
    String::try_from("/dev/shm/motion-answers").unwrap_or_default()
}

fn default_region_size() -> usize {
    1_000_000
}

/// Wire protocol settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProtocolConfig {
    /// Modulus of the sequence number carried in bits 0-14 of the id.
    #[serde(default = "default_sequence_modulus")]
    pub sequence_modulus: u16,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            sequence_modulus: default_sequence_modulus(),
        }
    }
}

fn default_sequence_modulus() -> u16 {
    DEFAULT_SEQUENCE_MODULUS
}

/// Step generator settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SteppersConfig {
    /// Minimum interval between two ticks, in seconds.
    #[serde(default = "default_min_update_interval")]
    pub min_update_interval: f64,

    /// Steppers enabled at startup, one bit per pin.
    #[serde(default = "default_enabled_mask")]
    pub enabled_mask: u8,
}

impl Default for SteppersConfig {
    fn default() -> Self {
        Self {
            min_update_interval: default_min_update_interval(),
            enabled_mask: default_enabled_mask(),
        }
    }
}

fn default_min_update_interval() -> f64 {
    DEFAULT_MIN_UPDATE_INTERVAL
}

fn default_enabled_mask() -> u8 {
    0xFF
}

/// Register image settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegistersConfig {
    /// Bytes exchanged with the bus per tick.
    #[serde(default = "default_register_length")]
    pub length: usize,
}

impl Default for RegistersConfig {
    fn default() -> Self {
        Self {
            length: default_register_length(),
        }
    }
}

fn default_register_length() -> usize {
    DEFAULT_REGISTER_BYTES
}
