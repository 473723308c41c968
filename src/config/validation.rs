//! Configuration validation.

use crate::error::{ConfigError, Error, Result};
use crate::executor::{MAX_REGISTER_BYTES, MIN_REGISTER_BYTES};
use crate::protocol::DEFAULT_SEQUENCE_MODULUS;
use crate::transport::HEADER_SIZE;

use super::{ControllerConfig, TransportConfig};

/// Validate a controller configuration.
///
/// Checks:
/// - Update interval is finite and positive
/// - Sequence modulus is a power of two that fits in 15 bits
/// - Register image length is in range
/// - Regions are named, distinct and larger than the packet header
pub fn validate_config(config: &ControllerConfig) -> Result<()> {
    validate_transport(&config.transport)?;

    let modulus = config.protocol.sequence_modulus;
    if modulus < 2 || modulus > DEFAULT_SEQUENCE_MODULUS || !modulus.is_power_of_two() {
        return Err(Error::Config(ConfigError::InvalidSequenceModulus(modulus)));
    }

    let interval = config.steppers.min_update_interval;
    if !interval.is_finite() || interval <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidUpdateInterval(interval)));
    }

    let length = config.registers.length;
    if !(MIN_REGISTER_BYTES..=MAX_REGISTER_BYTES).contains(&length) {
        return Err(Error::Config(ConfigError::InvalidRegisterLength(length)));
    }

    Ok(())
}

fn validate_transport(transport: &TransportConfig) -> Result<()> {
    if transport.commands_region.is_empty() || transport.answers_region.is_empty() {
        return Err(Error::Config(ConfigError::EmptyRegionName));
    }

    if transport.commands_region == transport.answers_region {
        return Err(Error::Config(ConfigError::DuplicateRegionName));
    }

    // Room for the header and at least one payload byte
    if transport.region_size <= HEADER_SIZE {
        return Err(Error::Config(ConfigError::InvalidRegionSize(
            transport.region_size,
        )));
    }

    Ok(())
}
