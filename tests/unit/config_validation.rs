//! Unit tests for configuration validation.

use motion_core::config::{parse_config, validate_config, ControllerConfig};
use motion_core::error::{ConfigError, Error};

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let toml_str = r#"
[transport]
commands_region = "/dev/shm/a"
answers_region = "/dev/shm/b"
region_size = 64

[protocol]
sequence_modulus = 0x8000
"#;

    let config = parse_config(toml_str).expect("Failed to parse TOML");
    assert!(validate_config(&config).is_ok());
}

/// Test validation fails when both directions share one region.
#[test]
fn test_shared_region_name_rejected() {
    let toml_str = r#"
[transport]
commands_region = "/dev/shm/motion"
answers_region = "/dev/shm/motion"
"#;

    let config: ControllerConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::DuplicateRegionName))
    );
}

/// Test validation fails for an empty region name.
#[test]
fn test_empty_region_name_rejected() {
    let toml_str = r#"
[transport]
answers_region = ""
"#;

    let config: ControllerConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::EmptyRegionName))
    );
}

/// Test validation fails for a region that only fits the header.
#[test]
fn test_header_sized_region_rejected() {
    let mut config = ControllerConfig::default();
    config.transport.region_size = 8;
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidRegionSize(8)))
    );

    config.transport.region_size = 9;
    assert!(validate_config(&config).is_ok());
}

/// Test validation fails for a sequence modulus that is not a power of two.
#[test]
fn test_invalid_sequence_modulus() {
    let toml_str = "[protocol]\nsequence_modulus = 1000\n";

    let config: ControllerConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidSequenceModulus(1000)))
    );
    assert_eq!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::InvalidSequenceModulus(1000)))
    );
}

/// Test validation fails for a zero or negative update interval.
#[test]
fn test_invalid_update_interval() {
    for interval in [0.0, -1e-6] {
        let mut config = ControllerConfig::default();
        config.steppers.min_update_interval = interval;
        assert_eq!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidUpdateInterval(interval)))
        );
    }
}

/// Test validation of the register image length bounds.
#[test]
fn test_register_length_bounds() {
    let mut config = ControllerConfig::default();
    for length in [4, 6, 32] {
        config.registers.length = length;
        assert!(validate_config(&config).is_ok());
    }
    for length in [0, 3, 33] {
        config.registers.length = length;
        assert_eq!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidRegisterLength(length)))
        );
    }
}
