//! Unit tests for TOML configuration parsing.

use motion_core::config::{parse_config, ControllerConfig};
use motion_core::error::{ConfigError, Error};

/// Test parsing a complete controller configuration from TOML.
#[test]
fn test_parse_full_config() {
    let toml_str = r#"
[transport]
commands_region = "/dev/shm/bench-commands"
answers_region = "/dev/shm/bench-answers"
region_size = 4096

[protocol]
sequence_modulus = 1024

[steppers]
min_update_interval = 5e-6
enabled_mask = 0x0F

[registers]
length = 8
"#;

    let config: ControllerConfig = toml::from_str(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.transport.commands_region.as_str(), "/dev/shm/bench-commands");
    assert_eq!(config.transport.answers_region.as_str(), "/dev/shm/bench-answers");
    assert_eq!(config.transport.region_size, 4096);
    assert_eq!(config.protocol.sequence_modulus, 1024);
    assert_eq!(config.steppers.min_update_interval, 5e-6);
    assert_eq!(config.steppers.enabled_mask, 0x0F);
    assert_eq!(config.registers.length, 8);
}

/// Test that missing sections fall back to defaults.
#[test]
fn test_parse_partial_config_uses_defaults() {
    let toml_str = r#"
[steppers]
enabled_mask = 0x03
"#;

    let config = parse_config(toml_str).expect("Failed to parse TOML");
    let defaults = ControllerConfig::default();

    assert_eq!(config.steppers.enabled_mask, 0x03);
    assert_eq!(
        config.steppers.min_update_interval,
        defaults.steppers.min_update_interval
    );
    assert_eq!(config.transport, defaults.transport);
    assert_eq!(config.protocol, defaults.protocol);
    assert_eq!(config.registers, defaults.registers);
}

/// Test that an empty document is the default configuration.
#[test]
fn test_parse_empty_config() {
    let config = parse_config("").expect("Failed to parse TOML");
    assert_eq!(config, ControllerConfig::default());
}

/// Test that parsed settings reach the executor.
#[test]
fn test_executor_settings_from_config() {
    let toml_str = r#"
[protocol]
sequence_modulus = 256

[steppers]
enabled_mask = 0x81

[registers]
length = 12
"#;

    let settings = parse_config(toml_str)
        .expect("Failed to parse TOML")
        .executor_settings();

    assert_eq!(settings.sequence_modulus, 256);
    assert_eq!(settings.enabled_mask, 0x81);
    assert_eq!(settings.register_length, 12);
}

/// Test that malformed TOML is reported as a parse error.
#[test]
fn test_parse_malformed_config() {
    let result = parse_config("[steppers\nenabled_mask = 1");
    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}

/// Test that a region name longer than the name buffer is rejected.
#[test]
fn test_parse_region_name_too_long() {
    let name = "x".repeat(200);
    let toml_str = format!("[transport]\ncommands_region = \"{}\"\n", name);
    assert!(parse_config(&toml_str).is_err());
}
