//! Configuration module for motion-core.
//!
//! Provides the controller configuration, loaded from TOML files (with the
//! `std` feature) or built in code.

mod controller;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use controller::{
    ControllerConfig, ProtocolConfig, RegistersConfig, SteppersConfig, TransportConfig,
    REGION_NAME_LEN,
};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};
