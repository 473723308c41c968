//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::{validate_config, ControllerConfig};

/// Read and parse a controller configuration file.
///
/// ```rust,ignore
/// let config = motion_core::load_config("/etc/motion/controller.toml")?;
/// let settings = config.executor_settings();
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ControllerConfig> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(text) => parse_config(&text),
        Err(e) => {
            log::error!("cannot read {}: {}", path.display(), e);
            Err(ConfigError::Io(bounded(&e.to_string())).into())
        }
    }
}

/// Parse a TOML document and check it with [`validate_config`].
///
/// Unset keys take their defaults, so an empty document is valid.
pub fn parse_config(text: &str) -> Result<ControllerConfig> {
    let config = toml::from_str::<ControllerConfig>(text)
        .map_err(|e| Error::from(ConfigError::Parse(bounded(e.message()))))?;
    validate_config(&config)?;
    Ok(config)
}

/// Copy as much of `text` as fits an error message, on a char boundary.
fn bounded(text: &str) -> heapless::String<128> {
    let mut message = heapless::String::new();
    for c in text.chars() {
        if message.push(c).is_err() {
            break;
        }
    }
    message
}
