//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`].  With no path, the built-in defaults are
//! used; an explicit path that is missing or malformed is an error, never
//! a silent fallback.

use std::io;
use std::path::PathBuf;

use log::{info, warn};

use crate::app::ports::ConfigPort;
use crate::config::ControllerConfig;
use crate::error::ConfigError;

pub struct JsonFileConfig {
    path: Option<PathBuf>,
}

impl JsonFileConfig {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl ConfigPort for JsonFileConfig {
    fn load(&self) -> Result<ControllerConfig, ConfigError> {
        let config = match &self.path {
            None => {
                info!("Config: no file given, using defaults");
                ControllerConfig::default()
            }
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    warn!("Config: cannot read {}: {}", path.display(), e);
                    if e.kind() == io::ErrorKind::NotFound {
                        ConfigError::NotFound
                    } else {
                        ConfigError::Io
                    }
                })?;
                let config: ControllerConfig = serde_json::from_str(&text).map_err(|e| {
                    warn!("Config: {} is invalid: {}", path.display(), e);
                    ConfigError::Parse
                })?;
                info!("Config loaded from {}", path.display());
                config
            }
        };
        config.validate()?;
        Ok(config)
    }
}
