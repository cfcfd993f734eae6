//! Bridge configuration.
//!
//! An optional TOML file may pin the `zabbix_sender` binary and agent config
//! explicitly; without it the fixed installation locations are probed. There
//! are deliberately no environment overrides for the sender paths.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;
use crate::error::{ConfigError, Error, SenderError};
use crate::sender::TrapSender;

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub sender_bin: Option<PathBuf>,
    pub agent_config: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file. A missing file yields the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be parsed or when the resulting
    /// values fail validation.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        load(path.as_ref())
            .map_err(Error::from)
            .and_then(RawConfig::validate_and_build)
    }

    /// Resolve the trap sender: the explicit override pair when configured,
    /// fixed-location probing otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error when an override path does not exist, or
    /// [`SenderError::Unavailable`] when probing finds no installation.
    pub fn resolve_sender(&self) -> Result<TrapSender> {
        match (&self.sender_bin, &self.agent_config) {
            (Some(bin), Some(cfg)) => {
                TrapSender::new(bin.clone(), cfg.clone()).map_err(Error::from)
            }
            _ => TrapSender::discover().ok_or_else(|| SenderError::Unavailable.into()),
        }
    }
}

fn load(path: &Path) -> std::result::Result<RawConfig, ConfigError> {
    ::config::Config::builder()
        .add_source(::config::File::from(path).required(false))
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    sender: RawSender,
}

#[derive(Debug, Default, Deserialize)]
struct RawSender {
    bin: Option<PathBuf>,
    config: Option<PathBuf>,
}

impl RawConfig {
    fn validate_and_build(self) -> Result<Config> {
        if self.sender.bin.is_some() != self.sender.config.is_some() {
            return Err(ConfigError::InvalidField {
                field: "sender",
                message: "bin and config must be set together".to_string(),
            }
            .into());
        }
        Ok(Config {
            sender_bin: self.sender.bin,
            agent_config: self.sender.config,
        })
    }
}
