//! Wait configuration loaded from TOML files and the environment.
//!
//! ```toml
//! timeout_ms = 10000
//! poll_interval_ms = 250
//! implicit_timeout_ms = 2000
//! transient = ["not_found", "stale"]
//! message = "checkout page did not settle"
//! ```

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::error::{ErrorCategory, TransientSet};
use crate::poller::{Poller, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};

/// Errors that can occur when loading wait configuration.
#[derive(Debug, Error)]
pub enum WaitConfigError {
    /// The configuration file was not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] ConfigError),

    /// The configuration file path is invalid.
    #[error("invalid configuration path: {0}")]
    InvalidPath(String),

    /// The values parsed but break an invariant.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Polling settings for explicit waits and session-implicit lookups.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WaitConfig {
    /// Deadline for explicit waits, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Pause between evaluations, in milliseconds. Must be positive.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Initial ambient timeout for sessions; absent means `Unset`.
    #[serde(default)]
    pub implicit_timeout_ms: Option<u64>,
    /// Failure categories retried instead of ending the wait.
    #[serde(default = "default_transient")]
    pub transient: Vec<ErrorCategory>,
    /// Message attached to timeout reports.
    #[serde(default)]
    pub message: Option<String>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            implicit_timeout_ms: None,
            transient: default_transient(),
            message: None,
        }
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_transient() -> Vec<ErrorCategory> {
    vec![ErrorCategory::NotFound]
}

impl WaitConfig {
    /// Load wait configuration from a file path.
    ///
    /// Values can be overridden from the environment with the `WAITRON__`
    /// prefix, e.g. `WAITRON__POLL_INTERVAL_MS=100`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be parsed, or
    /// holds a zero poll interval.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WaitConfigError> {
        let path = path.as_ref();

        let path_str = path
            .to_str()
            .ok_or_else(|| WaitConfigError::InvalidPath(format!("{:?}", path)))?;

        if !path.exists() {
            return Err(WaitConfigError::FileNotFound(path_str.to_string()));
        }

        let config = Config::builder()
            .add_source(File::with_name(path_str))
            .add_source(
                Environment::with_prefix("WAITRON")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let wait_config: WaitConfig = config.try_deserialize()?;
        wait_config.validate()?;
        Ok(wait_config)
    }

    /// Parse wait configuration from a TOML string, without environment overrides.
    pub fn from_toml_str(source: &str) -> Result<Self, WaitConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;

        let wait_config: WaitConfig = config.try_deserialize()?;
        wait_config.validate()?;
        Ok(wait_config)
    }

    /// Checks the invariants the poll loop relies on.
    pub fn validate(&self) -> Result<(), WaitConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(WaitConfigError::Invalid(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Deadline for explicit waits.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Pause between evaluations.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Initial ambient timeout for sessions.
    pub fn implicit_timeout(&self) -> Option<Duration> {
        self.implicit_timeout_ms.map(Duration::from_millis)
    }

    /// The configured transient set.
    pub fn transient_set(&self) -> TransientSet {
        TransientSet::of(self.transient.iter().copied())
    }

    /// A poller carrying every setting in this configuration.
    pub fn poller(&self) -> Poller {
        let poller = Poller::new(self.timeout())
            .polling_every(self.poll_interval())
            .ignoring(self.transient_set());
        match &self.message {
            Some(message) => poller.with_message(message.clone()),
            None => poller,
        }
    }
}
