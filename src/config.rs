//! Configuration for redisx
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{RedisError, Result};

/// Main configuration for a data source
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Blocking Facade Configuration
    // -------------------------------------------------------------------------
    /// How long the blocking facade waits for an operation (milliseconds).
    /// Expiry stops the wait; the in-flight request keeps running.
    pub blocking_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blocking_timeout_ms: 10_000, // 10 s
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Blocking timeout as a `Duration`
    pub fn blocking_timeout(&self) -> Duration {
        Duration::from_millis(self.blocking_timeout_ms)
    }

    /// Check the configuration for unusable values
    pub fn validate(&self) -> Result<()> {
        if self.blocking_timeout_ms == 0 {
            return Err(RedisError::Config(
                "blocking_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the blocking timeout (in milliseconds)
    pub fn blocking_timeout_ms(mut self, ms: u64) -> Self {
        self.config.blocking_timeout_ms = ms;
        self
    }

    /// Set the blocking timeout from a `Duration`
    pub fn blocking_timeout(mut self, timeout: Duration) -> Self {
        self.config.blocking_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
