//! Configuration for NestDB
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{NestError, Result};

/// Main configuration for a NestDB instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory holding one sub-directory per database
    /// Internal structure:
    ///   {data_dir}/
    ///     └── {database}/
    ///           └── {collection}.json
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Longest accepted message (database name or command line), in bytes
    pub max_message_bytes: usize,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Deadlines
    // -------------------------------------------------------------------------
    /// Soft per-operation deadline on the server (milliseconds).
    /// Exceeding it is reported to the client; the operation is not cancelled.
    pub op_timeout_ms: u64,

    /// How long a client waits for a server reply (milliseconds)
    pub client_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./databases"),
            listen_addr: "127.0.0.1:8080".to_string(),
            max_connections: 1024,
            max_message_bytes: 16 * 1024 * 1024, // 16 MB
            write_timeout_ms: 5000,
            op_timeout_ms: 5000,
            client_timeout_ms: 10_000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the values that would make the server unusable
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(NestError::Config(
                "max_connections must be greater than zero".to_string(),
            ));
        }
        if self.max_message_bytes == 0 {
            return Err(NestError::Config(
                "max_message_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_millis(self.client_timeout_ms)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all databases)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the maximum message size (in bytes)
    pub fn max_message_bytes(mut self, bytes: usize) -> Self {
        self.config.max_message_bytes = bytes;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the soft operation deadline (in milliseconds)
    pub fn op_timeout_ms(mut self, ms: u64) -> Self {
        self.config.op_timeout_ms = ms;
        self
    }

    /// Set the client reply timeout (in milliseconds)
    pub fn client_timeout_ms(mut self, ms: u64) -> Self {
        self.config.client_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
