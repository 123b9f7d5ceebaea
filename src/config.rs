//! Configuration for TagKV
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{Result, TagError};
use crate::protocol::DecodeLimits;

/// Main configuration for a TagKV server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Host address to bind
    pub host: String,

    /// TCP port to bind (0 picks an ephemeral port)
    pub port: u16,

    /// Worker pool size: max connections served at the same time
    pub max_connections: usize,

    /// Idle read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Deepest array/map nesting accepted from a peer
    pub max_depth: usize,

    /// Largest bulk string payload accepted from a peer (bytes)
    pub max_bulk_len: usize,

    /// Largest text line accepted from a peer (bytes, terminator excluded)
    pub max_line_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        let limits = DecodeLimits::default();
        Self {
            host: "127.0.0.1".to_string(),
            port: 31337,
            max_connections: 64,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
            max_depth: limits.max_depth,
            max_bulk_len: limits.max_bulk_len,
            max_line_len: limits.max_line_len,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` string suitable for binding
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Codec limits applied to every inbound request
    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_depth: self.max_depth,
            max_bulk_len: self.max_bulk_len,
            max_line_len: self.max_line_len,
        }
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        (self.write_timeout_ms > 0).then(|| Duration::from_millis(self.write_timeout_ms))
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(TagError::Config("host must not be empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(TagError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(TagError::Config("max_depth must be at least 1".to_string()));
        }
        if self.max_line_len == 0 {
            return Err(TagError::Config(
                "max_line_len must be at least 1".to_string(),
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
    /// Set the host address
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the TCP port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the worker pool size
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the idle read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the maximum nesting depth for decoded messages
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set the maximum bulk string length (in bytes)
    pub fn max_bulk_len(mut self, len: usize) -> Self {
        self.config.max_bulk_len = len;
        self
    }

    /// Set the maximum text line length (in bytes)
    pub fn max_line_len(mut self, len: usize) -> Self {
        self.config.max_line_len = len;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
