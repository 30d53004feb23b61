use std::time::Duration;

use crate::protocol::constants::{
    DEFAULT_OUTGOING_CHUNK_SIZE, DEFAULT_PEER_BANDWIDTH, DEFAULT_WINDOW_ACK_SIZE,
};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Chunk size announced to peers during connect
    pub chunk_size: u32,

    /// Window acknowledgement size
    pub window_ack_size: u32,

    /// Peer bandwidth
    pub peer_bandwidth: u32,

    /// Close connections with no traffic for this long. None disables
    /// the timeout.
    pub idle_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 1935,
            chunk_size: DEFAULT_OUTGOING_CHUNK_SIZE,
            window_ack_size: DEFAULT_WINDOW_ACK_SIZE,
            peer_bandwidth: DEFAULT_PEER_BANDWIDTH,
            idle_timeout: None,
        }
    }
}

impl ServerConfig {
    /// Create config builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::new()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::config("Invalid port: 0"));
        }

        if self.chunk_size < 128 {
            return Err(Error::config("Chunk size must be at least 128"));
        }

        if self.chunk_size > 65536 {
            return Err(Error::config("Chunk size must not exceed 65536"));
        }

        if self.window_ack_size == 0 {
            return Err(Error::config("Window acknowledgement size must be non-zero"));
        }

        Ok(())
    }
}

/// Builder for ServerConfig
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Create new builder
    pub fn new() -> Self {
        ServerConfigBuilder {
            config: ServerConfig::default(),
        }
    }

    /// Set host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set announced chunk size
    pub fn chunk_size(mut self, size: u32) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set window acknowledgement size
    pub fn window_ack_size(mut self, size: u32) -> Self {
        self.config.window_ack_size = size;
        self
    }

    /// Set peer bandwidth
    pub fn peer_bandwidth(mut self, size: u32) -> Self {
        self.config.peer_bandwidth = size;
        self
    }

    /// Set idle timeout
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = Some(timeout);
        self
    }

    /// Build configuration
    pub fn build(self) -> Result<ServerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        ServerConfigBuilder::new()
    }
}
