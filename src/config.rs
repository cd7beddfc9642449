//! Configuration for RESP connections
//!
//! Centralized configuration with sensible defaults.

use crate::error::{KvError, Result};

/// Settings used by [`RespConnection::connect`](crate::connection::RespConnection::connect)
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Store address (host:port)
    pub addr: String,

    /// Read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Session Configuration
    // -------------------------------------------------------------------------
    /// Password sent with AUTH right after connecting
    pub password: Option<String>,

    /// Logical database selected with SELECT right after connecting
    pub database: Option<u32>,

    /// Name registered with CLIENT SETNAME
    pub client_name: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:6379".to_string(),
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            password: None,
            database: None,
            client_name: None,
        }
    }
}

impl ConnectionConfig {
    /// Create a new config builder
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::default()
    }

    /// Reject configurations that cannot produce a working session.
    pub fn validate(&self) -> Result<()> {
        if self.addr.trim().is_empty() {
            return Err(KvError::Configuration("address must not be empty".to_string()));
        }
        if let Some(name) = &self.client_name {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(KvError::Configuration(format!(
                    "client name {:?} must be non-empty and contain no spaces",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Builder for ConnectionConfig
#[derive(Default)]
pub struct ConnectionConfigBuilder {
    config: ConnectionConfig,
}

impl ConnectionConfigBuilder {
    /// Set the store address (host:port)
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.config.addr = addr.into();
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Authenticate with this password after connecting
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = Some(password.into());
        self
    }

    /// Select this logical database after connecting
    pub fn database(mut self, index: u32) -> Self {
        self.config.database = Some(index);
        self
    }

    /// Register this client name after connecting
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.config.client_name = Some(name.into());
        self
    }

    pub fn build(self) -> ConnectionConfig {
        self.config
    }
}
