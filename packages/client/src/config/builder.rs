//! Fluent construction of [`ConnectionConfig`]

use std::path::PathBuf;

use super::ConnectionConfig;
use crate::error::{self, Result};

/// Builder validating connection parameters once, at `build()`.
#[derive(Debug, Clone)]
pub struct ConnectionConfigBuilder {
    host: String,
    port: u16,
    timeout_millis: u64,
    local_address: Option<String>,
    local_port: Option<u16>,
    credential_dir: Option<PathBuf>,
}

impl ConnectionConfigBuilder {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout_millis: 0,
            local_address: None,
            local_port: None,
            credential_dir: None,
        }
    }

    /// Read timeout in milliseconds, `0` for the transport default.
    #[must_use]
    pub fn timeout_millis(mut self, millis: u64) -> Self {
        self.timeout_millis = millis;
        self
    }

    #[must_use]
    pub fn local_address(mut self, address: impl Into<String>) -> Self {
        self.local_address = Some(address.into());
        self
    }

    #[must_use]
    pub fn local_port(mut self, port: u16) -> Self {
        self.local_port = Some(port);
        self
    }

    /// Bind outbound connections to `address:port`.
    #[must_use]
    pub fn local_endpoint(self, address: impl Into<String>, port: u16) -> Self {
        self.local_address(address).local_port(port)
    }

    /// Directory holding `ssl.properties` and the keystore.
    #[must_use]
    pub fn credential_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.credential_dir = Some(dir.into());
        self
    }

    /// # Errors
    ///
    /// Returns a `Config` error if the host is empty, the port is zero or a
    /// local port of zero was given.
    pub fn build(self) -> Result<ConnectionConfig> {
        validate(&self.host, self.port, self.local_port)?;

        Ok(ConnectionConfig {
            host: self.host,
            port: self.port,
            timeout_millis: self.timeout_millis,
            local_address: self.local_address,
            local_port: self.local_port,
            credential_dir: self.credential_dir,
        })
    }
}

pub(super) fn validate(host: &str, port: u16, local_port: Option<u16>) -> Result<()> {
    if host.trim().is_empty() {
        return Err(error::config("remote host must not be empty"));
    }
    if port == 0 {
        return Err(error::config("remote port must be a positive integer"));
    }
    if local_port == Some(0) {
        return Err(error::config("local port must be a positive integer"));
    }
    Ok(())
}
