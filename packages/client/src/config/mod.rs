//! Connection parameters for one transport instance
//!
//! A [`ConnectionConfig`] is created once per client and never mutated. Local
//! binding only takes effect when both the local address and local port are
//! present.

pub mod builder;
pub mod defaults;
pub mod location;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use builder::ConnectionConfigBuilder;
pub use defaults::DEFAULT_TIMEOUT_MILLIS;
pub use location::{resolve_credential_dir, set_ssl_props_location, ssl_props_location};

use crate::error::Result;

/// Immutable parameters of one transport instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    host: String,
    port: u16,
    #[serde(default)]
    timeout_millis: u64,
    #[serde(default)]
    local_address: Option<String>,
    #[serde(default)]
    local_port: Option<u16>,
    #[serde(default)]
    credential_dir: Option<PathBuf>,
}

impl ConnectionConfig {
    /// Configuration with default timeout and no local binding.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if `host` is empty or `port` is zero.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        Self::builder(host, port).build()
    }

    pub fn builder(host: impl Into<String>, port: u16) -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::new(host, port)
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Timeout exactly as configured; `0` selects the transport default.
    #[must_use]
    pub fn timeout_millis(&self) -> u64 {
        self.timeout_millis
    }

    /// Effective read timeout after applying the transport default.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        match self.timeout_millis {
            0 => Duration::from_millis(DEFAULT_TIMEOUT_MILLIS),
            millis => Duration::from_millis(millis),
        }
    }

    #[must_use]
    pub fn local_address(&self) -> Option<&str> {
        self.local_address.as_deref()
    }

    #[must_use]
    pub fn local_port(&self) -> Option<u16> {
        self.local_port
    }

    /// The local endpoint to bind, only when both halves are present.
    #[must_use]
    pub fn local_binding(&self) -> Option<(&str, u16)> {
        match (self.local_address.as_deref(), self.local_port) {
            (Some(address), Some(port)) if !address.is_empty() => Some((address, port)),
            _ => None,
        }
    }

    #[must_use]
    pub fn credential_dir(&self) -> Option<&Path> {
        self.credential_dir.as_deref()
    }

    /// Validate values that bypassed the builder, e.g. after deserializing.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        builder::validate(&self.host, self.port, self.local_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_selects_default() {
        let config = ConnectionConfig::new("epp.example.net", 700).expect("valid config");
        assert_eq!(config.timeout_millis(), 0);
        assert_eq!(
            config.read_timeout(),
            Duration::from_millis(DEFAULT_TIMEOUT_MILLIS)
        );

        let config = ConnectionConfig::builder("epp.example.net", 700)
            .timeout_millis(1_500)
            .build()
            .expect("valid config");
        assert_eq!(config.read_timeout(), Duration::from_millis(1_500));
    }

    #[test]
    fn binding_requires_both_halves() {
        let config = ConnectionConfig::builder("epp.example.net", 700)
            .local_address("192.0.2.10")
            .build()
            .expect("valid config");
        assert_eq!(config.local_binding(), None);

        let config = ConnectionConfig::builder("epp.example.net", 700)
            .local_port(40_000)
            .build()
            .expect("valid config");
        assert_eq!(config.local_binding(), None);

        let config = ConnectionConfig::builder("epp.example.net", 700)
            .local_endpoint("192.0.2.10", 40_000)
            .build()
            .expect("valid config");
        assert_eq!(config.local_binding(), Some(("192.0.2.10", 40_000)));
    }

    #[test]
    fn rejects_zero_ports_and_empty_host() {
        let err = ConnectionConfig::new("epp.example.net", 0).expect_err("port 0");
        assert!(err.is_config());

        let err = ConnectionConfig::builder("epp.example.net", 700)
            .local_endpoint("127.0.0.1", 0)
            .build()
            .expect_err("local port 0");
        assert!(err.is_config());

        let err = ConnectionConfig::new("", 700).expect_err("empty host");
        assert!(err.is_config());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ConnectionConfig = serde_json::from_str(
            r#"{"host":"epp.example.net","port":700,"credential_dir":"/etc/epp"}"#,
        )
        .expect("valid json");
        config.validate().expect("valid values");
        assert_eq!(config.credential_dir(), Some(Path::new("/etc/epp")));
        assert_eq!(config.local_binding(), None);

        let config: ConnectionConfig =
            serde_json::from_str(r#"{"host":"epp.example.net","port":0}"#).expect("valid json");
        assert!(config.validate().is_err());
    }

    #[test]
    fn credential_dir_resolution_order() {
        let explicit = Path::new("/srv/epp/ssl");
        assert_eq!(
            resolve_credential_dir(Some(explicit)).expect("explicit"),
            explicit
        );

        set_ssl_props_location(Some(PathBuf::from("/etc/epp/ssl")));
        assert_eq!(
            resolve_credential_dir(None).expect("process-wide"),
            PathBuf::from("/etc/epp/ssl")
        );
        assert_eq!(
            resolve_credential_dir(Some(Path::new(""))).expect("empty explicit falls back"),
            PathBuf::from("/etc/epp/ssl")
        );
        set_ssl_props_location(None);

        if std::env::var_os(defaults::SSL_PROPS_LOCATION_ENV).is_none() {
            let err = resolve_credential_dir(None).expect_err("nothing configured");
            assert!(err.is_config());
            assert_eq!(err.message(), "missing credential path");
        }
    }
}
