//! Core `EppClientBuilder` state and terminal methods

use std::fmt;
use std::path::PathBuf;

use epp_transport_client::{
    ConnectionConfig, ConnectionConfigBuilder, PlainTcp, Result, TlsCore, TransportCore,
};
use zeroize::Zeroizing;

use crate::client::EppClient;

/// Builder for an [`EppClient`].
///
/// TLS is on by default; credentials are looked up in the credential
/// directory, falling back to the process-wide location and then the
/// `SSL_PROPS_LOCATION` environment variable.
pub struct EppClientBuilder {
    pub(crate) config: ConnectionConfigBuilder,
    pub(crate) client_id: String,
    pub(crate) password: Zeroizing<String>,
    pub(crate) tls: bool,
    pub(crate) core: Option<Box<dyn TransportCore>>,
}

impl EppClientBuilder {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            config: ConnectionConfig::builder(host, port),
            client_id: String::new(),
            password: Zeroizing::new(String::new()),
            tls: true,
            core: None,
        }
    }

    /// Registrar login identity handed to the protocol layer.
    #[must_use]
    pub fn credentials(mut self, client_id: impl Into<String>, password: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self.password = Zeroizing::new(password.into());
        self
    }

    /// Use TLS (`true`, the default) or plain TCP.
    #[must_use]
    pub fn tls(mut self, enabled: bool) -> Self {
        self.tls = enabled;
        self
    }

    /// Read timeout in milliseconds; `0` selects the transport default.
    #[must_use]
    pub fn timeout_millis(mut self, millis: u64) -> Self {
        self.config = self.config.timeout_millis(millis);
        self
    }

    #[must_use]
    pub fn credential_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config = self.config.credential_dir(dir);
        self
    }

    /// Replace the transport core, overriding [`EppClientBuilder::tls`].
    #[must_use]
    pub fn core(mut self, core: Box<dyn TransportCore>) -> Self {
        self.core = Some(core);
        self
    }

    /// # Errors
    ///
    /// A `Config` error when the connection parameters are invalid.
    pub fn build(self) -> Result<EppClient> {
        let config = self.config.build()?;
        let core = match self.core {
            Some(core) => core,
            None if self.tls => Box::new(TlsCore::new()),
            None => Box::new(PlainTcp),
        };
        tracing::debug!(
            host = config.host(),
            port = config.port(),
            secure = core.is_secure(),
            client_id = self.client_id.as_str(),
            "building EPP client"
        );
        Ok(EppClient::from_parts(config, core, self.client_id, self.password))
    }
}

impl fmt::Debug for EppClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EppClientBuilder")
            .field("config", &self.config)
            .field("client_id", &self.client_id)
            .field("password", &"<redacted>")
            .field("tls", &self.tls)
            .finish_non_exhaustive()
    }
}
