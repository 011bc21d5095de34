//! EPP client adapter over the transport connector

use std::fmt;
use std::io;
use std::time::Duration;

use epp_transport_client::connect::{Channel, ConnectState, SocketSession, TransportConnector};
use epp_transport_client::error;
use epp_transport_client::{ConnectionConfig, Result, TlsCore, TransportCore};
use zeroize::Zeroizing;

use crate::builder::EppClientBuilder;
use crate::frame;

/// The EPP `<hello/>` request.
pub const HELLO_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?><epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><hello/></epp>"#;

/// Owns one connection to an EPP server.
///
/// Message semantics belong to the protocol layer; this type only
/// establishes the transport and moves raw XML frames.
pub struct EppClient {
    connector: TransportConnector,
    client_id: String,
    password: Zeroizing<String>,
}

impl EppClient {
    /// TLS client for `config`.
    pub fn new(
        config: ConnectionConfig,
        client_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::from_parts(
            config,
            Box::new(TlsCore::new()),
            client_id.into(),
            Zeroizing::new(password.into()),
        )
    }

    pub fn builder(host: impl Into<String>, port: u16) -> EppClientBuilder {
        EppClientBuilder::new(host, port)
    }

    pub(crate) fn from_parts(
        config: ConnectionConfig,
        core: Box<dyn TransportCore>,
        client_id: String,
        password: Zeroizing<String>,
    ) -> Self {
        Self {
            connector: TransportConnector::new(config, core),
            client_id,
            password,
        }
    }

    /// Establish the transport.
    ///
    /// # Errors
    ///
    /// Whatever [`TransportConnector::connect`] reports.
    pub fn connect(&mut self) -> Result<()> {
        self.connector.connect()
    }

    /// Connect and return the greeting the server sends unprompted.
    ///
    /// # Errors
    ///
    /// Connect errors, or `Network` if the greeting frame cannot be read.
    pub fn connect_and_get_greeting(&mut self) -> Result<String> {
        self.connect()?;
        self.read_frame()
    }

    /// Send `<hello/>` and return the raw response.
    ///
    /// # Errors
    ///
    /// `Network` when not connected or when the exchange fails.
    pub fn hello_xml(&mut self) -> Result<String> {
        self.send_frame(HELLO_XML)?;
        self.read_frame()
    }

    /// Write one XML frame.
    ///
    /// # Errors
    ///
    /// `Network` when not connected or when the write fails.
    pub fn send_frame(&mut self, xml: &str) -> Result<()> {
        frame::write_frame(self.session_mut()?, xml)
    }

    /// Read one XML frame, waiting at most the read timeout.
    ///
    /// # Errors
    ///
    /// `Network` when not connected, on timeout or a malformed frame.
    pub fn read_frame(&mut self) -> Result<String> {
        frame::read_frame(self.session_mut()?)
    }

    /// # Errors
    ///
    /// `Network` if the session fails to flush or shut down.
    pub fn close(&mut self) -> Result<()> {
        self.connector.close()
    }

    /// Hand the transport an already-open channel to use instead of dialing.
    pub fn preset(&mut self, channel: Box<dyn Channel>) {
        self.connector.preset(channel);
    }

    /// Effective read timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.connector.config().read_timeout()
    }

    #[must_use]
    pub fn state(&self) -> ConnectState {
        self.connector.state()
    }

    #[must_use]
    pub fn session(&self) -> Option<&SocketSession> {
        self.connector.session()
    }

    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        self.connector.config()
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    #[must_use]
    pub fn connector(&self) -> &TransportConnector {
        &self.connector
    }

    pub fn connector_mut(&mut self) -> &mut TransportConnector {
        &mut self.connector
    }

    fn session_mut(&mut self) -> Result<&mut SocketSession> {
        self.connector.session_mut().ok_or_else(|| {
            error::network(
                "not connected",
                io::Error::from(io::ErrorKind::NotConnected),
            )
        })
    }
}

impl fmt::Debug for EppClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EppClient")
            .field("connector", &self.connector)
            .field("client_id", &self.client_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_tls() {
        let client = EppClient::builder("epp.example", 700)
            .credentials("registrar", "secret")
            .build()
            .expect("client");
        assert!(client.connector().core().is_secure());
        assert_eq!(client.client_id(), "registrar");
        assert_eq!(client.password(), "secret");
        assert_eq!(client.timeout(), Duration::from_millis(50_000));
        assert_eq!(client.state(), ConnectState::Unconnected);
    }

    #[test]
    fn plain_builder_and_timeout() {
        let client = EppClient::builder("epp.example", 700)
            .tls(false)
            .timeout_millis(1_500)
            .local_endpoint("127.0.0.1", 7000)
            .build()
            .expect("client");
        assert!(!client.connector().core().is_secure());
        assert_eq!(client.timeout(), Duration::from_millis(1_500));
        assert_eq!(client.config().local_binding(), Some(("127.0.0.1", 7000)));
    }

    #[test]
    fn invalid_parameters_fail_to_build() {
        assert!(EppClient::builder("", 700).build().unwrap_err().is_config());
        assert!(EppClient::builder("epp.example", 0).build().is_err());
    }

    #[test]
    fn exchanges_need_a_session() {
        let mut client = EppClient::builder("epp.example", 700)
            .tls(false)
            .build()
            .expect("client");
        let err = client.hello_xml().unwrap_err();
        assert!(err.is_network());
        assert_eq!(err.message(), "not connected");
    }

    #[test]
    fn debug_redacts_password() {
        let client = EppClient::new(
            ConnectionConfig::new("epp.example", 700).expect("config"),
            "registrar",
            "hunter2",
        );
        assert!(!format!("{client:?}").contains("hunter2"));
    }
}
