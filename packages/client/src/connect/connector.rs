//! Connection state machine shared by plain and secure transports

use std::fmt;

use super::channel::Channel;
use super::transport::{NO_PROTOCOL, TransportCore};
use super::session::SocketSession;
use crate::config::ConnectionConfig;
use crate::error::{self, Result};

/// Lifecycle of a [`TransportConnector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectState {
    Unconnected,
    Connecting,
    /// TLS only: the handshake is being forced and verified
    HandshakeVerify,
    Connected,
    /// The last `connect()` failed; calling it again retries
    Failed,
}

impl ConnectState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectState::Unconnected => "unconnected",
            ConnectState::Connecting => "connecting",
            ConnectState::HandshakeVerify => "handshake_verify",
            ConnectState::Connected => "connected",
            ConnectState::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces one ready-to-use session from a [`ConnectionConfig`] and a core.
///
/// At most one session is live at a time. Reconnecting reuses whatever the
/// core cached (for TLS, the credential bundle and context) but dials a
/// fresh socket, unless a preset channel was supplied, in which case the
/// existing channel is only re-wrapped.
pub struct TransportConnector<C = Box<dyn TransportCore>> {
    config: ConnectionConfig,
    core: C,
    state: ConnectState,
    session: Option<SocketSession>,
    preset_channel: Option<Box<dyn Channel>>,
    preset: bool,
}

impl<C: TransportCore> TransportConnector<C> {
    pub fn new(config: ConnectionConfig, core: C) -> Self {
        Self {
            config,
            core,
            state: ConnectState::Unconnected,
            session: None,
            preset_channel: None,
            preset: false,
        }
    }

    /// Supply an already-open channel; `connect()` will wrap it instead of
    /// dialing or handshaking.
    ///
    /// Any current session is closed first.
    pub fn preset(&mut self, channel: Box<dyn Channel>) {
        if let Some(session) = self.session.take() {
            if let Err(err) = session.close() {
                tracing::debug!(error = %err, "closing replaced session failed");
            }
            self.transition(ConnectState::Unconnected);
        }
        self.preset_channel = Some(channel);
        self.preset = true;
    }

    /// Establish the session.
    ///
    /// # Errors
    ///
    /// `Config` or `Keystore` before any socket is opened, `Network` for
    /// resolution, bind, dial or timeout failures, `SecureConnection` when a
    /// TLS session could not be negotiated. The connector is then `Failed`
    /// and holds no session.
    pub fn connect(&mut self) -> Result<()> {
        self.transition(ConnectState::Connecting);

        match self.establish() {
            Ok(session) => {
                tracing::info!(
                    host = self.config.host(),
                    port = self.config.port(),
                    peer = ?session.peer_addr(),
                    local = ?session.local_addr(),
                    protocol = session.protocol().unwrap_or(NO_PROTOCOL),
                    preset = session.is_preset(),
                    "transport connected"
                );
                self.session = Some(session);
                self.transition(ConnectState::Connected);
                Ok(())
            }
            Err(err) => {
                self.session = None;
                tracing::warn!(
                    host = self.config.host(),
                    port = self.config.port(),
                    kind = %err.kind(),
                    error = %err,
                    "transport connect failed"
                );
                self.transition(ConnectState::Failed);
                Err(err)
            }
        }
    }

    fn establish(&mut self) -> Result<SocketSession> {
        let read_timeout = self.config.read_timeout();

        if self.preset {
            let channel = match (self.preset_channel.take(), self.session.take()) {
                (Some(channel), _) => channel,
                (None, Some(session)) => match session.into_channel() {
                    Ok(channel) => channel,
                    Err(err) => {
                        // The preset channel is gone; later attempts dial.
                        self.preset = false;
                        return Err(error::io(err));
                    }
                },
                (None, None) => return Err(error::config("preset channel is no longer available")),
            };
            return self.core.wrap_streams(channel, read_timeout, true);
        }

        if let Some(previous) = self.session.take() {
            if let Err(err) = previous.close() {
                tracing::debug!(error = %err, "closing previous session failed");
            }
        }

        self.core.prepare(&self.config)?;
        let mut channel = self.core.dial(&self.config)?;

        if self.core.is_secure() {
            self.transition(ConnectState::HandshakeVerify);
            let protocol = self.core.handshake(&mut *channel)?;
            if protocol == NO_PROTOCOL {
                if let Err(err) = channel.shutdown() {
                    tracing::debug!(error = %err, "shutting down unsecured channel failed");
                }
                return Err(error::secure_connection(
                    "failed to establish secure connection: possible bad certificate",
                ));
            }
            tracing::debug!(protocol = protocol.as_str(), "secure session negotiated");
        }

        self.core.wrap_streams(channel, read_timeout, false)
    }

    /// Close the session and forget any preset channel.
    ///
    /// # Errors
    ///
    /// `Network` if flushing or shutting down the session fails; the
    /// connector is `Unconnected` either way.
    pub fn close(&mut self) -> Result<()> {
        self.preset_channel = None;
        self.preset = false;
        let closed = match self.session.take() {
            Some(session) => session.close().map_err(error::io),
            None => Ok(()),
        };
        self.transition(ConnectState::Unconnected);
        closed
    }

    #[must_use]
    pub fn state(&self) -> ConnectState {
        self.state
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == ConnectState::Connected
    }

    #[must_use]
    pub fn is_preset(&self) -> bool {
        self.preset
    }

    #[must_use]
    pub fn session(&self) -> Option<&SocketSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut SocketSession> {
        self.session.as_mut()
    }

    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    #[must_use]
    pub fn core(&self) -> &C {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut C {
        &mut self.core
    }

    fn transition(&mut self, next: ConnectState) {
        tracing::debug!(
            state = next.as_str(),
            previous = self.state.as_str(),
            host = self.config.host(),
            port = self.config.port(),
            local = ?self.config.local_binding(),
            preset = self.preset,
            secure = self.core.is_secure(),
            "transport state transition"
        );
        self.state = next;
    }
}

impl<C> fmt::Debug for TransportConnector<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConnector")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("session", &self.session)
            .field("preset", &self.preset)
            .finish_non_exhaustive()
    }
}
