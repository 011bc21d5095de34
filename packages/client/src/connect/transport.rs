//! Plain and secure transport cores
//!
//! A core knows how to dial one kind of channel. The connector drives it
//! through prepare, dial, handshake and stream wrapping, so plain TCP and
//! TLS share a single connection state machine.

use std::sync::Arc;
use std::time::Duration;

use super::binder::LocalBinder;
use super::channel::Channel;
use super::session::SocketSession;
use crate::config::ConnectionConfig;
use crate::config::location::resolve_credential_dir;
use crate::credentials::CredentialBundle;
use crate::error::{self, Result};
use crate::tls::{EntropySeeder, TlsContext, TlsContextCache, provider};

/// Protocol reported when no secure session was negotiated.
pub const NO_PROTOCOL: &str = "NONE";

/// One way of producing a connected channel.
pub trait TransportCore: Send {
    fn is_secure(&self) -> bool;

    /// Load whatever must exist before any socket is opened.
    ///
    /// # Errors
    ///
    /// `Config` or `Keystore` errors; no network I/O happens here.
    fn prepare(&mut self, _config: &ConnectionConfig) -> Result<()> {
        Ok(())
    }

    /// Open a connected channel to the configured server.
    ///
    /// # Errors
    ///
    /// `Network` errors from resolution, binding or connecting.
    fn dial(&mut self, config: &ConnectionConfig) -> Result<Box<dyn Channel>>;

    /// Complete the handshake and report the negotiated protocol, or
    /// [`NO_PROTOCOL`] when none was established.
    ///
    /// # Errors
    ///
    /// `SecureConnection` when the handshake fails.
    fn handshake(&mut self, channel: &mut dyn Channel) -> Result<String> {
        channel.complete_handshake().map_err(|err| {
            error::secure_connection("failed to establish secure connection: handshake failed").with(err)
        })?;
        Ok(channel
            .negotiated_protocol()
            .unwrap_or_else(|| NO_PROTOCOL.to_string()))
    }

    /// Wrap a connected channel into buffered session streams.
    ///
    /// # Errors
    ///
    /// `Network` when the read timeout cannot be applied.
    fn wrap_streams(
        &self,
        channel: Box<dyn Channel>,
        read_timeout: Duration,
        preset: bool,
    ) -> Result<SocketSession> {
        SocketSession::wrap(channel, read_timeout, preset).map_err(error::io)
    }
}

impl<C: TransportCore + ?Sized> TransportCore for Box<C> {
    fn is_secure(&self) -> bool {
        (**self).is_secure()
    }

    fn prepare(&mut self, config: &ConnectionConfig) -> Result<()> {
        (**self).prepare(config)
    }

    fn dial(&mut self, config: &ConnectionConfig) -> Result<Box<dyn Channel>> {
        (**self).dial(config)
    }

    fn handshake(&mut self, channel: &mut dyn Channel) -> Result<String> {
        (**self).handshake(channel)
    }

    fn wrap_streams(
        &self,
        channel: Box<dyn Channel>,
        read_timeout: Duration,
        preset: bool,
    ) -> Result<SocketSession> {
        (**self).wrap_streams(channel, read_timeout, preset)
    }
}

/// Unencrypted TCP.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTcp;

impl TransportCore for PlainTcp {
    fn is_secure(&self) -> bool {
        false
    }

    fn dial(&mut self, config: &ConnectionConfig) -> Result<Box<dyn Channel>> {
        let stream = LocalBinder::from_config(config).dial(config.host(), config.port())?;
        Ok(Box::new(stream))
    }
}

/// TLS over TCP using the credential bundle found in the credential directory.
///
/// The bundle and the TLS context are loaded on first use and reused by
/// every later connect until [`TlsCore::reset`].
#[derive(Debug)]
pub struct TlsCore {
    bundle: Option<CredentialBundle>,
    cache: TlsContextCache,
    seeder: EntropySeeder,
}

impl Default for TlsCore {
    fn default() -> Self {
        Self::new()
    }
}

impl TlsCore {
    pub fn new() -> Self {
        Self::with_seeder(EntropySeeder::default())
    }

    /// Use `seeder` for the supplemental random source.
    pub fn with_seeder(seeder: EntropySeeder) -> Self {
        provider::init();
        Self {
            bundle: None,
            cache: TlsContextCache::new(),
            seeder,
        }
    }

    #[must_use]
    pub fn context_cache(&self) -> &TlsContextCache {
        &self.cache
    }

    /// Credentials loaded so far, if any.
    #[must_use]
    pub fn credentials(&self) -> Option<&CredentialBundle> {
        self.bundle.as_ref()
    }

    /// Forget the loaded credentials and the cached context.
    pub fn reset(&mut self) {
        self.bundle = None;
        self.cache.reset();
    }

    fn context(&mut self, config: &ConnectionConfig) -> Result<Arc<TlsContext>> {
        let bundle = match self.bundle.take() {
            Some(bundle) => bundle,
            None => {
                let dir = resolve_credential_dir(config.credential_dir())?;
                tracing::debug!(dir = %dir.display(), "loading credential bundle");
                CredentialBundle::load(&dir)?
            }
        };
        // A failed build discards the bundle too, so corrected properties are
        // picked up by the next attempt.
        let context = self.cache.get_or_build(&bundle, &self.seeder)?;
        self.bundle = Some(bundle);
        Ok(context)
    }
}

impl TransportCore for TlsCore {
    fn is_secure(&self) -> bool {
        true
    }

    fn prepare(&mut self, config: &ConnectionConfig) -> Result<()> {
        self.context(config).map(|_| ())
    }

    fn dial(&mut self, config: &ConnectionConfig) -> Result<Box<dyn Channel>> {
        let context = self.context(config)?;
        let channel =
            LocalBinder::from_config(config).dial_secure(config.host(), config.port(), &context)?;
        Ok(Box::new(channel))
    }
}
