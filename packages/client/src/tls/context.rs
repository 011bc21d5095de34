//! TLS context construction and per-connector caching

use std::net::TcpStream;
use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection};

use super::entropy::{EntropySeeder, RandomSource};
use super::errors::TlsError;
use super::key_manager::KeyManager;
use super::keystore::{Keystore, KeystoreFormat};
use super::protocol::TlsProtocol;
use super::{provider, trust};
use crate::connect::TlsChannel;
use crate::credentials::CredentialBundle;
use crate::error::{self, Result};

/// Client TLS configuration built from one credential bundle.
#[derive(Debug)]
pub struct TlsContext {
    config: Arc<ClientConfig>,
    protocol: TlsProtocol,
    keystore: Keystore,
    key_manager: Arc<KeyManager>,
    random: RandomSource,
}

impl TlsContext {
    /// Build a context, counting each keystore file read in `keystore_reads`.
    fn build(
        bundle: &CredentialBundle,
        seeder: &EntropySeeder,
        keystore_reads: &mut usize,
    ) -> std::result::Result<Self, TlsError> {
        let protocol = TlsProtocol::parse(bundle.tls_protocol())?;
        let format = KeystoreFormat::parse(bundle.keystore_format())?;
        let base = provider::resolve(bundle.keystore_provider())?;

        *keystore_reads += 1;
        let keystore = Keystore::load(bundle.keystore_file(), format, bundle.keystore_passphrase())?;
        let key_manager = Arc::new(KeyManager::init(
            &keystore,
            bundle.key_manager_algorithm(),
            bundle.signing_cert_passphrase(),
            &base,
        )?);

        let random = seeder.try_seed();
        let roots = trust::load_roots(bundle.truststore_file())?;

        let config = ClientConfig::builder_with_provider(random.apply(base))
            .with_protocol_versions(protocol.versions())?
            .with_root_certificates(roots)
            .with_client_cert_resolver(key_manager.clone());

        Ok(Self {
            config: Arc::new(config),
            protocol,
            keystore,
            key_manager,
            random,
        })
    }

    #[must_use]
    pub fn client_config(&self) -> Arc<ClientConfig> {
        Arc::clone(&self.config)
    }

    #[must_use]
    pub fn protocol(&self) -> TlsProtocol {
        self.protocol
    }

    #[must_use]
    pub fn keystore(&self) -> &Keystore {
        &self.keystore
    }

    #[must_use]
    pub fn key_manager(&self) -> &KeyManager {
        &self.key_manager
    }

    /// Whether the random source was supplementally seeded.
    #[must_use]
    pub fn is_seeded(&self) -> bool {
        self.random.is_seeded()
    }

    /// Layer a client TLS session over a connected socket.
    ///
    /// No handshake bytes are exchanged until the channel is driven.
    ///
    /// # Errors
    ///
    /// `Config` when `host` is not a valid server name, `Keystore` when the
    /// session cannot be created from this context.
    pub fn channel(&self, host: &str, socket: TcpStream) -> Result<TlsChannel> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|err| error::config(format!("invalid server name: {host}")).with(err))?;
        let connection = ClientConnection::new(self.client_config(), server_name)
            .map_err(|err| error::keystore("failed to create TLS session", TlsError::from(err)))?;
        Ok(TlsChannel::new(connection, socket))
    }
}

fn failure_message(err: &TlsError) -> &'static str {
    match err {
        TlsError::Io(_) => "keystore file unreadable",
        TlsError::CertificateParsing(_) | TlsError::MissingEntry(_) => "failed to decode keystore",
        TlsError::UnsupportedFormat(_) => "unsupported keystore format",
        TlsError::UnsupportedProvider(_) => "unknown keystore provider",
        TlsError::KeyProtection(_) => "failed to unlock key material",
        TlsError::UnsupportedAlgorithm(_) => "failed to initialise key manager",
        TlsError::UnsupportedProtocol(_) => "unsupported TLS protocol",
        TlsError::Rustls(_) => "failed to initialise TLS context",
    }
}

/// Lazily built, reusable TLS context.
///
/// A build either fully succeeds and is stored, or fails and leaves the
/// cache empty so the next attempt starts from scratch.
#[derive(Debug, Default)]
pub struct TlsContextCache {
    context: Option<Arc<TlsContext>>,
    keystore_reads: usize,
    builds: usize,
}

impl TlsContextCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached context, building it on first use.
    ///
    /// # Errors
    ///
    /// A `Keystore` error wrapping the [`TlsError`] that stopped the build.
    pub fn get_or_build(
        &mut self,
        bundle: &CredentialBundle,
        seeder: &EntropySeeder,
    ) -> Result<Arc<TlsContext>> {
        if let Some(context) = &self.context {
            tracing::trace!("reusing cached TLS context");
            return Ok(Arc::clone(context));
        }

        tracing::debug!(
            keystore = %bundle.keystore_file().display(),
            protocol = bundle.tls_protocol(),
            "building TLS context"
        );
        let context = TlsContext::build(bundle, seeder, &mut self.keystore_reads).map_err(|err| {
            tracing::warn!(error = %err, "TLS context build failed");
            error::keystore(failure_message(&err), err)
        })?;

        let context = Arc::new(context);
        self.context = Some(Arc::clone(&context));
        self.builds += 1;
        Ok(context)
    }

    #[must_use]
    pub fn get(&self) -> Option<&Arc<TlsContext>> {
        self.context.as_ref()
    }

    #[must_use]
    pub fn is_built(&self) -> bool {
        self.context.is_some()
    }

    /// Number of times a keystore file has been read.
    #[must_use]
    pub fn keystore_reads(&self) -> usize {
        self.keystore_reads
    }

    /// Number of successful builds.
    #[must_use]
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// Drop the cached context; the next use rebuilds it.
    pub fn reset(&mut self) {
        self.context = None;
    }
}
