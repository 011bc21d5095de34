//! Client-certificate selection for the TLS handshake

use std::sync::Arc;

use rustls::SignatureScheme;
use rustls::client::ResolvesClientCert;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::sign::CertifiedKey;

use super::errors::TlsError;
use super::keystore::{KeyEntry, Keystore};
use super::sealed;

/// Accepted key-manager algorithm names.
///
/// They all select the keystore's single identity; the name is validated so
/// that misconfigured credentials fail while the context is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyManagerAlgorithm {
    SunX509,
    NewSunX509,
    Pkix,
}

impl KeyManagerAlgorithm {
    /// # Errors
    ///
    /// Returns `TlsError::UnsupportedAlgorithm` for unknown names.
    pub fn parse(name: &str) -> Result<Self, TlsError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sunx509" => Ok(KeyManagerAlgorithm::SunX509),
            "newsunx509" => Ok(KeyManagerAlgorithm::NewSunX509),
            "pkix" | "x509" => Ok(KeyManagerAlgorithm::Pkix),
            _ => Err(TlsError::UnsupportedAlgorithm(name.to_string())),
        }
    }
}

/// Presents the keystore identity when the server requests a client certificate.
#[derive(Debug)]
pub struct KeyManager {
    algorithm: KeyManagerAlgorithm,
    certified: Arc<CertifiedKey>,
}

impl KeyManager {
    /// Load the keystore's signing key with `provider`.
    ///
    /// A sealed key entry is opened with `signing_passphrase`.
    ///
    /// # Errors
    ///
    /// Fails on an unknown algorithm, a wrong signing passphrase or a key
    /// the provider cannot use.
    pub fn init(
        keystore: &Keystore,
        algorithm: &str,
        signing_passphrase: &str,
        provider: &CryptoProvider,
    ) -> Result<Self, TlsError> {
        let algorithm = KeyManagerAlgorithm::parse(algorithm)?;

        let key: PrivateKeyDer<'static> = match keystore.key() {
            KeyEntry::Plain(key) => key.clone_key(),
            KeyEntry::Sealed(data) => {
                let der = sealed::open(data, signing_passphrase)?;
                PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(der.to_vec()))
            }
        };

        let signing_key = provider.key_provider.load_private_key(key)?;
        let certified = CertifiedKey::new(keystore.certificates().to_vec(), signing_key);

        Ok(Self {
            algorithm,
            certified: Arc::new(certified),
        })
    }

    #[must_use]
    pub fn algorithm(&self) -> KeyManagerAlgorithm {
        self.algorithm
    }

    #[must_use]
    pub fn certified_key(&self) -> &Arc<CertifiedKey> {
        &self.certified
    }
}

impl ResolvesClientCert for KeyManager {
    fn resolve(
        &self,
        _root_hint_subjects: &[&[u8]],
        sigschemes: &[SignatureScheme],
    ) -> Option<Arc<CertifiedKey>> {
        if self.certified.key.choose_scheme(sigschemes).is_none() {
            tracing::warn!(offered = ?sigschemes, "client key supports none of the offered signature schemes");
            return None;
        }
        Some(Arc::clone(&self.certified))
    }

    fn has_certs(&self) -> bool {
        true
    }
}
