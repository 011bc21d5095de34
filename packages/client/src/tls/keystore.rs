//! Keystore decoding
//!
//! A keystore is a PEM document holding the client certificate chain and
//! one private key. In the `SEALED` format the whole document is itself a
//! sealed container opened with the keystore passphrase. The private key
//! may additionally be stored as a `SEALED PRIVATE KEY` block, which the
//! key manager opens with the signing-certificate passphrase.

use std::fmt;
use std::fs;
use std::path::Path;

use rustls::pki_types::{
    CertificateDer, PrivateKeyDer, PrivatePkcs1KeyDer, PrivatePkcs8KeyDer, PrivateSec1KeyDer,
};
use zeroize::Zeroizing;

use super::errors::TlsError;
use super::sealed;

/// On-disk keystore encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeystoreFormat {
    Pem,
    Sealed,
}

impl KeystoreFormat {
    /// Parse a format name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `TlsError::UnsupportedFormat` for any other name.
    pub fn parse(name: &str) -> Result<Self, TlsError> {
        match name.trim().to_ascii_uppercase().as_str() {
            "PEM" => Ok(KeystoreFormat::Pem),
            "SEALED" => Ok(KeystoreFormat::Sealed),
            _ => Err(TlsError::UnsupportedFormat(name.to_string())),
        }
    }
}

/// The keystore's private key.
pub enum KeyEntry {
    Plain(PrivateKeyDer<'static>),
    /// Sealed PKCS#8 DER, opened with the signing passphrase
    Sealed(Zeroizing<Vec<u8>>),
}

impl fmt::Debug for KeyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEntry::Plain(_) => f.write_str("KeyEntry::Plain(..)"),
            KeyEntry::Sealed(_) => f.write_str("KeyEntry::Sealed(..)"),
        }
    }
}

/// Decoded certificate chain and private key.
#[derive(Debug)]
pub struct Keystore {
    format: KeystoreFormat,
    certificates: Vec<CertificateDer<'static>>,
    key: KeyEntry,
}

impl Keystore {
    /// Read and decode a keystore file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, a sealed keystore cannot be
    /// opened with `passphrase`, or the document lacks a certificate or key.
    pub fn load(path: &Path, format: KeystoreFormat, passphrase: &str) -> Result<Self, TlsError> {
        let data = Zeroizing::new(fs::read(path)?);
        match format {
            KeystoreFormat::Pem => Self::decode(format, &data),
            KeystoreFormat::Sealed => {
                let opened = sealed::open(&data, passphrase)?;
                Self::decode(format, &opened)
            }
        }
    }

    /// Decode PEM text into a keystore.
    ///
    /// # Errors
    ///
    /// Fails on malformed PEM, password-encrypted PKCS#8 keys, more than one
    /// private key, or a missing certificate or key.
    pub fn decode(format: KeystoreFormat, pem_text: &[u8]) -> Result<Self, TlsError> {
        let blocks =
            pem::parse_many(pem_text).map_err(|e| TlsError::CertificateParsing(e.to_string()))?;

        let mut certificates = Vec::new();
        let mut key = None;

        for block in blocks {
            let tag = block.tag().to_string();
            let entry = match tag.as_str() {
                "CERTIFICATE" => {
                    certificates.push(CertificateDer::from(block.into_contents()));
                    continue;
                }
                "PRIVATE KEY" => {
                    KeyEntry::Plain(PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(block.into_contents())))
                }
                "RSA PRIVATE KEY" => {
                    KeyEntry::Plain(PrivateKeyDer::Pkcs1(PrivatePkcs1KeyDer::from(block.into_contents())))
                }
                "EC PRIVATE KEY" => {
                    KeyEntry::Plain(PrivateKeyDer::Sec1(PrivateSec1KeyDer::from(block.into_contents())))
                }
                "SEALED PRIVATE KEY" => KeyEntry::Sealed(Zeroizing::new(block.into_contents())),
                "ENCRYPTED PRIVATE KEY" => {
                    return Err(TlsError::KeyProtection(
                        "password-encrypted PKCS#8 keys are not supported, use a SEALED PRIVATE KEY block"
                            .to_string(),
                    ));
                }
                other => {
                    tracing::debug!(tag = other, "skipping unrecognised keystore block");
                    continue;
                }
            };

            if key.replace(entry).is_some() {
                return Err(TlsError::CertificateParsing(
                    "keystore holds more than one private key".to_string(),
                ));
            }
        }

        if certificates.is_empty() {
            return Err(TlsError::MissingEntry("certificate"));
        }
        let key = key.ok_or(TlsError::MissingEntry("private key"))?;

        Ok(Self {
            format,
            certificates,
            key,
        })
    }

    #[must_use]
    pub fn format(&self) -> KeystoreFormat {
        self.format
    }

    /// Certificate chain, leaf first.
    #[must_use]
    pub fn certificates(&self) -> &[CertificateDer<'static>] {
        &self.certificates
    }

    #[must_use]
    pub fn key(&self) -> &KeyEntry {
        &self.key
    }
}
