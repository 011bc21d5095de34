//! Causes behind keystore, key manager and TLS context failures

/// Detailed cause wrapped by every `Keystore` kind error.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("keystore file unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("certificate parsing failed: {0}")]
    CertificateParsing(String),
    #[error("key protection failed: {0}")]
    KeyProtection(String),
    #[error("unsupported keystore format: {0}")]
    UnsupportedFormat(String),
    #[error("unsupported keystore provider: {0}")]
    UnsupportedProvider(String),
    #[error("unsupported TLS protocol: {0}")]
    UnsupportedProtocol(String),
    #[error("unsupported key manager algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("keystore holds no {0}")]
    MissingEntry(&'static str),
    #[error("TLS configuration rejected: {0}")]
    Rustls(#[from] rustls::Error),
}
