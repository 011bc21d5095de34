//! TLS protocol names accepted in `ssl.protocol`

use rustls::{ProtocolVersion, SupportedProtocolVersion};

use super::errors::TlsError;

static TLS12_ONLY: &[&SupportedProtocolVersion] = &[&rustls::version::TLS12];
static TLS13_ONLY: &[&SupportedProtocolVersion] = &[&rustls::version::TLS13];

/// Protocol versions a context may negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsProtocol {
    /// `TLS` or `SSL`: every version the provider supports
    Any,
    Tls12,
    Tls13,
}

impl TlsProtocol {
    /// # Errors
    ///
    /// Returns `TlsError::UnsupportedProtocol` for names such as `TLSv1` or
    /// `SSLv3` that no supported provider implements.
    pub fn parse(name: &str) -> Result<Self, TlsError> {
        match name.trim().to_ascii_uppercase().as_str() {
            "TLS" | "SSL" => Ok(TlsProtocol::Any),
            "TLSV1.2" => Ok(TlsProtocol::Tls12),
            "TLSV1.3" => Ok(TlsProtocol::Tls13),
            _ => Err(TlsError::UnsupportedProtocol(name.to_string())),
        }
    }

    #[must_use]
    pub fn versions(self) -> &'static [&'static SupportedProtocolVersion] {
        match self {
            TlsProtocol::Any => rustls::ALL_VERSIONS,
            TlsProtocol::Tls12 => TLS12_ONLY,
            TlsProtocol::Tls13 => TLS13_ONLY,
        }
    }
}

/// Display name of a negotiated version, e.g. `TLSv1.3`.
#[must_use]
pub fn protocol_name(version: ProtocolVersion) -> String {
    match version {
        ProtocolVersion::TLSv1_2 => "TLSv1.2".to_string(),
        ProtocolVersion::TLSv1_3 => "TLSv1.3".to_string(),
        other => format!("{other:?}"),
    }
}
