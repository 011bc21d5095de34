use std::error::Error as StdError;
use std::io;

use super::types::{Error, Kind};

impl Error {
    /// Returns true for missing or invalid configuration.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self.kind(), Kind::Config)
    }

    /// Returns true when the keystore or key manager could not be initialised.
    #[must_use]
    pub fn is_keystore(&self) -> bool {
        matches!(self.kind(), Kind::Keystore)
    }

    /// Returns true when the handshake produced no secure session.
    #[must_use]
    pub fn is_secure_connection(&self) -> bool {
        matches!(self.kind(), Kind::SecureConnection)
    }

    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self.kind(), Kind::Network)
    }

    /// Whether a caller may reasonably retry without changing anything.
    ///
    /// Only network failures qualify; configuration, keystore and handshake
    /// failures need the caller to intervene first.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.is_network()
    }

    /// Returns true if any cause in the chain is an I/O timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.io_kind() == Some(io::ErrorKind::TimedOut)
            || self.io_kind() == Some(io::ErrorKind::WouldBlock)
    }

    /// Kind of the first `io::Error` found in the source chain.
    #[must_use]
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        let mut source = self.source();

        while let Some(err) = source {
            if let Some(io) = err.downcast_ref::<io::Error>() {
                return Some(io.kind());
            }
            source = err.source();
        }

        None
    }
}
