use std::borrow::Cow;
use std::io;

use super::types::{BoxError, Error, Kind};

/// Creates a `Config` error.
pub fn config(message: impl Into<Cow<'static, str>>) -> Error {
    Error::new(Kind::Config, message)
}

/// Creates a `Config` error for a property that must be present.
pub fn missing_key(name: &str) -> Error {
    Error::new(Kind::Config, format!("missing required key: {name}"))
}

/// Creates a `Keystore` error wrapping the decode or initialisation cause.
pub fn keystore<E: Into<BoxError>>(message: impl Into<Cow<'static, str>>, cause: E) -> Error {
    Error::new(Kind::Keystore, message).with(cause)
}

/// Creates a `SecureConnection` error.
pub fn secure_connection(message: impl Into<Cow<'static, str>>) -> Error {
    Error::new(Kind::SecureConnection, message)
}

/// Creates a `Network` error wrapping the underlying cause.
pub fn network<E: Into<BoxError>>(message: impl Into<Cow<'static, str>>, cause: E) -> Error {
    Error::new(Kind::Network, message).with(cause)
}

/// Creates the `Network` error for a host name that does not resolve.
pub fn unknown_host(host: &str, cause: io::Error) -> Error {
    network(
        "unknown host",
        io::Error::new(cause.kind(), format!("{host}: {cause}")),
    )
}

/// Classifies an OS-level dial or bind failure.
pub fn from_dial(err: io::Error) -> Error {
    let message = match err.kind() {
        io::ErrorKind::AddrInUse => "address in use",
        io::ErrorKind::ConnectionRefused => "connection refused",
        io::ErrorKind::AddrNotAvailable => "address not available",
        io::ErrorKind::TimedOut => "timed out",
        io::ErrorKind::NotFound => "unknown host",
        _ => "connect failed",
    };
    network(message, err)
}

/// Creates a `Network` error for I/O on an established session.
pub fn io(err: io::Error) -> Error {
    network("session i/o failed", err)
}
