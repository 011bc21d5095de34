//! Socket creation, optionally bound to a local endpoint
//!
//! Unbound dials try each resolved remote address in turn. Bound dials
//! create the socket with `socket2`, bind it to the resolved local endpoint
//! and only then connect, so a bind failure surfaces before any traffic.

use std::io;
use std::net::{SocketAddr, TcpStream};

use socket2::{Domain, Protocol, Socket, Type};

use super::channel::TlsChannel;
use super::dns::resolve_host_sync;
use crate::config::ConnectionConfig;
use crate::error::{self, Result};
use crate::tls::TlsContext;

/// Dials the server, binding first when a local endpoint is configured.
#[derive(Debug, Clone, Default)]
pub struct LocalBinder {
    local: Option<(String, u16)>,
}

impl LocalBinder {
    /// Binding applies only when both halves are present.
    pub fn new(local_address: Option<&str>, local_port: Option<u16>) -> Self {
        let local = match (local_address, local_port) {
            (Some(address), Some(port)) if !address.is_empty() => Some((address.to_string(), port)),
            _ => None,
        };
        Self { local }
    }

    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self::new(config.local_address(), config.local_port())
    }

    #[must_use]
    pub fn local(&self) -> Option<(&str, u16)> {
        self.local.as_ref().map(|(address, port)| (address.as_str(), *port))
    }

    /// Open a plain TCP connection to `host:port`.
    ///
    /// # Errors
    ///
    /// `Network` errors: "unknown host" for unresolvable names, "address in
    /// use" when the local endpoint is taken, otherwise the classified
    /// connect failure.
    pub fn dial(&self, host: &str, port: u16) -> Result<TcpStream> {
        let remotes = resolve_host_sync(host, port).map_err(|err| error::unknown_host(host, err))?;

        let stream = match self.local_endpoint()? {
            None => connect_to_address_list(&remotes)?,
            Some(local) => connect_bound(local, &remotes)?,
        };

        tracing::debug!(
            host,
            port,
            local = ?stream.local_addr().ok(),
            peer = ?stream.peer_addr().ok(),
            "tcp connection established"
        );
        Ok(stream)
    }

    /// Dial and layer a TLS session from `context` over the socket.
    ///
    /// # Errors
    ///
    /// Any [`LocalBinder::dial`] error, or the context's session creation
    /// error.
    pub fn dial_secure(&self, host: &str, port: u16, context: &TlsContext) -> Result<TlsChannel> {
        let socket = self.dial(host, port)?;
        context.channel(host, socket)
    }

    fn local_endpoint(&self) -> Result<Option<SocketAddr>> {
        let Some((address, port)) = self.local() else {
            return Ok(None);
        };
        let resolved =
            resolve_host_sync(address, port).map_err(|err| error::unknown_host(address, err))?;
        Ok(resolved.into_iter().next())
    }
}

fn connect_to_address_list(addrs: &[SocketAddr]) -> Result<TcpStream> {
    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect(addr) {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                tracing::debug!(%addr, error = %err, "connect attempt failed");
                last_error = Some(err);
            }
        }
    }
    Err(error::from_dial(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "no addresses to connect to")
    })))
}

fn connect_bound(local: SocketAddr, remotes: &[SocketAddr]) -> Result<TcpStream> {
    let mut last_error = None;

    for remote in remotes.iter().filter(|remote| remote.is_ipv4() == local.is_ipv4()) {
        let socket = Socket::new(Domain::for_address(local), Type::STREAM, Some(Protocol::TCP))
            .map_err(error::from_dial)?;
        // A reconnect finds the previous session's port in TIME_WAIT. Ports
        // held by a listener or a live socket still fail with address in use.
        socket.set_reuse_address(true).map_err(error::from_dial)?;
        socket.bind(&local.into()).map_err(|err| {
            tracing::debug!(%local, error = %err, "local bind failed");
            error::from_dial(err)
        })?;

        match socket.connect(&(*remote).into()) {
            Ok(()) => return Ok(socket.into()),
            Err(err) => {
                tracing::debug!(%local, %remote, error = %err, "bound connect attempt failed");
                last_error = Some(err);
            }
        }
    }

    Err(error::from_dial(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no remote address in the address family of {local}"),
        )
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn binding_needs_both_halves() {
        assert!(LocalBinder::new(Some("127.0.0.1"), None).local().is_none());
        assert!(LocalBinder::new(None, Some(4000)).local().is_none());
        assert!(LocalBinder::new(Some(""), Some(4000)).local().is_none());
        assert_eq!(
            LocalBinder::new(Some("127.0.0.1"), Some(4000)).local(),
            Some(("127.0.0.1", 4000))
        );
    }

    #[test]
    fn unbound_dial_reaches_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
        let port = listener.local_addr().expect("addr").port();
        let stream = LocalBinder::default().dial("127.0.0.1", port).expect("dial");
        assert_eq!(stream.peer_addr().expect("peer").port(), port);
    }

    #[test]
    fn refused_dial_is_network_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
            listener.local_addr().expect("addr").port()
        };
        let err = LocalBinder::default().dial("127.0.0.1", port).unwrap_err();
        assert!(err.is_network());
    }

    #[test]
    fn unknown_host_is_reported() {
        let err = LocalBinder::default()
            .dial("no-such-host.invalid", 700)
            .unwrap_err();
        assert!(err.is_network());
        assert_eq!(err.message(), "unknown host");
    }

    #[test]
    fn taken_local_port_is_address_in_use() {
        let server = TcpListener::bind("127.0.0.1:0").expect("server");
        let server_port = server.local_addr().expect("addr").port();
        let occupied = TcpListener::bind("127.0.0.1:0").expect("occupied");
        let local_port = occupied.local_addr().expect("addr").port();

        let err = LocalBinder::new(Some("127.0.0.1"), Some(local_port))
            .dial("127.0.0.1", server_port)
            .unwrap_err();
        assert!(err.is_network());
        assert_eq!(err.message(), "address in use");
    }
}
