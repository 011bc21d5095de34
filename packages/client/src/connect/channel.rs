//! Byte channels a session can run over

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use rustls::{ClientConnection, StreamOwned};

use crate::tls::protocol::protocol_name;

/// A connected, bidirectional byte channel.
///
/// Implemented for plain sockets and client TLS streams; a caller may also
/// hand a connector its own implementation as a preset channel.
pub trait Channel: Read + Write + Send + fmt::Debug {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    fn read_timeout(&self) -> io::Result<Option<Duration>>;

    fn local_addr(&self) -> io::Result<SocketAddr>;

    fn peer_addr(&self) -> io::Result<SocketAddr>;

    /// Close both directions, sending a TLS close notification first where
    /// one applies.
    fn shutdown(&mut self) -> io::Result<()>;

    /// Drive the handshake to completion. Plain channels have none.
    fn complete_handshake(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Negotiated protocol name, `None` when no secure session exists.
    fn negotiated_protocol(&self) -> Option<String> {
        None
    }

    fn is_secure(&self) -> bool {
        false
    }
}

impl Channel for TcpStream {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn read_timeout(&self) -> io::Result<Option<Duration>> {
        TcpStream::read_timeout(self)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::local_addr(self)
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::peer_addr(self)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// Client TLS session over a TCP socket.
pub struct TlsChannel {
    stream: StreamOwned<ClientConnection, TcpStream>,
}

impl TlsChannel {
    pub fn new(connection: ClientConnection, socket: TcpStream) -> Self {
        Self {
            stream: StreamOwned::new(connection, socket),
        }
    }

    #[must_use]
    pub fn connection(&self) -> &ClientConnection {
        &self.stream.conn
    }

    #[must_use]
    pub fn socket(&self) -> &TcpStream {
        &self.stream.sock
    }
}

impl fmt::Debug for TlsChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsChannel")
            .field("socket", &self.stream.sock)
            .field("handshaking", &self.stream.conn.is_handshaking())
            .field("protocol", &self.stream.conn.protocol_version())
            .finish()
    }
}

impl Read for TlsChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for TlsChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl Channel for TlsChannel {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.stream.sock.set_read_timeout(timeout)
    }

    fn read_timeout(&self) -> io::Result<Option<Duration>> {
        self.stream.sock.read_timeout()
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.stream.sock.local_addr()
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.stream.sock.peer_addr()
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.stream.conn.send_close_notify();
        while self.stream.conn.wants_write() {
            if self.stream.conn.write_tls(&mut self.stream.sock)? == 0 {
                break;
            }
        }
        self.stream.sock.shutdown(Shutdown::Both)
    }

    fn complete_handshake(&mut self) -> io::Result<()> {
        while self.stream.conn.is_handshaking() {
            self.stream.conn.complete_io(&mut self.stream.sock)?;
        }
        Ok(())
    }

    fn negotiated_protocol(&self) -> Option<String> {
        if self.stream.conn.is_handshaking() {
            return None;
        }
        self.stream.conn.protocol_version().map(protocol_name)
    }

    fn is_secure(&self) -> bool {
        true
    }
}
