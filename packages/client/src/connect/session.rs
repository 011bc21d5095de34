//! Buffered read/write streams over a connected channel

use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::SocketAddr;
use std::time::Duration;

use super::channel::Channel;
use crate::config::defaults::SESSION_BUFFER_SIZE;

/// Buffered session over one channel.
///
/// Reads go through an 8 KiB read buffer and block for at most the
/// configured read timeout. Writes accumulate in an 8 KiB buffer until it
/// fills or [`Write::flush`] is called; data still pending when the session
/// is dropped without [`SocketSession::close`] is discarded.
pub struct SocketSession {
    reader: BufReader<Box<dyn Channel>>,
    pending: Vec<u8>,
    read_timeout: Duration,
    local_addr: Option<SocketAddr>,
    peer_addr: Option<SocketAddr>,
    protocol: Option<String>,
    preset: bool,
}

impl SocketSession {
    /// Apply `read_timeout` to the channel and wrap it.
    ///
    /// # Errors
    ///
    /// Fails if the timeout cannot be set on the channel.
    pub fn wrap(channel: Box<dyn Channel>, read_timeout: Duration, preset: bool) -> io::Result<Self> {
        channel.set_read_timeout(Some(read_timeout))?;

        Ok(Self {
            local_addr: channel.local_addr().ok(),
            peer_addr: channel.peer_addr().ok(),
            protocol: channel.negotiated_protocol(),
            reader: BufReader::with_capacity(SESSION_BUFFER_SIZE, channel),
            pending: Vec::with_capacity(SESSION_BUFFER_SIZE),
            read_timeout,
            preset,
        })
    }

    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    #[must_use]
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Negotiated TLS protocol, `None` on plain channels.
    #[must_use]
    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    #[must_use]
    pub fn is_preset(&self) -> bool {
        self.preset
    }

    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.reader.get_ref().is_secure()
    }

    #[must_use]
    pub fn channel(&self) -> &dyn Channel {
        &**self.reader.get_ref()
    }

    /// Bytes written but not yet sent.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Flush pending output, then shut the channel down.
    ///
    /// # Errors
    ///
    /// The first of the flush or shutdown errors; shutdown is attempted
    /// either way.
    pub fn close(mut self) -> io::Result<()> {
        let flushed = self.flush();
        let mut channel = self.reader.into_inner();
        let closed = channel.shutdown();
        flushed.and(closed)
    }

    /// Flush pending output and give the channel back unclosed.
    pub(crate) fn into_channel(mut self) -> io::Result<Box<dyn Channel>> {
        self.flush()?;
        Ok(self.reader.into_inner())
    }

    fn flush_pending(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            self.reader.get_mut().write_all(&self.pending)?;
            self.pending.clear();
        }
        Ok(())
    }
}

impl fmt::Debug for SocketSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketSession")
            .field("channel", self.reader.get_ref())
            .field("pending", &self.pending.len())
            .field("read_timeout", &self.read_timeout)
            .field("protocol", &self.protocol)
            .field("preset", &self.preset)
            .finish()
    }
}

impl Read for SocketSession {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl BufRead for SocketSession {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.reader.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.reader.consume(amt);
    }
}

impl Write for SocketSession {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.pending.len() + buf.len() > SESSION_BUFFER_SIZE {
            self.flush_pending()?;
        }
        if buf.len() >= SESSION_BUFFER_SIZE {
            return self.reader.get_mut().write(buf);
        }
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_pending()?;
        self.reader.get_mut().flush()
    }
}
