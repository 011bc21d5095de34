//! RFC 5734 data units
//!
//! Every EPP message over TCP is preceded by a 4-byte big-endian length
//! that counts the header itself plus the UTF-8 XML payload.

use std::io::{self, BufRead, Write};

use epp_transport_client::error::{self, Result};

/// Length of the frame header.
pub const HEADER_LEN: usize = 4;

/// Largest frame accepted from a server.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Why a frame could not be read or written.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame length {0} is shorter than its header")]
    TooShort(u32),
    #[error("frame length {0} exceeds the {MAX_FRAME_LEN} byte limit")]
    TooLarge(usize),
    #[error("frame payload is not UTF-8")]
    NotUtf8(#[from] std::string::FromUtf8Error),
    #[error("frame i/o failed: {0}")]
    Io(#[from] io::Error),
}

impl From<FrameError> for epp_transport_client::Error {
    fn from(err: FrameError) -> Self {
        let message = match &err {
            FrameError::Io(_) => "frame i/o failed",
            _ => "malformed frame",
        };
        error::network(message, err)
    }
}

/// Write one frame carrying `xml` and flush it.
///
/// # Errors
///
/// `Network` if the payload is too large or the write fails.
pub fn write_frame<W: Write + ?Sized>(writer: &mut W, xml: &str) -> Result<()> {
    let total = xml.len() + HEADER_LEN;
    let length = u32::try_from(total)
        .ok()
        .filter(|_| total <= MAX_FRAME_LEN)
        .ok_or(FrameError::TooLarge(total))?;

    writer
        .write_all(&length.to_be_bytes())
        .and_then(|()| writer.write_all(xml.as_bytes()))
        .and_then(|()| writer.flush())
        .map_err(FrameError::from)?;
    Ok(())
}

/// Read one frame and return its payload.
///
/// # Errors
///
/// `Network` on a short, oversized or non-UTF-8 frame, and on I/O failure
/// including the session read timeout.
pub fn read_frame<R: BufRead + ?Sized>(reader: &mut R) -> Result<String> {
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header).map_err(FrameError::from)?;

    let total = u32::from_be_bytes(header);
    let total_len = total as usize;
    if total_len < HEADER_LEN {
        return Err(FrameError::TooShort(total).into());
    }
    if total_len > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(total_len).into());
    }

    let mut payload = vec![0u8; total_len - HEADER_LEN];
    reader.read_exact(&mut payload).map_err(FrameError::from)?;
    Ok(String::from_utf8(payload).map_err(FrameError::from)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_counts_itself() {
        let mut out = Vec::new();
        write_frame(&mut out, "<epp/>").expect("write");
        assert_eq!(&out[..4], &10u32.to_be_bytes());
        assert_eq!(&out[4..], b"<epp/>");

        let xml = read_frame(&mut Cursor::new(out)).expect("read");
        assert_eq!(xml, "<epp/>");
    }

    #[test]
    fn empty_payload_is_allowed() {
        let xml = read_frame(&mut Cursor::new(4u32.to_be_bytes().to_vec())).expect("read");
        assert!(xml.is_empty());
    }

    #[test]
    fn rejects_bad_lengths() {
        let err = read_frame(&mut Cursor::new(3u32.to_be_bytes().to_vec())).unwrap_err();
        assert!(err.is_network());
        assert_eq!(err.message(), "malformed frame");

        let oversized = u32::try_from(MAX_FRAME_LEN + 1).expect("fits");
        let err = read_frame(&mut Cursor::new(oversized.to_be_bytes().to_vec())).unwrap_err();
        assert!(err.is_network());
    }

    #[test]
    fn truncated_frame_is_io_failure() {
        let mut data = 20u32.to_be_bytes().to_vec();
        data.extend_from_slice(b"<ep");
        let err = read_frame(&mut Cursor::new(data)).unwrap_err();
        assert_eq!(err.message(), "frame i/o failed");
        assert_eq!(err.io_kind(), Some(io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut data = 6u32.to_be_bytes().to_vec();
        data.extend_from_slice(&[0xff, 0xfe]);
        assert!(read_frame(&mut Cursor::new(data)).is_err());
    }
}
