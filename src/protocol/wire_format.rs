//! Wire format encoding and decoding.
//!
//! Implements the framed packet layout spoken by the widget:
//! ```text
//! ┌──────┬───────┬──────────┬─────────┬──────┐
//! │ SOM  │ Label │ Length L │ Payload │ EOM  │
//! │ 0x7E │ u8    │ u16 LE   │ L bytes │ 0xE7 │
//! └──────┴───────┴──────────┴─────────┴──────┘
//! ```
//!
//! All multi-byte integers are Little Endian. The only delimiters are
//! the two sentinel bytes plus the embedded length; a sentinel mismatch
//! means the byte stream is desynchronized and is reported as a fatal
//! [`WidgetError::Framing`].

use crate::error::{Result, WidgetError};

/// Start-of-message sentinel.
pub const SOM: u8 = 0x7E;

/// End-of-message sentinel.
pub const EOM: u8 = 0xE7;

/// Header size in bytes (SOM + label + 16-bit length).
pub const HEADER_SIZE: usize = 4;

/// Maximum payload length representable in the 16-bit length field.
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// Label for the Get Widget Parameters request/reply.
pub const LABEL_GET_PARAMETERS: u8 = 3;

/// Label for the Set Widget Parameters request.
pub const LABEL_SET_PARAMETERS: u8 = 4;

/// Label for the Output Only Send DMX packet.
pub const LABEL_OUTPUT_DMX: u8 = 6;

/// Decoded packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Packet label (message type).
    pub label: u8,
    /// Payload length in bytes.
    pub length: u16,
}

impl Header {
    /// Create a new header.
    pub fn new(label: u8, length: u16) -> Self {
        Self { label, length }
    }

    /// Encode the header to bytes, including the start sentinel.
    ///
    /// # Example
    ///
    /// ```
    /// use dmxpro_client::protocol::Header;
    ///
    /// let bytes = Header::new(6, 25).encode();
    /// assert_eq!(bytes, [0x7E, 6, 25, 0]);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let len = self.length.to_le_bytes();
        [SOM, self.label, len[0], len[1]]
    }

    /// Decode a header from the front of `buf`.
    ///
    /// Returns `Ok(None)` if fewer than [`HEADER_SIZE`] bytes are
    /// available (wait for more data; nothing is consumed). Fails with
    /// [`WidgetError::Framing`] if the first byte is not the start
    /// sentinel.
    pub fn decode(buf: &[u8]) -> Result<Option<Self>> {
        if buf.len() < HEADER_SIZE {
            return Ok(None);
        }
        if buf[0] != SOM {
            return Err(WidgetError::Framing(format!(
                "expected start sentinel {SOM:#04x}, found {:#04x}",
                buf[0]
            )));
        }
        Ok(Some(Self {
            label: buf[1],
            length: u16::from_le_bytes([buf[2], buf[3]]),
        }))
    }
}

/// Build a complete packet as a single byte vector.
///
/// # Errors
///
/// Returns [`WidgetError::PayloadTooLarge`] if the payload exceeds
/// [`MAX_PAYLOAD_SIZE`]; never truncates.
///
/// # Example
///
/// ```
/// use dmxpro_client::protocol::{build_packet, LABEL_GET_PARAMETERS};
///
/// let bytes = build_packet(LABEL_GET_PARAMETERS, &[0, 0]).unwrap();
/// assert_eq!(bytes, [0x7E, 3, 2, 0, 0, 0, 0xE7]);
/// ```
pub fn build_packet(label: u8, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(WidgetError::PayloadTooLarge(payload.len()));
    }
    let header = Header::new(label, payload.len() as u16);
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len() + 1);
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(payload);
    buf.push(EOM);
    Ok(buf)
}
