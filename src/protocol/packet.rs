//! Packet struct with typed accessors.
//!
//! Represents a complete protocol packet: a label identifying the
//! message type plus an opaque payload. Uses `bytes::Bytes` for
//! zero-copy payload sharing.

use bytes::Bytes;

use super::wire_format::{
    build_packet, Header, EOM, HEADER_SIZE, LABEL_GET_PARAMETERS, LABEL_OUTPUT_DMX,
    LABEL_SET_PARAMETERS,
};
use crate::error::{Result, WidgetError};

/// A complete protocol packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Packet label (message type).
    pub label: u8,
    /// Payload bytes (zero-copy via `bytes::Bytes`).
    pub payload: Bytes,
}

impl Packet {
    /// Create a new packet from label and payload.
    pub fn new(label: u8, payload: Bytes) -> Self {
        Self { label, payload }
    }

    /// Create a packet from label and raw bytes (copies data).
    pub fn from_parts(label: u8, payload: &[u8]) -> Self {
        Self {
            label,
            payload: Bytes::copy_from_slice(payload),
        }
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get the payload length.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Check if this is a Get Widget Parameters reply.
    #[inline]
    pub fn is_parameters(&self) -> bool {
        self.label == LABEL_GET_PARAMETERS
    }

    /// Check if this is a Set Widget Parameters request.
    #[inline]
    pub fn is_set_parameters(&self) -> bool {
        self.label == LABEL_SET_PARAMETERS
    }

    /// Check if this is a DMX output packet.
    #[inline]
    pub fn is_dmx_output(&self) -> bool {
        self.label == LABEL_OUTPUT_DMX
    }

    /// Encode this packet into its wire representation.
    pub fn encode(&self) -> Result<Vec<u8>> {
        build_packet(self.label, &self.payload)
    }
}

/// Attempt to decode the first packet at the front of `buf`.
///
/// Returns the packet and the number of bytes it occupied on the wire,
/// or `None` when the buffer holds only a partial packet (nothing is
/// consumed; wait for more data).
///
/// # Errors
///
/// Returns [`WidgetError::Framing`] on a start or end sentinel
/// mismatch. This is fatal for the byte stream; see
/// [`PacketBuffer`](super::PacketBuffer).
pub fn decode_packet(buf: &[u8]) -> Result<Option<(Packet, usize)>> {
    let header = match Header::decode(buf)? {
        Some(h) => h,
        None => return Ok(None),
    };
    let length = header.length as usize;
    let total = HEADER_SIZE + length + 1;
    if buf.len() < total {
        return Ok(None);
    }
    let end = buf[HEADER_SIZE + length];
    if end != EOM {
        return Err(WidgetError::Framing(format!(
            "expected end sentinel {EOM:#04x} after {length}-byte payload, found {end:#04x}"
        )));
    }
    let packet = Packet::from_parts(header.label, &buf[HEADER_SIZE..HEADER_SIZE + length]);
    Ok(Some((packet, total)))
}
