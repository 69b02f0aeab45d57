//! Packet buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management and a state
//! machine for handling fragmented packets:
//! - `WaitingForHeader`: need at least 4 bytes
//! - `WaitingForPayload`: header parsed, need payload + end sentinel
//!
//! The transport delivers bytes with no message boundaries, so chunks
//! may split a packet anywhere; partial data stays buffered until the
//! next push. A sentinel mismatch is fatal: once it is reported the
//! buffer contents are unusable and the owning session must tear down.
//!
//! # Example
//!
//! ```ignore
//! use dmxpro_client::protocol::PacketBuffer;
//!
//! let mut buffer = PacketBuffer::new();
//!
//! // Data arrives in arbitrary chunks from the serial port
//! let packets = buffer.push(&chunk)?;
//! for packet in packets {
//!     println!("got packet with label {}", packet.label);
//! }
//! ```

use bytes::BytesMut;

use super::wire_format::{Header, EOM, HEADER_SIZE};
use super::Packet;
use crate::error::{Result, WidgetError};

/// State machine for packet parsing.
#[derive(Debug, Clone)]
enum State {
    /// Waiting for a complete header (need 4 bytes).
    WaitingForHeader,
    /// Header parsed, waiting for payload bytes plus the end sentinel.
    WaitingForPayload { label: u8, length: usize },
}

/// Buffer for accumulating incoming bytes and extracting complete
/// packets in arrival order.
///
/// The buffer grows as needed; the protocol's messages are small and
/// no backpressure is applied.
pub struct PacketBuffer {
    /// Accumulated bytes from transport reads.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
}

impl PacketBuffer {
    /// Create a new empty packet buffer.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(1024),
            state: State::WaitingForHeader,
        }
    }

    /// Push data into the buffer and extract all complete packets.
    ///
    /// This is the main API for processing incoming data from the
    /// transport. Returns the packets completed by this chunk, in the
    /// order they were decoded (may be empty if still waiting for
    /// data).
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Framing`] on a sentinel mismatch. The
    /// buffer is left in an undefined position and must not be pushed
    /// to again.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Packet>> {
        self.buffer.extend_from_slice(data);

        let mut packets = Vec::new();
        while let Some(packet) = self.try_extract_one()? {
            packets.push(packet);
        }
        Ok(packets)
    }

    /// Try to extract a single packet from the buffer.
    ///
    /// Returns:
    /// - `Ok(Some(packet))` if a complete packet was extracted
    /// - `Ok(None)` if more data is needed
    /// - `Err(...)` on a sentinel mismatch
    fn try_extract_one(&mut self) -> Result<Option<Packet>> {
        match &self.state {
            State::WaitingForHeader => {
                let header = match Header::decode(&self.buffer)? {
                    Some(h) => h,
                    None => return Ok(None),
                };

                // Consume header bytes
                let _ = self.buffer.split_to(HEADER_SIZE);

                self.state = State::WaitingForPayload {
                    label: header.label,
                    length: header.length as usize,
                };

                // Try to get the payload immediately
                self.try_extract_one()
            }

            State::WaitingForPayload { label, length } => {
                let (label, length) = (*label, *length);

                // Payload plus the end sentinel
                if self.buffer.len() < length + 1 {
                    return Ok(None);
                }

                // Extract payload (zero-copy freeze)
                let payload = self.buffer.split_to(length).freeze();
                let end = self.buffer.split_to(1)[0];
                if end != EOM {
                    return Err(WidgetError::Framing(format!(
                        "expected end sentinel {EOM:#04x} after {length}-byte payload, found {end:#04x}"
                    )));
                }

                // Reset state for the next packet
                self.state = State::WaitingForHeader;

                Ok(Some(Packet::new(label, payload)))
            }
        }
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForHeader;
    }

    /// Get the current state for debugging.
    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match &self.state {
            State::WaitingForHeader => "WaitingForHeader",
            State::WaitingForPayload { .. } => "WaitingForPayload",
        }
    }
}

impl Default for PacketBuffer {
    fn default() -> Self {
        Self::new()
    }
}
