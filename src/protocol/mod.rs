//! Protocol module - wire format, framing, and packet types.
//!
//! This module implements the widget's framed binary protocol:
//! - Sentinel-delimited packet encoding/decoding
//! - Packet buffer for accumulating partial reads
//! - Packet struct with typed accessors
//! - The fixed parameter block carried by labels 3 and 4

mod packet;
mod packet_buffer;
pub mod params;
mod wire_format;

pub use packet::{decode_packet, Packet};
pub use packet_buffer::PacketBuffer;
pub use wire_format::{
    build_packet, Header, EOM, HEADER_SIZE, LABEL_GET_PARAMETERS, LABEL_OUTPUT_DMX,
    LABEL_SET_PARAMETERS, MAX_PAYLOAD_SIZE, SOM,
};
