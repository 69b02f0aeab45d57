//! Widget parameter block codec.
//!
//! The Get Widget Parameters reply and the Set Widget Parameters
//! request both carry the same fixed 5-byte field block.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WidgetError};

/// Size of the parameter block on the wire.
pub const PARAMS_SIZE: usize = 5;

/// Operating parameters reported by (and sent to) the widget.
///
/// Field order matches the wire layout: firmware version (u16 LE),
/// break time, mark-after-break time, output rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetParameters {
    /// Firmware version, major in the high byte.
    pub firmware_version: u16,
    /// DMX break time, in 10.67 microsecond units.
    pub break_time: u8,
    /// Mark-after-break time, in 10.67 microsecond units.
    pub mark_after_break_time: u8,
    /// DMX output rate in packets per second (0 = as fast as possible).
    pub output_rate: u8,
}

impl WidgetParameters {
    /// Decode the fixed 5-byte parameter block.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Protocol`] if the payload is not exactly
    /// [`PARAMS_SIZE`] bytes.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() != PARAMS_SIZE {
            return Err(WidgetError::Protocol(format!(
                "parameter payload must be {PARAMS_SIZE} bytes, got {}",
                payload.len()
            )));
        }
        Ok(Self {
            firmware_version: u16::from_le_bytes([payload[0], payload[1]]),
            break_time: payload[2],
            mark_after_break_time: payload[3],
            output_rate: payload[4],
        })
    }

    /// Encode into the fixed 5-byte wire layout.
    pub fn encode(&self) -> [u8; PARAMS_SIZE] {
        let fw = self.firmware_version.to_le_bytes();
        [
            fw[0],
            fw[1],
            self.break_time,
            self.mark_after_break_time,
            self.output_rate,
        ]
    }
}
