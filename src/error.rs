//! Error types for dmxpro-client.

use thiserror::Error;

/// Main error type for all widget operations.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// I/O error on the transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port open/configure error.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// JSON error while reading a config file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Sentinel byte mismatch while deframing. Fatal to the session:
    /// the buffer's alignment is lost and the wire format defines no
    /// resynchronization point.
    #[error("framing error: {0}")]
    Framing(String),

    /// Payload does not fit the 16-bit length field.
    #[error("payload length {0} exceeds the 16-bit length field")]
    PayloadTooLarge(usize),

    /// Protocol violation (e.g. malformed parameter payload).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Result type alias using WidgetError.
pub type Result<T> = std::result::Result<T, WidgetError>;
