//! Serial port handling.
//!
//! The widget enumerates as a USB CDC serial device; the driver treats
//! it as an opaque bidirectional byte channel. `SerialStream`
//! implements `AsyncRead + AsyncWrite`, so the session code stays
//! generic over the transport (tests substitute an in-memory duplex).

use tokio_serial::{DataBits, Parity, SerialPortBuilderExt, SerialStream, StopBits};

use crate::config::WidgetConfig;
use crate::error::Result;

/// Open the configured serial port as an async byte stream.
///
/// 8 data bits, no parity, one stop bit at the configured baud rate.
pub fn open_serial_port(config: &WidgetConfig) -> Result<SerialStream> {
    let stream = tokio_serial::new(&config.port, config.baud)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .open_native_async()?;
    tracing::debug!(port = %config.port, baud = config.baud, "serial port opened");
    Ok(stream)
}

/// List the serial ports available on this host.
pub fn available_ports() -> Result<Vec<String>> {
    Ok(tokio_serial::available_ports()?
        .into_iter()
        .map(|p| p.port_name)
        .collect())
}
