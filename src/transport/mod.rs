//! Transport module - the widget's USB-serial byte channel.

mod serial;

pub use serial::{available_ports, open_serial_port};
