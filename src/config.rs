//! Connection configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::frame::DEFAULT_UNIVERSE_SIZE;

/// Default baud rate of the widget's USB-serial interface.
pub const DEFAULT_BAUD: u32 = 57_600;

/// Default render tick interval in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 10;

/// Connection settings for one widget.
///
/// All fields other than `port` have protocol defaults, so a JSON
/// config file only needs to name the device:
///
/// ```json
/// { "port": "/dev/ttyUSB0" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Serial port device path, e.g. `/dev/ttyUSB0`.
    pub port: String,
    /// Baud rate.
    pub baud: u32,
    /// Number of channels in the output universe.
    pub universe_size: usize,
    /// DMX start code prepended to every output frame.
    pub start_code: u8,
    /// Render tick interval in milliseconds.
    pub interval_ms: u64,
}

impl WidgetConfig {
    /// Create a config for the given port with protocol defaults.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    /// The render tick interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Load settings from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud: DEFAULT_BAUD,
            universe_size: DEFAULT_UNIVERSE_SIZE,
            start_code: 0,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}
