//! Chaser - walks a single lit channel across the universe.
//!
//! This demo shows:
//! - Implementing `WidgetHandler` and mutating the frame per tick
//! - Starting a session over a real serial port from a config
//! - The step counter driving animation timing
//!
//! Run with the widget's serial port as the only argument:
//!
//! ```sh
//! cargo run --example chaser -- /dev/ttyUSB0
//! ```

use dmxpro_client::{FrameBuffer, WidgetClient, WidgetConfig, WidgetHandler, WidgetParameters};

/// Lights one channel at a time, advancing four channels per second.
#[derive(Default)]
struct Chaser;

impl WidgetHandler for Chaser {
    fn on_ready(&mut self, params: &WidgetParameters, _frame: &mut FrameBuffer) {
        tracing::info!(
            firmware = params.firmware_version,
            rate = params.output_rate,
            "widget ready"
        );
    }

    fn on_tick(&mut self, step: f64, frame: &mut FrameBuffer) {
        let position = (step * 4.0) as usize % frame.len();
        frame.fill(0);
        frame.set(position, 255);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let port = std::env::args()
        .nth(1)
        .ok_or("usage: chaser <serial-port>")?;
    let config = WidgetConfig::new(port);

    let client = WidgetClient::builder()
        .handler(Chaser)
        .start_serial(&config)
        .await?;

    // Stream until the widget is unplugged
    client.wait_for_shutdown().await?;
    Ok(())
}
