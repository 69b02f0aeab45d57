//! Blackout - zero every channel once, then exit.
//!
//! This demo shows:
//! - Running the handshake without the periodic render loop
//! - Reading the discovered widget parameters
//! - Sending a single frame manually
//!
//! ```sh
//! cargo run --example blackout -- /dev/ttyUSB0
//! ```

use dmxpro_client::{FrameBuffer, WidgetClient, WidgetConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let port = std::env::args()
        .nth(1)
        .ok_or("usage: blackout <serial-port>")?;
    let config = WidgetConfig::new(port);

    let client = WidgetClient::builder()
        .manual_render()
        .start_serial(&config)
        .await?;

    let params = client.ready().await?;
    tracing::info!(
        firmware = params.firmware_version,
        break_time = params.break_time,
        "widget ready, sending blackout"
    );

    client.render(&FrameBuffer::new(512)).await?;
    Ok(())
}
