//! # dmxpro-client
//!
//! Async client driver for Enttec DMX USB Pro class lighting widgets.
//!
//! The widget speaks a small framed binary protocol over its USB-serial
//! interface: sentinel-delimited packets with an embedded length, a
//! one-shot parameter handshake, and a streamed DMX output universe.
//!
//! ## Architecture
//!
//! - **Protocol** (`protocol`): pure packet framing/deframing plus the
//!   reassembly buffer that turns arbitrary serial chunks into whole
//!   packets.
//! - **Session** (`WidgetClient`): sends the parameter request on
//!   connect, dispatches replies, and exposes `configure`/`render`.
//! - **Render loop** (`render`): once parameters arrive, invokes the
//!   driver's tick hook at a fixed cadence and streams the resulting
//!   frame, tolerating timer jitter by advancing the step counter by
//!   the true elapsed-interval count.
//!
//! A concrete driver implements [`WidgetHandler`] and mutates the
//! session's [`FrameBuffer`] from its hooks.
//!
//! ## Example
//!
//! ```ignore
//! use dmxpro_client::{FrameBuffer, WidgetClient, WidgetConfig, WidgetHandler};
//!
//! struct Pulse;
//!
//! impl WidgetHandler for Pulse {
//!     fn on_tick(&mut self, step: f64, frame: &mut FrameBuffer) {
//!         let level = ((step.sin() + 1.0) * 127.0) as u8;
//!         frame.fill(level);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WidgetConfig::new("/dev/ttyUSB0");
//!     let client = WidgetClient::builder()
//!         .handler(Pulse)
//!         .start_serial(&config)
//!         .await?;
//!     client.wait_for_shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod handler;
pub mod protocol;
pub mod render;
pub mod transport;

mod client;
mod writer;

pub use client::{SessionState, WidgetClient, WidgetClientBuilder};
pub use config::WidgetConfig;
pub use error::WidgetError;
pub use frame::FrameBuffer;
pub use handler::WidgetHandler;
pub use protocol::params::WidgetParameters;
pub use protocol::Packet;
