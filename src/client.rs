//! Widget client - session lifecycle and event loop.
//!
//! The [`WidgetClientBuilder`] provides a fluent API for configuring a
//! driver and building the client. The [`WidgetClient`] manages the
//! lifecycle:
//! 1. Split the transport into read and write halves
//! 2. Spawn the writer task
//! 3. Send the parameter request (handshake)
//! 4. Run the event loop: decode packets, dispatch, render ticks
//!
//! One session is one logical timeline: transport reads and timer
//! ticks are interleaved by a single task, so the handler, the frame
//! and the parameter store need no locking.
//!
//! # Example
//!
//! ```ignore
//! use dmxpro_client::{WidgetClient, WidgetConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WidgetConfig::new("/dev/ttyUSB0");
//!     let mut client = WidgetClient::builder()
//!         .handler(MyDriver::default())
//!         .start_serial(&config)
//!         .await?;
//!
//!     let params = client.ready().await?;
//!     println!("firmware {}", params.firmware_version);
//!
//!     client.wait_for_shutdown().await
//! }
//! ```

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::config::WidgetConfig;
use crate::error::{Result, WidgetError};
use crate::frame::{FrameBuffer, DEFAULT_UNIVERSE_SIZE};
use crate::handler::WidgetHandler;
use crate::protocol::params::WidgetParameters;
use crate::protocol::{
    build_packet, Packet, PacketBuffer, LABEL_GET_PARAMETERS, LABEL_SET_PARAMETERS,
};
use crate::render::{render_packet, RenderLoop, DEFAULT_INTERVAL, DEFAULT_START_CODE};
use crate::transport::open_serial_port;
use crate::writer::{spawn_writer_task, OutboundPacket, WriterHandle};

/// Session handshake state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport not yet established.
    Connecting,
    /// Parameter request sent, waiting for the reply.
    AwaitingParameters,
    /// Parameters discovered; streaming may begin.
    Ready,
}

/// Builder for configuring and starting a widget client.
pub struct WidgetClientBuilder<H> {
    handler: H,
    universe_size: usize,
    start_code: u8,
    interval: Duration,
    render_loop: bool,
}

impl WidgetClientBuilder<()> {
    /// Create a builder with protocol defaults and the no-op handler.
    pub fn new() -> Self {
        Self {
            handler: (),
            universe_size: DEFAULT_UNIVERSE_SIZE,
            start_code: DEFAULT_START_CODE,
            interval: DEFAULT_INTERVAL,
            render_loop: true,
        }
    }
}

impl Default for WidgetClientBuilder<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: WidgetHandler> WidgetClientBuilder<H> {
    /// Set the driver implementation invoked from the event loop.
    pub fn handler<H2: WidgetHandler>(self, handler: H2) -> WidgetClientBuilder<H2> {
        WidgetClientBuilder {
            handler,
            universe_size: self.universe_size,
            start_code: self.start_code,
            interval: self.interval,
            render_loop: self.render_loop,
        }
    }

    /// Set the universe size allocated at connection time.
    ///
    /// Default: 24 channels.
    pub fn universe_size(mut self, channels: usize) -> Self {
        self.universe_size = channels;
        self
    }

    /// Set the DMX start code prepended to every output frame.
    ///
    /// Default: 0.
    pub fn start_code(mut self, code: u8) -> Self {
        self.start_code = code;
        self
    }

    /// Set the render tick interval.
    ///
    /// Default: 10 ms.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Disable the periodic render loop. Packets are still dispatched
    /// and [`WidgetClient::render`] can be called manually.
    pub fn manual_render(mut self) -> Self {
        self.render_loop = false;
        self
    }

    /// Apply universe size, start code and interval from a config.
    pub fn config(mut self, config: &WidgetConfig) -> Self {
        self.universe_size = config.universe_size;
        self.start_code = config.start_code;
        self.interval = config.interval();
        self
    }

    /// Start the session over an arbitrary byte transport.
    pub async fn start<T>(self, transport: T) -> Result<WidgetClient>
    where
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        WidgetClient::start(self, transport).await
    }

    /// Open the configured serial port and start the session over it,
    /// applying the config's universe size, start code and interval.
    pub async fn start_serial(self, config: &WidgetConfig) -> Result<WidgetClient> {
        let stream = open_serial_port(config)?;
        self.config(config).start(stream).await
    }
}

/// A running widget session.
///
/// Use [`ready`](Self::ready) to await the handshake,
/// [`configure`](Self::configure) and [`render`](Self::render) for
/// one-off requests, and [`wait_for_shutdown`](Self::wait_for_shutdown)
/// to block until the connection ends.
pub struct WidgetClient {
    writer: WriterHandle,
    params_rx: watch::Receiver<Option<WidgetParameters>>,
    shutdown_rx: oneshot::Receiver<()>,
    start_code: u8,
    _event_task: JoinHandle<()>,
    _writer_task: JoinHandle<Result<()>>,
}

impl WidgetClient {
    /// Create a new client builder.
    pub fn builder() -> WidgetClientBuilder<()> {
        WidgetClientBuilder::new()
    }

    /// Start the session: spawn the writer, send the handshake, spawn
    /// the event loop.
    async fn start<H, T>(builder: WidgetClientBuilder<H>, transport: T) -> Result<Self>
    where
        H: WidgetHandler,
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        // 1. Split the transport
        let (reader, write_half) = tokio::io::split(transport);

        // 2. Spawn the writer task
        let (writer, writer_task) = spawn_writer_task(write_half);

        // 3. Send the parameter request: two zero bytes, per the
        //    widget handshake. Connecting -> AwaitingParameters.
        let request = build_packet(LABEL_GET_PARAMETERS, &[0, 0])?;
        writer.send(OutboundPacket::new(request)).await?;

        // 4. Spawn the event loop
        let (params_tx, params_rx) = watch::channel(None);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let event_loop = EventLoop {
            reader,
            writer: writer.clone(),
            buffer: PacketBuffer::new(),
            state: SessionState::AwaitingParameters,
            handler: builder.handler,
            render: RenderLoop::new(
                builder.interval,
                builder.start_code,
                FrameBuffer::new(builder.universe_size),
            ),
            render_loop_enabled: builder.render_loop,
            ticker: None,
            last_deadline: None,
            params_tx,
        };

        let event_task = tokio::spawn(async move {
            if let Err(e) = event_loop.run().await {
                tracing::error!("session event loop error: {e}");
            }
            let _ = shutdown_tx.send(());
        });

        Ok(Self {
            writer,
            params_rx,
            shutdown_rx,
            start_code: builder.start_code,
            _event_task: event_task,
            _writer_task: writer_task,
        })
    }

    /// Discovered widget parameters, if the handshake has completed.
    pub fn parameters(&self) -> Option<WidgetParameters> {
        *self.params_rx.borrow()
    }

    /// Wait until the handshake completes and return the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::ConnectionClosed`] if the session ends
    /// before the widget replies.
    pub async fn ready(&self) -> Result<WidgetParameters> {
        let mut rx = self.params_rx.clone();
        loop {
            if let Some(params) = *rx.borrow_and_update() {
                return Ok(params);
            }
            rx.changed()
                .await
                .map_err(|_| WidgetError::ConnectionClosed)?;
        }
    }

    /// Send a Set Widget Parameters request (label 4).
    ///
    /// The widget sends no acknowledgement; the caller is responsible
    /// for supplying values the hardware accepts.
    pub async fn configure(&self, params: &WidgetParameters) -> Result<()> {
        let bytes = build_packet(LABEL_SET_PARAMETERS, &params.encode())?;
        self.writer.send(OutboundPacket::new(bytes)).await
    }

    /// Send a single DMX output packet (label 6) outside the render
    /// loop.
    pub async fn render(&self, frame: &FrameBuffer) -> Result<()> {
        let bytes = render_packet(self.start_code, frame)?;
        self.writer.send(OutboundPacket::new(bytes)).await
    }

    /// Block until the session ends (transport closed or framing
    /// error). Consumes the client.
    pub async fn wait_for_shutdown(self) -> Result<()> {
        let _ = self.shutdown_rx.await;
        Ok(())
    }
}

/// The session's event loop: one task interleaving transport reads and
/// render ticks.
struct EventLoop<H, R> {
    reader: R,
    writer: WriterHandle,
    buffer: PacketBuffer,
    state: SessionState,
    handler: H,
    render: RenderLoop,
    render_loop_enabled: bool,
    ticker: Option<Interval>,
    last_deadline: Option<Instant>,
    params_tx: watch::Sender<Option<WidgetParameters>>,
}

impl<H, R> EventLoop<H, R>
where
    H: WidgetHandler,
    R: AsyncRead + Unpin,
{
    async fn run(mut self) -> Result<()> {
        let mut buf = vec![0u8; 4096];

        loop {
            tokio::select! {
                read = self.reader.read(&mut buf) => {
                    let n = match read {
                        Ok(0) => return Ok(()), // Transport closed
                        Ok(n) => n,
                        Err(e) => return Err(WidgetError::Io(e)),
                    };
                    for packet in self.buffer.push(&buf[..n])? {
                        self.handle_packet(packet)?;
                    }
                }
                deadline = next_tick(&mut self.ticker) => {
                    self.handle_tick(deadline).await?;
                }
            }
        }
    }

    /// Dispatch a single decoded packet.
    fn handle_packet(&mut self, packet: Packet) -> Result<()> {
        match (self.state, packet.label) {
            (SessionState::AwaitingParameters, LABEL_GET_PARAMETERS) => {
                let params = WidgetParameters::decode(packet.payload())?;
                tracing::debug!(?params, "widget parameters discovered");

                self.handler.on_ready(&params, self.render.frame_mut());
                self.params_tx.send_replace(Some(params));
                self.state = SessionState::Ready;

                if self.render_loop_enabled {
                    self.arm_ticker();
                }
            }
            // Unknown labels, and a parameter reply outside the
            // handshake, go to the handler.
            _ => self.handler.on_packet(&packet),
        }
        Ok(())
    }

    /// Arm the render timer. Runs exactly once per session, on the
    /// AwaitingParameters -> Ready transition.
    fn arm_ticker(&mut self) {
        // The first tick fires immediately, so the first frame follows
        // the handshake without waiting a full interval.
        let mut ticker = tokio::time::interval(self.render.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.ticker = Some(ticker);
    }

    async fn handle_tick(&mut self, deadline: Instant) -> Result<()> {
        let count = self.elapsed_intervals(deadline);
        self.last_deadline = Some(deadline);

        let bytes = self.render.tick(count, &mut self.handler)?;
        self.writer.send(OutboundPacket::new(bytes)).await
    }

    /// Interval multiples covered by this tick. With `Skip` behavior a
    /// delayed timer resumes on the period grid, so the gap between
    /// consecutive deadlines is a whole number of intervals.
    fn elapsed_intervals(&self, deadline: Instant) -> u32 {
        match self.last_deadline {
            None => 1,
            Some(prev) => {
                let period = self.render.interval().as_secs_f64();
                let gap = deadline.duration_since(prev).as_secs_f64();
                (gap / period).round().max(1.0) as u32
            }
        }
    }
}

/// Resolve the next timer deadline, or never if the loop is not armed.
async fn next_tick(ticker: &mut Option<Interval>) -> Instant {
    match ticker {
        Some(t) => t.tick().await,
        None => std::future::pending().await,
    }
}
