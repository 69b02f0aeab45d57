//! Dedicated writer task for outbound packets.
//!
//! The session's event loop and the public client handle both send
//! packets; funneling them through one task keeps the transport's write
//! half single-owner without a mutex:
//!
//! ```text
//! Event loop ─┐
//! Client API ─┴─► mpsc::Sender<OutboundPacket> ─► Writer Task ─► Serial port
//! ```
//!
//! Packets are already fully encoded when they enter the channel; the
//! writer's only job is `write_all` + `flush`. The protocol's messages
//! are at most a few hundred bytes, so no batching or backpressure is
//! applied.

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Result, WidgetError};

/// Channel capacity for the outbound packet queue.
pub const CHANNEL_CAPACITY: usize = 64;

/// A fully encoded packet ready to be written to the transport.
#[derive(Debug, Clone)]
pub struct OutboundPacket(Bytes);

impl OutboundPacket {
    /// Create an outbound packet from encoded wire bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// The wire bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Size on the wire.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the packet is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Handle for sending packets to the writer task.
///
/// Cheaply cloneable; shared by the event loop and the client API.
#[derive(Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<OutboundPacket>,
}

impl WriterHandle {
    /// Send a packet to the writer task.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::ConnectionClosed`] if the writer task has
    /// shut down.
    pub async fn send(&self, packet: OutboundPacket) -> Result<()> {
        self.tx
            .send(packet)
            .await
            .map_err(|_| WidgetError::ConnectionClosed)
    }
}

/// Spawn the writer task and return a handle for sending packets.
///
/// The task ends cleanly when every handle has been dropped.
pub fn spawn_writer_task<W>(writer: W) -> (WriterHandle, JoinHandle<Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let task = tokio::spawn(writer_loop(rx, writer));
    (WriterHandle { tx }, task)
}

/// Main writer loop - receives packets and writes them to the
/// transport.
async fn writer_loop<W>(mut rx: mpsc::Receiver<OutboundPacket>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(packet) = rx.recv().await {
        writer.write_all(packet.as_bytes()).await?;
        writer.flush().await?;
    }
    // Channel closed, clean shutdown
    Ok(())
}
