//! Periodic render loop state.
//!
//! The loop's arithmetic is pure and synchronous: the session's event
//! loop drives [`RenderLoop::tick`] from its timer, and tests drive it
//! directly with explicit elapsed-interval counts. A tick covering
//! `count` intervals advances the accumulated step time by
//! `count × interval` — a late timer therefore jumps the step counter
//! by the full missed span instead of drifting.

use std::time::Duration;

use crate::error::Result;
use crate::frame::FrameBuffer;
use crate::handler::WidgetHandler;
use crate::protocol::{build_packet, LABEL_OUTPUT_DMX};

/// Default tick interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(10);

/// Default DMX start code.
pub const DEFAULT_START_CODE: u8 = 0;

/// Accumulated render-loop state for one session.
#[derive(Debug)]
pub struct RenderLoop {
    interval: Duration,
    start_code: u8,
    step: f64,
    frame: FrameBuffer,
}

impl RenderLoop {
    /// Create a new loop around a session's frame.
    pub fn new(interval: Duration, start_code: u8, frame: FrameBuffer) -> Self {
        Self {
            interval,
            start_code,
            step: 0.0,
            frame,
        }
    }

    /// Nominal tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Accumulated step time in seconds.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// The session's frame.
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Mutable access to the session's frame.
    pub fn frame_mut(&mut self) -> &mut FrameBuffer {
        &mut self.frame
    }

    /// Advance the loop by `count` elapsed intervals and produce the
    /// wire bytes of the resulting DMX output packet.
    ///
    /// `count` is normally 1; larger values mean the timer fired late
    /// and this tick covers several nominal intervals.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::PayloadTooLarge`](crate::WidgetError::PayloadTooLarge)
    /// if the universe exceeds 65534 channels.
    pub fn tick<H: WidgetHandler>(&mut self, count: u32, handler: &mut H) -> Result<Vec<u8>> {
        self.step += f64::from(count) * self.interval.as_secs_f64();
        handler.on_tick(self.step, &mut self.frame);
        render_packet(self.start_code, &self.frame)
    }
}

/// Encode a DMX output packet (label 6): the start code followed by the
/// universe's channel levels.
pub fn render_packet(start_code: u8, frame: &FrameBuffer) -> Result<Vec<u8>> {
    let mut payload = Vec::with_capacity(1 + frame.len());
    payload.push(start_code);
    payload.extend_from_slice(frame.values());
    build_packet(LABEL_OUTPUT_DMX, &payload)
}
