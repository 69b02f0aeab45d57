//! Widget handler trait - the extension seam for concrete drivers.
//!
//! A concrete driver implements [`WidgetHandler`] and hands it to the
//! client builder; the session owns the implementation and invokes it
//! from its event loop. All methods default to no-ops so drivers only
//! override what they need.

use crate::frame::FrameBuffer;
use crate::protocol::params::WidgetParameters;
use crate::protocol::Packet;

/// Callbacks a concrete widget driver implements.
pub trait WidgetHandler: Send + 'static {
    /// Called once per connection, when the widget's parameters have
    /// been discovered. The frame may be resized here before the first
    /// render.
    fn on_ready(&mut self, params: &WidgetParameters, frame: &mut FrameBuffer) {
        let _ = (params, frame);
    }

    /// Called on every render tick with the accumulated step time in
    /// seconds. Mutate the frame to produce the next universe.
    fn on_tick(&mut self, step: f64, frame: &mut FrameBuffer) {
        let _ = (step, frame);
    }

    /// Called for every received packet the session does not consume
    /// itself. Unknown labels land here; ignoring them is fine.
    fn on_packet(&mut self, packet: &Packet) {
        let _ = packet;
    }
}

/// The unit handler: all hooks are no-ops. Useful for sessions that
/// only stream a frame mutated from outside the tick callback.
impl WidgetHandler for () {}
