//! Host scheduling surface
//!
//! The visibility- and timer-driven redraw host an animated engine reports
//! back to. Implementations must be callable from the engine's worker
//! thread; delivery to the display thread is the host's business.

use std::time::Instant;

/// Redraw and frame-callback scheduling collaborator
pub trait FrameHost: Send + Sync {
    /// Request a redraw of the current buffer contents
    fn invalidate(&self);
    /// Request `on_frame_tick` be invoked at the given absolute time
    ///
    /// The engine supplies only the monotonic target instant; the host
    /// computes the actual wait.
    fn schedule_callback(&self, at: Instant);
    /// Cancel a previously scheduled callback, if one is pending
    fn unschedule_callback(&self);
}

/// Capability of sources that can animate
pub trait Animatable {
    /// Begin animating from frame 0
    fn start(&mut self);
    /// Stop animating; the last rendered frame stays displayed
    fn stop(&mut self);
    /// True while a scheduled frame callback is outstanding
    fn is_running(&self) -> bool;
}
