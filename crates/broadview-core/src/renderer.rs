//! Frame renderer capability
//!
//! The engine-facing surface of a decoded animation: a cursor over frames
//! that can rewind, advance, and paint the current frame into a buffer.

use std::time::Duration;

use crate::data::ImageData;
use crate::pixel::Bitmap;

/// Renders successive animation frames into a pixel buffer
///
/// Exclusively owned by one engine while active; never touched by more
/// than one thread at a time.
pub trait FrameRenderer: Send {
    /// Rewind to frame 0
    fn reset(&mut self);
    /// Move exactly one frame forward; wrap policy is the renderer's
    fn advance(&mut self);
    /// How long the current frame should stay on screen
    fn current_delay(&self) -> Duration;
    /// Paint `size` source pixels starting at `src` into the buffer at
    /// `dst`, downsampled by `ratio`
    #[allow(clippy::too_many_arguments)]
    fn render_into(
        &mut self,
        buffer: &mut Bitmap,
        dst_x: u32,
        dst_y: u32,
        src_x: u32,
        src_y: u32,
        width: u32,
        height: u32,
        ratio: u32,
        fill_blank: bool,
    );
    /// Shared handle to the decoded container data
    fn image_data(&self) -> ImageData;
    /// Release renderer resources; idempotent
    fn recycle(&mut self);
}
