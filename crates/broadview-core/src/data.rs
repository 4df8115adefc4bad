//! Shared container data and the software frame renderer
//!
//! `ImageData` is the reference-counted handle to a fully decoded animated
//! container: release fires when the last holder drops it, never inferred
//! from anywhere else. `ImageDataRenderer` is a `FrameRenderer` over that
//! data, rendering frames one at a time into a caller-owned buffer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::pixel::{Bitmap, Rect};
use crate::renderer::FrameRenderer;

/// Delays under this are treated as degenerate when browser-compat is on.
const BROWSER_COMPAT_MIN_DELAY: Duration = Duration::from_millis(10);
/// Conventional substitute delay, matching browser handling of bad timing.
const BROWSER_COMPAT_DELAY: Duration = Duration::from_millis(100);

/// One decoded animation frame
#[derive(Debug, Clone)]
pub struct FrameData {
    /// Full-canvas RGBA pixels, row-major
    pub pixels: Vec<u8>,
    /// Declared display duration of this frame
    pub delay: Duration,
}

struct ImageDataInner {
    width: u32,
    height: u32,
    opaque: bool,
    frames: Vec<FrameData>,
    browser_compat: AtomicBool,
}

/// Shared-ownership handle to decoded container data
///
/// Clones share one allocation; the frames are freed when the last clone
/// drops.
#[derive(Clone)]
pub struct ImageData {
    inner: Arc<ImageDataInner>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, opaque: bool, frames: Vec<FrameData>) -> Self {
        Self {
            inner: Arc::new(ImageDataInner {
                width,
                height,
                opaque,
                frames,
                browser_compat: AtomicBool::new(false),
            }),
        }
    }

    pub fn width(&self) -> u32 {
        self.inner.width
    }

    pub fn height(&self) -> u32 {
        self.inner.height
    }

    pub fn opaque(&self) -> bool {
        self.inner.opaque
    }

    pub fn frame_count(&self) -> u32 {
        self.inner.frames.len() as u32
    }

    /// Substitute a conventional delay for degenerate per-frame timing
    pub fn set_browser_compat(&self, enabled: bool) {
        self.inner.browser_compat.store(enabled, Ordering::Relaxed);
    }

    pub fn browser_compat(&self) -> bool {
        self.inner.browser_compat.load(Ordering::Relaxed)
    }

    /// Whether any holder besides this one still references the data
    pub fn is_referenced(&self) -> bool {
        Arc::strong_count(&self.inner) > 1
    }

    pub fn frame(&self, index: u32) -> Option<&FrameData> {
        self.inner.frames.get(index as usize)
    }

    /// Display duration for a frame, with the browser-compat policy applied
    pub fn delay(&self, index: u32) -> Duration {
        let raw = self
            .frame(index)
            .map(|frame| frame.delay)
            .unwrap_or(Duration::ZERO);
        if self.browser_compat() && raw < BROWSER_COMPAT_MIN_DELAY {
            BROWSER_COMPAT_DELAY
        } else {
            raw
        }
    }

    /// Renderer positioned at frame 0
    pub fn create_renderer(&self) -> ImageDataRenderer {
        ImageDataRenderer {
            data: self.clone(),
            frame: 0,
            recycled: false,
        }
    }
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("opaque", &self.opaque())
            .field("frame_count", &self.frame_count())
            .finish()
    }
}

/// Software `FrameRenderer` over an `ImageData`
pub struct ImageDataRenderer {
    data: ImageData,
    frame: u32,
    recycled: bool,
}

impl ImageDataRenderer {
    /// Index of the frame the next render will paint
    pub fn current_frame(&self) -> u32 {
        self.frame
    }
}

impl FrameRenderer for ImageDataRenderer {
    fn reset(&mut self) {
        self.frame = 0;
    }

    fn advance(&mut self) {
        let count = self.data.frame_count().max(1);
        self.frame = (self.frame + 1) % count;
    }

    fn current_delay(&self) -> Duration {
        self.data.delay(self.frame)
    }

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
    ) {
        if self.recycled {
            return;
        }
        let Some(frame) = self.data.frame(self.frame) else {
            return;
        };
        let ratio = ratio.max(1);
        let out_w = width / ratio;
        let out_h = height / ratio;
        if fill_blank {
            buffer.clear_region(Rect::new(dst_x, dst_y, out_w, out_h));
        }
        let data_w = self.data.width();
        let data_h = self.data.height();
        for dy in 0..out_h {
            let sy = src_y + dy * ratio;
            if sy >= data_h {
                break;
            }
            for dx in 0..out_w {
                let sx = src_x + dx * ratio;
                if sx >= data_w {
                    break;
                }
                let idx = (sy as usize * data_w as usize + sx as usize) * 4;
                if idx + 4 > frame.pixels.len() {
                    return;
                }
                let px = &frame.pixels[idx..idx + 4];
                buffer.put_rgba(dst_x + dx, dst_y + dy, [px[0], px[1], px[2], px[3]]);
            }
        }
    }

    fn image_data(&self) -> ImageData {
        self.data.clone()
    }

    fn recycle(&mut self) {
        self.recycled = true;
    }
}
