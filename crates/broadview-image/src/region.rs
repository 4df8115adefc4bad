//! Region decoder adapter
//!
//! Adapts one native tiling-capable decoder to a uniform rectangle-decode
//! contract. `decode_region` reports failure as `None` so the viewport can
//! skip or retry the tile; `recycle` is idempotent and not internally
//! locked — callers serialize it against in-flight decodes.

use broadview_core::{Bitmap, Rect, RegionDecode};

/// Exclusive owner of one native region decoder
pub struct RegionDecoderAdapter {
    decoder: Option<Box<dyn RegionDecode>>,
    width: u32,
    height: u32,
}

impl RegionDecoderAdapter {
    pub fn new(decoder: Box<dyn RegionDecode>) -> Self {
        // Dimensions stay readable after recycle.
        let width = decoder.width();
        let height = decoder.height();
        Self { decoder: Some(decoder), width, height }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Decode one rectangle at a downsample factor
    ///
    /// `None` once recycled or when the native decode fails; treat as
    /// "skip this tile".
    pub fn decode_region(&mut self, rect: Rect, sample: u32) -> Option<Bitmap> {
        let decoder = self.decoder.as_mut()?;
        decoder.decode_region(rect, sample)
    }

    /// Release the native handle; only the first call has any effect
    pub fn recycle(&mut self) {
        if let Some(mut decoder) = self.decoder.take() {
            decoder.recycle();
        }
    }

    pub fn is_recycled(&self) -> bool {
        self.decoder.is_none()
    }
}
