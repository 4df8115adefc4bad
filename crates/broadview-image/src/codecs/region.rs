//! Software region decoder
//!
//! Serves rectangle decodes out of one fully materialized RGBA canvas. A
//! real platform backend would decode tiles lazily; this one trades memory
//! for a dependency-free tiling path.

use broadview_core::{Bitmap, PixelFormat, Rect, RegionDecode};

pub(crate) struct SoftwareRegionDecoder {
    width: u32,
    height: u32,
    format: PixelFormat,
    /// Full-canvas RGBA pixels, dropped on recycle
    pixels: Option<Vec<u8>>,
}

impl SoftwareRegionDecoder {
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Self {
        Self { width, height, format, pixels: Some(pixels) }
    }
}

impl RegionDecode for SoftwareRegionDecoder {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn decode_region(&mut self, rect: Rect, sample: u32) -> Option<Bitmap> {
        let pixels = self.pixels.as_ref()?;
        if rect.x >= self.width || rect.y >= self.height {
            return None;
        }
        let sample = sample.max(1);
        let src_w = rect.width.min(self.width - rect.x);
        let src_h = rect.height.min(self.height - rect.y);
        let out_w = src_w / sample;
        let out_h = src_h / sample;
        if out_w == 0 || out_h == 0 {
            return None;
        }

        let mut tile = Bitmap::new(out_w, out_h, self.format).ok()?;
        for dy in 0..out_h {
            let sy = rect.y + dy * sample;
            for dx in 0..out_w {
                let sx = rect.x + dx * sample;
                let idx = (sy as usize * self.width as usize + sx as usize) * 4;
                let px = &pixels[idx..idx + 4];
                tile.put_rgba(dx, dy, [px[0], px[1], px[2], px[3]]);
            }
        }
        Some(tile)
    }

    fn recycle(&mut self) {
        self.pixels = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_decoder(width: u32, height: u32) -> SoftwareRegionDecoder {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        SoftwareRegionDecoder::new(width, height, PixelFormat::Rgba8888, pixels)
    }

    #[test]
    fn test_tile_copies_source_region() {
        let mut decoder = gradient_decoder(64, 64);
        let tile = decoder.decode_region(Rect::new(16, 8, 4, 4), 1).unwrap();
        assert_eq!(tile.width(), 4);
        assert_eq!(tile.get_rgba(0, 0), Some([16, 8, 0, 255]));
        assert_eq!(tile.get_rgba(3, 3), Some([19, 11, 0, 255]));
    }

    #[test]
    fn test_downsample_picks_every_nth_pixel() {
        let mut decoder = gradient_decoder(64, 64);
        let tile = decoder.decode_region(Rect::new(0, 0, 8, 8), 4).unwrap();
        assert_eq!(tile.width(), 2);
        assert_eq!(tile.height(), 2);
        assert_eq!(tile.get_rgba(1, 1), Some([4, 4, 0, 255]));
    }

    #[test]
    fn test_rect_clamped_to_canvas() {
        let mut decoder = gradient_decoder(16, 16);
        let tile = decoder.decode_region(Rect::new(12, 12, 32, 32), 1).unwrap();
        assert_eq!(tile.width(), 4);
        assert_eq!(tile.height(), 4);
        assert!(decoder.decode_region(Rect::new(20, 0, 4, 4), 1).is_none());
    }

    #[test]
    fn test_recycle_drops_canvas() {
        let mut decoder = gradient_decoder(16, 16);
        decoder.recycle();
        assert!(decoder.decode_region(Rect::new(0, 0, 4, 4), 1).is_none());
        // Dimensions stay readable.
        assert_eq!(decoder.width(), 16);
    }
}
