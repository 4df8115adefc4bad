//! Pixel buffers and formats
//!
//! `Bitmap` is the single mutable pixel buffer a source or engine renders
//! into. Allocation is fallible: out-of-memory surfaces as
//! `DecodeError::Allocation` instead of aborting.

use crate::error::DecodeError;

/// Concrete in-memory pixel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8 bits per channel RGBA
    Rgba8888,
    /// 16-bit packed RGB, no alpha
    Rgb565,
}

impl PixelFormat {
    /// Bytes per pixel for this format
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8888 => 4,
            Self::Rgb565 => 2,
        }
    }
}

/// Requested decode configuration
///
/// `Auto` picks the format from the image's opacity; the other two are
/// fixed overrides that bypass the opacity rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PixelConfig {
    #[default]
    Auto,
    Rgba8888,
    Rgb565,
}

impl PixelConfig {
    /// Resolve to a concrete format given the image's opacity
    pub fn resolve(self, opaque: bool) -> PixelFormat {
        match self {
            Self::Auto => {
                if opaque {
                    PixelFormat::Rgb565
                } else {
                    PixelFormat::Rgba8888
                }
            }
            Self::Rgba8888 => PixelFormat::Rgba8888,
            Self::Rgb565 => PixelFormat::Rgb565,
        }
    }
}

/// Rectangular image region in pixel coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Mutable pixel buffer, exclusively owned by the source or engine that
/// created it and freed exactly once
#[derive(Debug)]
pub struct Bitmap {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Bitmap {
    /// Allocate a zeroed buffer
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self, DecodeError> {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| DecodeError::Allocation)?;
        data.resize(len, 0);
        Ok(Self { width, height, format, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw pixel bytes in the buffer's format
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Write one pixel, converting RGBA to the buffer's format
    pub fn put_rgba(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let bpp = self.format.bytes_per_pixel();
        let idx = (y as usize * self.width as usize + x as usize) * bpp;
        match self.format {
            PixelFormat::Rgba8888 => {
                self.data[idx..idx + 4].copy_from_slice(&rgba);
            }
            PixelFormat::Rgb565 => {
                let packed = pack_rgb565(rgba[0], rgba[1], rgba[2]);
                self.data[idx..idx + 2].copy_from_slice(&packed.to_le_bytes());
            }
        }
    }

    /// Read one pixel, expanding to RGBA
    pub fn get_rgba(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let idx = (y as usize * self.width as usize + x as usize) * bpp;
        match self.format {
            PixelFormat::Rgba8888 => {
                let px = &self.data[idx..idx + 4];
                Some([px[0], px[1], px[2], px[3]])
            }
            PixelFormat::Rgb565 => {
                let packed = u16::from_le_bytes([self.data[idx], self.data[idx + 1]]);
                Some(unpack_rgb565(packed))
            }
        }
    }

    /// Zero a rectangular region, clamped to the buffer bounds
    pub fn clear_region(&mut self, rect: Rect) {
        let x1 = rect.x.min(self.width);
        let y1 = rect.y.min(self.height);
        let x2 = rect.x.saturating_add(rect.width).min(self.width);
        let y2 = rect.y.saturating_add(rect.height).min(self.height);
        let bpp = self.format.bytes_per_pixel();
        for y in y1..y2 {
            let start = (y as usize * self.width as usize + x1 as usize) * bpp;
            let end = (y as usize * self.width as usize + x2 as usize) * bpp;
            self.data[start..end].fill(0);
        }
    }
}

/// Pack 8-bit RGB channels into 5-6-5
pub fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

/// Expand packed 5-6-5 back to RGBA, replicating high bits
pub fn unpack_rgb565(packed: u16) -> [u8; 4] {
    let r5 = ((packed >> 11) & 0x1f) as u8;
    let g6 = ((packed >> 5) & 0x3f) as u8;
    let b5 = (packed & 0x1f) as u8;
    [
        (r5 << 3) | (r5 >> 2),
        (g6 << 2) | (g6 >> 4),
        (b5 << 3) | (b5 >> 2),
        255,
    ]
}
