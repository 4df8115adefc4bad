//! Probe metadata
//!
//! Produced once by a lightweight header probe; immutable thereafter.

/// Basic image metadata extracted without decoding any pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Number of frames; 1 for still images
    pub frame_count: u32,
    /// Whether every pixel is fully opaque
    pub opaque: bool,
}

impl ImageInfo {
    /// True when the image declares more than one frame
    pub fn is_animated(&self) -> bool {
        self.frame_count > 1
    }
}
