//! Image source sum type
//!
//! One concrete source per selection outcome: a single decoded buffer, a
//! tiled source over a region decoder, or an animated engine. Only the
//! animated variant carries the `Animatable` capability.

use broadview_core::{Animatable, Bitmap, Rect};

use crate::engine::AnimatedFrameEngine;
use crate::region::RegionDecoderAdapter;

/// Fully decoded still image
pub struct StaticSource {
    bitmap: Bitmap,
}

impl StaticSource {
    pub fn new(bitmap: Bitmap) -> Self {
        Self { bitmap }
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn into_bitmap(self) -> Bitmap {
        self.bitmap
    }
}

/// Large image served tile-by-tile through a region decoder
pub struct TiledSource {
    decoder: RegionDecoderAdapter,
}

impl TiledSource {
    pub fn new(decoder: RegionDecoderAdapter) -> Self {
        Self { decoder }
    }

    pub fn width(&self) -> u32 {
        self.decoder.width()
    }

    pub fn height(&self) -> u32 {
        self.decoder.height()
    }

    /// Decode one viewport tile; `None` means skip or retry
    pub fn decode_tile(&mut self, rect: Rect, sample: u32) -> Option<Bitmap> {
        self.decoder.decode_region(rect, sample)
    }

    pub fn recycle(&mut self) {
        self.decoder.recycle();
    }
}

/// The rendering strategy chosen for one image stream
pub enum ImageSource {
    Static(StaticSource),
    Tiled(TiledSource),
    Animated(AnimatedFrameEngine),
}

impl ImageSource {
    pub fn width(&self) -> u32 {
        match self {
            Self::Static(source) => source.width(),
            Self::Tiled(source) => source.width(),
            Self::Animated(engine) => engine.size().map(|(w, _)| w).unwrap_or(0),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Self::Static(source) => source.height(),
            Self::Tiled(source) => source.height(),
            Self::Animated(engine) => engine.size().map(|(_, h)| h).unwrap_or(0),
        }
    }

    pub fn is_animated(&self) -> bool {
        matches!(self, Self::Animated(_))
    }

    /// Animation capability, present only on animated sources
    pub fn as_animatable(&mut self) -> Option<&mut dyn Animatable> {
        match self {
            Self::Animated(engine) => Some(engine),
            _ => None,
        }
    }

    /// Release the source's resources
    pub fn recycle(&mut self) {
        match self {
            Self::Static(_) => {}
            Self::Tiled(source) => source.recycle(),
            Self::Animated(engine) => engine.recycle(),
        }
    }
}
