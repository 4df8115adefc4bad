//! Native codec capabilities
//!
//! Contracts for the per-format decode primitives a host supplies: the
//! metadata probe, whole-image decodes, and region (tiled) decoders. Only
//! the contracts live here; `broadview-image` ships a pure-software
//! implementation.

use std::io::Read;

use crate::data::ImageData;
use crate::error::DecodeError;
use crate::info::ImageInfo;
use crate::pixel::{Bitmap, PixelConfig, PixelFormat, Rect};

/// A tiling-capable native region decoder
///
/// Exclusively owned by one adapter. `recycle()` is idempotent: the first
/// call releases the native handle, later calls are no-ops.
pub trait RegionDecode: Send {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Decode one rectangle at the given downsample factor
    ///
    /// Returns `None` when the native decode fails; this is a skip signal,
    /// not an error.
    fn decode_region(&mut self, rect: Rect, sample: u32) -> Option<Bitmap>;
    fn recycle(&mut self);
}

/// Decode primitives for one image stack
pub trait ImageCodec {
    /// Probe stream metadata without decoding pixels
    fn probe(&self, reader: &mut dyn Read) -> Result<ImageInfo, DecodeError>;

    /// Decode a still image into a single buffer
    ///
    /// `Ok(None)` means the native decoder gave up; errors are reserved
    /// for I/O and allocation failures.
    fn decode_static(
        &self,
        reader: &mut dyn Read,
        config: PixelConfig,
    ) -> Result<Option<Bitmap>, DecodeError>;

    /// Decode a full animated container into shared frame data
    fn decode_container(&self, reader: &mut dyn Read) -> Result<Option<ImageData>, DecodeError>;

    /// Whether the legacy region-decoder tier is available on this stack
    fn has_legacy_region_decoder(&self) -> bool {
        false
    }

    /// Build a legacy region decoder honoring the requested config
    fn new_region_decoder(
        &self,
        reader: Box<dyn Read + Send>,
        config: PixelConfig,
    ) -> Result<Option<Box<dyn RegionDecode>>, DecodeError> {
        let _ = (reader, config);
        Ok(None)
    }

    /// Build a platform region decoder for a fixed pixel format
    fn new_platform_region_decoder(
        &self,
        reader: Box<dyn Read + Send>,
        format: PixelFormat,
    ) -> Result<Option<Box<dyn RegionDecode>>, DecodeError>;
}
