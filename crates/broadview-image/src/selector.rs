//! Source selection policy
//!
//! Probes stream metadata, then builds exactly one source along a fixed
//! four-tier policy. A tier that matches and then fails never falls
//! through to a later tier, and no failure ever reaches the caller: probe
//! errors, I/O errors, refused decodes, and allocation failures all
//! collapse to `None`. The pipe is closed and released on every path.

use std::sync::Arc;

use broadview_core::{DecodeError, FrameHost, ImageCodec, PixelConfig, StreamPipe};

use crate::engine::AnimatedFrameEngine;
use crate::region::RegionDecoderAdapter;
use crate::source::{ImageSource, StaticSource, TiledSource};

/// Chooses the rendering strategy for an image stream
pub struct SourceSelector {
    config: PixelConfig,
    /// Largest dimension decodable into a single displayed buffer
    bitmap_limit: u32,
    /// Largest dimension for which a full animated decode is attempted
    max_bitmap_size: u32,
}

impl SourceSelector {
    pub fn new(bitmap_limit: u32, max_bitmap_size: u32) -> Self {
        Self { config: PixelConfig::Auto, bitmap_limit, max_bitmap_size }
    }

    /// Override the automatic pixel config
    pub fn with_config(mut self, config: PixelConfig) -> Self {
        self.config = config;
        self
    }

    /// Probe the stream and build one source, or nothing
    pub fn decode(
        &self,
        pipe: &mut dyn StreamPipe,
        codec: &dyn ImageCodec,
        host: &Arc<dyn FrameHost>,
    ) -> Option<ImageSource> {
        let result = self.decode_inner(pipe, codec, host);
        // Close and release no matter which branch ran or how it failed.
        pipe.close();
        pipe.release();
        match result {
            Ok(source) => source,
            Err(err) => {
                tracing::debug!(error = %err, "image source selection failed");
                None
            }
        }
    }

    fn decode_inner(
        &self,
        pipe: &mut dyn StreamPipe,
        codec: &dyn ImageCodec,
        host: &Arc<dyn FrameHost>,
    ) -> Result<Option<ImageSource>, DecodeError> {
        pipe.obtain()?;

        let info = {
            let mut reader = pipe.open()?;
            codec.probe(&mut reader)?
        };
        pipe.close();

        if info.frame_count != 1
            && info.width <= self.max_bitmap_size
            && info.height <= self.max_bitmap_size
        {
            // Full in-memory animated decode.
            let mut reader = pipe.open()?;
            if let Some(data) = codec.decode_container(&mut reader)? {
                data.set_browser_compat(true);
                if let Some(engine) = AnimatedFrameEngine::from_image_data(data, Arc::clone(host))
                {
                    return Ok(Some(ImageSource::Animated(engine)));
                }
            }
        } else if info.width <= self.bitmap_limit && info.height <= self.bitmap_limit {
            // Direct single-buffer decode.
            let mut reader = pipe.open()?;
            if let Some(bitmap) = codec.decode_static(&mut reader, self.config)? {
                return Ok(Some(ImageSource::Static(StaticSource::new(bitmap))));
            }
        } else if codec.has_legacy_region_decoder() {
            let reader = pipe.open()?;
            if let Some(decoder) = codec.new_region_decoder(reader, self.config)? {
                return Ok(Some(ImageSource::Tiled(TiledSource::new(
                    RegionDecoderAdapter::new(decoder),
                ))));
            }
        } else {
            // Platform tiler wants a concrete format, mapped by opacity
            // unless the config is a fixed override.
            let reader = pipe.open()?;
            let format = self.config.resolve(info.opaque);
            if let Some(decoder) = codec.new_platform_region_decoder(reader, format)? {
                return Ok(Some(ImageSource::Tiled(TiledSource::new(
                    RegionDecoderAdapter::new(decoder),
                ))));
            }
        }

        Ok(None)
    }
}
