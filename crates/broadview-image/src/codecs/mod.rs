//! Pure-software codec backend
//!
//! Implements the codec contract on top of the `image` crate: a header
//! probe that never touches pixel data, whole-image still decodes, full
//! animated-GIF container decodes, and a materializing region decoder for
//! the platform tiling tier. Decoder refusals surface as `Ok(None)`;
//! errors are reserved for I/O and allocation.

mod probe;
mod region;

use std::io::{Cursor, Read};
use std::time::Duration;

use image::{AnimationDecoder, ImageDecoder, ImageFormat};

use broadview_core::{
    Bitmap, DecodeError, FrameData, ImageCodec, ImageData, ImageInfo, PixelConfig, PixelFormat,
    RegionDecode,
};

use region::SoftwareRegionDecoder;

/// Software implementation of the codec contract
#[derive(Default)]
pub struct SoftwareCodec;

impl SoftwareCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for SoftwareCodec {
    fn probe(&self, reader: &mut dyn Read) -> Result<ImageInfo, DecodeError> {
        let bytes = read_all(reader)?;
        probe::probe_bytes(&bytes)
    }

    fn decode_static(
        &self,
        reader: &mut dyn Read,
        config: PixelConfig,
    ) -> Result<Option<Bitmap>, DecodeError> {
        let bytes = read_all(reader)?;
        let decoded = match image::load_from_memory(&bytes) {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::debug!(error = %err, "still decode refused");
                return Ok(None);
            }
        };
        let opaque = !decoded.color().has_alpha();
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut bitmap = Bitmap::new(width, height, config.resolve(opaque))?;
        for (x, y, pixel) in rgba.enumerate_pixels() {
            bitmap.put_rgba(x, y, pixel.0);
        }
        Ok(Some(bitmap))
    }

    fn decode_container(&self, reader: &mut dyn Read) -> Result<Option<ImageData>, DecodeError> {
        let bytes = read_all(reader)?;
        if !matches!(image::guess_format(&bytes), Ok(ImageFormat::Gif)) {
            return Ok(None);
        }
        let decoder = match image::codecs::gif::GifDecoder::new(Cursor::new(&bytes)) {
            Ok(decoder) => decoder,
            Err(err) => {
                tracing::debug!(error = %err, "container decode refused");
                return Ok(None);
            }
        };
        let (width, height) = decoder.dimensions();
        let raw_frames = match decoder.into_frames().collect_frames() {
            Ok(frames) => frames,
            Err(err) => {
                tracing::debug!(error = %err, "container frame decode refused");
                return Ok(None);
            }
        };
        if raw_frames.is_empty() {
            return Ok(None);
        }

        let canvas_len = width as usize * height as usize * 4;
        let mut canvas = vec![0u8; canvas_len];
        let mut opaque = true;
        let mut frames = Vec::with_capacity(raw_frames.len());
        for frame in raw_frames {
            let (numer, denom) = frame.delay().numer_denom_ms();
            let delay = Duration::from_millis(u64::from(numer / denom.max(1)));
            let (left, top) = (frame.left(), frame.top());
            blit(&mut canvas, width, height, frame.buffer(), left, top);
            if opaque && canvas.chunks_exact(4).any(|px| px[3] != 255) {
                opaque = false;
            }
            frames.push(FrameData { pixels: canvas.clone(), delay });
        }
        Ok(Some(ImageData::new(width, height, opaque, frames)))
    }

    fn new_platform_region_decoder(
        &self,
        mut reader: Box<dyn Read + Send>,
        format: PixelFormat,
    ) -> Result<Option<Box<dyn RegionDecode>>, DecodeError> {
        let bytes = read_all(&mut reader)?;
        let decoded = match image::load_from_memory(&bytes) {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::debug!(error = %err, "region decode refused");
                return Ok(None);
            }
        };
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Some(Box::new(SoftwareRegionDecoder::new(
            width,
            height,
            format,
            rgba.into_raw(),
        ))))
    }
}

fn read_all(reader: &mut dyn Read) -> Result<Vec<u8>, DecodeError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Composite one frame buffer onto the canvas at its declared offset
fn blit(
    canvas: &mut [u8],
    canvas_w: u32,
    canvas_h: u32,
    buffer: &image::RgbaImage,
    left: u32,
    top: u32,
) {
    for (x, y, pixel) in buffer.enumerate_pixels() {
        let (cx, cy) = (left + x, top + y);
        if cx >= canvas_w || cy >= canvas_h {
            continue;
        }
        let idx = (cy as usize * canvas_w as usize + cx as usize) * 4;
        canvas[idx..idx + 4].copy_from_slice(&pixel.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    fn gif_bytes(colors: &[[u8; 4]], delay_ms: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut bytes);
            let frames = colors.iter().map(|&color| {
                Frame::from_parts(
                    RgbaImage::from_pixel(8, 6, Rgba(color)),
                    0,
                    0,
                    Delay::from_numer_denom_ms(delay_ms, 1),
                )
            });
            encoder.encode_frames(frames).unwrap();
        }
        bytes
    }

    #[test]
    fn test_probe_encoded_png() {
        let bytes = png_bytes(6, 4, [10, 200, 30, 255]);
        let codec = SoftwareCodec::new();
        let info = codec.probe(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(info.width, 6);
        assert_eq!(info.height, 4);
        assert_eq!(info.frame_count, 1);
    }

    #[test]
    fn test_decode_static_rgba() {
        let bytes = png_bytes(6, 4, [10, 200, 30, 255]);
        let codec = SoftwareCodec::new();
        let bitmap = codec
            .decode_static(&mut Cursor::new(&bytes), PixelConfig::Rgba8888)
            .unwrap()
            .unwrap();
        assert_eq!(bitmap.width(), 6);
        assert_eq!(bitmap.height(), 4);
        assert_eq!(bitmap.format(), PixelFormat::Rgba8888);
        assert_eq!(bitmap.get_rgba(5, 3), Some([10, 200, 30, 255]));
    }

    #[test]
    fn test_decode_static_refuses_garbage() {
        let codec = SoftwareCodec::new();
        let result = codec
            .decode_static(&mut Cursor::new(b"not an image".as_slice()), PixelConfig::Auto)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_decode_container_collects_frames() {
        // GIF encoding quantizes colors, so assert channel dominance
        // rather than exact values.
        let bytes = gif_bytes(
            &[[200, 0, 0, 255], [0, 200, 0, 255], [0, 0, 200, 255]],
            100,
        );
        let codec = SoftwareCodec::new();
        let data = codec
            .decode_container(&mut Cursor::new(&bytes))
            .unwrap()
            .unwrap();
        assert_eq!(data.width(), 8);
        assert_eq!(data.height(), 6);
        assert_eq!(data.frame_count(), 3);
        assert_eq!(data.delay(0), Duration::from_millis(100));

        let green = &data.frame(1).unwrap().pixels[0..4];
        assert!(green[1] > green[0] && green[1] > green[2]);
    }

    #[test]
    fn test_decode_container_refuses_still_png() {
        let bytes = png_bytes(6, 4, [0, 0, 0, 255]);
        let codec = SoftwareCodec::new();
        assert!(codec.decode_container(&mut Cursor::new(&bytes)).unwrap().is_none());
    }

    #[test]
    fn test_platform_region_decoder_serves_tiles() {
        let bytes = png_bytes(32, 16, [120, 40, 220, 255]);
        let codec = SoftwareCodec::new();
        let mut decoder = codec
            .new_platform_region_decoder(Box::new(Cursor::new(bytes)), PixelFormat::Rgba8888)
            .unwrap()
            .unwrap();
        assert_eq!(decoder.width(), 32);
        assert_eq!(decoder.height(), 16);
        let tile = decoder
            .decode_region(broadview_core::Rect::new(8, 4, 8, 8), 2)
            .unwrap();
        assert_eq!(tile.width(), 4);
        assert_eq!(tile.get_rgba(0, 0), Some([120, 40, 220, 255]));
    }
}
