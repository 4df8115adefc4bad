//! Header probes
//!
//! Extracts dimensions, frame count, and opacity from PNG, JPEG, and GIF
//! streams without decoding any pixel data. Anything that fails to parse
//! is `NotAnImage`.

use broadview_core::{DecodeError, ImageInfo};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Probe an in-memory stream
pub(crate) fn probe_bytes(bytes: &[u8]) -> Result<ImageInfo, DecodeError> {
    let info = if bytes.starts_with(PNG_SIGNATURE) {
        probe_png(bytes)
    } else if bytes.starts_with(&[0xFF, 0xD8]) {
        probe_jpeg(bytes)
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        probe_gif(bytes)
    } else {
        None
    };
    info.ok_or(DecodeError::NotAnImage)
}

/// Bounds-checked forward scanner over the header bytes
struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    fn u8(&mut self) -> Option<u8> {
        let byte = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    fn u16_le(&mut self) -> Option<u16> {
        let bytes = self.take(2)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn u16_be(&mut self) -> Option<u16> {
        let bytes = self.take(2)?;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn u32_be(&mut self) -> Option<u32> {
        let bytes = self.take(4)?;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let slice = self.bytes.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn skip(&mut self, len: usize) -> Option<()> {
        let end = self.pos.checked_add(len)?;
        if end > self.bytes.len() {
            return None;
        }
        self.pos = end;
        Some(())
    }
}

/// Walk PNG chunks: IHDR for geometry, acTL for APNG frame count, tRNS
/// for transparency on otherwise alpha-free color types.
fn probe_png(bytes: &[u8]) -> Option<ImageInfo> {
    let mut scanner = Scanner::new(bytes, PNG_SIGNATURE.len());

    let ihdr_len = scanner.u32_be()?;
    if scanner.take(4)? != b"IHDR" || ihdr_len != 13 {
        return None;
    }
    let width = scanner.u32_be()?;
    let height = scanner.u32_be()?;
    scanner.u8()?; // bit depth
    let color_type = scanner.u8()?;
    scanner.skip(3 + 4)?; // compression, filter, interlace, CRC

    // Color types 4 and 6 carry an alpha channel.
    let mut opaque = color_type & 0x04 == 0;
    let mut frame_count = 1;

    loop {
        let Some(len) = scanner.u32_be() else { break };
        let Some(kind) = scanner.take(4) else { break };
        match kind {
            b"acTL" => {
                let mut body = Scanner::new(bytes, scanner.pos);
                frame_count = body.u32_be()?.max(1);
            }
            b"tRNS" => opaque = false,
            b"IEND" => break,
            _ => {}
        }
        scanner.skip(len as usize + 4)?;
    }

    Some(ImageInfo { width, height, frame_count, opaque })
}

/// Scan JPEG markers for the first start-of-frame segment.
fn probe_jpeg(bytes: &[u8]) -> Option<ImageInfo> {
    let mut scanner = Scanner::new(bytes, 2);
    loop {
        let mut marker = scanner.u8()?;
        if marker != 0xFF {
            continue;
        }
        // Fill bytes pad markers.
        while marker == 0xFF {
            marker = scanner.u8()?;
        }
        match marker {
            // Standalone markers carry no length.
            0x01 | 0xD0..=0xD8 => {}
            // SOF0..SOF15 minus DHT, JPG, and DAC.
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                scanner.skip(2)?; // segment length
                scanner.u8()?; // sample precision
                let height = scanner.u16_be()?;
                let width = scanner.u16_be()?;
                return Some(ImageInfo {
                    width: width.into(),
                    height: height.into(),
                    frame_count: 1,
                    opaque: true,
                });
            }
            // Start of scan: entropy-coded data follows, no SOF seen.
            0xDA => return None,
            _ => {
                let len = scanner.u16_be()?;
                scanner.skip((len as usize).checked_sub(2)?)?;
            }
        }
    }
}

/// Walk GIF blocks: image descriptors give the frame count, graphic
/// control extensions give the transparency flag.
fn probe_gif(bytes: &[u8]) -> Option<ImageInfo> {
    let mut scanner = Scanner::new(bytes, 6);
    let width = scanner.u16_le()?;
    let height = scanner.u16_le()?;
    let packed = scanner.u8()?;
    scanner.skip(2)?; // background color, aspect ratio
    if packed & 0x80 != 0 {
        scanner.skip(3 << ((packed & 0x07) + 1))?;
    }

    let mut frame_count = 0u32;
    let mut opaque = true;

    loop {
        match scanner.u8()? {
            // Trailer
            0x3B => break,
            // Extension
            0x21 => {
                let label = scanner.u8()?;
                if label == 0xF9 {
                    // Graphic control: bit 0 is the transparency flag.
                    let size = scanner.u8()?;
                    let body = scanner.take(size as usize)?;
                    if body.first().is_some_and(|flags| flags & 0x01 != 0) {
                        opaque = false;
                    }
                    skip_sub_blocks(&mut scanner)?;
                } else {
                    skip_sub_blocks(&mut scanner)?;
                }
            }
            // Image descriptor
            0x2C => {
                frame_count += 1;
                scanner.skip(8)?;
                let local = scanner.u8()?;
                if local & 0x80 != 0 {
                    scanner.skip(3 << ((local & 0x07) + 1))?;
                }
                scanner.u8()?; // LZW minimum code size
                skip_sub_blocks(&mut scanner)?;
            }
            _ => return None,
        }
    }

    if frame_count == 0 {
        return None;
    }
    Some(ImageInfo { width: width.into(), height: height.into(), frame_count, opaque })
}

fn skip_sub_blocks(scanner: &mut Scanner<'_>) -> Option<()> {
    loop {
        let size = scanner.u8()?;
        if size == 0 {
            return Some(());
        }
        scanner.skip(size as usize)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32, color_type: u8, extra: &[u8]) -> Vec<u8> {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[8, color_type, 0, 0, 0]);
        bytes.extend_from_slice(&[0; 4]); // CRC, unchecked
        bytes.extend_from_slice(extra);
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(b"IEND");
        bytes.extend_from_slice(&[0; 4]);
        bytes
    }

    fn chunk(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut bytes = (body.len() as u32).to_be_bytes().to_vec();
        bytes.extend_from_slice(kind);
        bytes.extend_from_slice(body);
        bytes.extend_from_slice(&[0; 4]);
        bytes
    }

    #[test]
    fn test_png_truecolor_probe() {
        let info = probe_bytes(&png_bytes(640, 480, 2, &[])).unwrap();
        assert_eq!(info.width, 640);
        assert_eq!(info.height, 480);
        assert_eq!(info.frame_count, 1);
        assert!(info.opaque);
    }

    #[test]
    fn test_png_alpha_and_trns() {
        let info = probe_bytes(&png_bytes(8, 8, 6, &[])).unwrap();
        assert!(!info.opaque);

        let trns = chunk(b"tRNS", &[0, 0, 0, 0, 0, 0]);
        let info = probe_bytes(&png_bytes(8, 8, 2, &trns)).unwrap();
        assert!(!info.opaque);
    }

    #[test]
    fn test_apng_frame_count_from_actl() {
        let mut actl = Vec::new();
        actl.extend_from_slice(&12u32.to_be_bytes());
        actl.extend_from_slice(&0u32.to_be_bytes());
        let info = probe_bytes(&png_bytes(8, 8, 6, &chunk(b"acTL", &actl))).unwrap();
        assert_eq!(info.frame_count, 12);
        assert!(info.is_animated());
    }

    #[test]
    fn test_jpeg_sof_scan() {
        let mut bytes = vec![0xFF, 0xD8];
        // APP0 segment before the SOF.
        bytes.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0x4A, 0x46]);
        bytes.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08]);
        bytes.extend_from_slice(&300u16.to_be_bytes());
        bytes.extend_from_slice(&200u16.to_be_bytes());
        bytes.extend_from_slice(&[0x03, 0, 0, 0]);

        let info = probe_bytes(&bytes).unwrap();
        assert_eq!(info.width, 200);
        assert_eq!(info.height, 300);
        assert!(info.opaque);
    }

    fn gif_image_descriptor(width: u16, height: u16) -> Vec<u8> {
        let mut bytes = vec![0x2C, 0, 0, 0, 0];
        bytes.extend_from_slice(&width.to_le_bytes());
        bytes.extend_from_slice(&height.to_le_bytes());
        bytes.push(0); // no local color table
        bytes.push(2); // LZW minimum code size
        bytes.extend_from_slice(&[1, 0x00, 0]); // one data sub-block, terminator
        bytes
    }

    fn gif_bytes(frames: u32, transparent: bool) -> Vec<u8> {
        let mut bytes = b"GIF89a".to_vec();
        bytes.extend_from_slice(&40u16.to_le_bytes());
        bytes.extend_from_slice(&30u16.to_le_bytes());
        bytes.extend_from_slice(&[0, 0, 0]); // no global color table
        for _ in 0..frames {
            let flags = if transparent { 0x01 } else { 0x00 };
            bytes.extend_from_slice(&[0x21, 0xF9, 4, flags, 0, 0, 0, 0]);
            bytes.extend_from_slice(&gif_image_descriptor(40, 30));
        }
        bytes.push(0x3B);
        bytes
    }

    #[test]
    fn test_gif_counts_image_descriptors() {
        let info = probe_bytes(&gif_bytes(7, false)).unwrap();
        assert_eq!(info.width, 40);
        assert_eq!(info.height, 30);
        assert_eq!(info.frame_count, 7);
        assert!(info.opaque);
        assert!(info.is_animated());
    }

    #[test]
    fn test_gif_transparency_flag() {
        let info = probe_bytes(&gif_bytes(2, true)).unwrap();
        assert!(!info.opaque);
    }

    #[test]
    fn test_garbage_is_not_an_image() {
        assert!(matches!(
            probe_bytes(b"this is not an image at all"),
            Err(DecodeError::NotAnImage)
        ));
        assert!(matches!(probe_bytes(&[]), Err(DecodeError::NotAnImage)));
        // Truncated GIF header.
        assert!(matches!(
            probe_bytes(b"GIF89a\x28"),
            Err(DecodeError::NotAnImage)
        ));
    }
}
