//! Broadview Core - Image Engine Contracts
//!
//! Shared contracts and pixel primitives for the broadview large-image
//! engine: stream handles, pixel buffers, probe metadata, native codec
//! capabilities, and the host scheduling surface.

mod codec;
mod data;
mod error;
mod host;
mod info;
mod pixel;
mod renderer;
mod stream;

pub use codec::{ImageCodec, RegionDecode};
pub use data::{FrameData, ImageData, ImageDataRenderer};
pub use error::DecodeError;
pub use host::{Animatable, FrameHost};
pub use info::ImageInfo;
pub use pixel::{Bitmap, PixelConfig, PixelFormat, Rect};
pub use renderer::FrameRenderer;
pub use stream::{FilePipe, MemoryPipe, StreamPipe};
