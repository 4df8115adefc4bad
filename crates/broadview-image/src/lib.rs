//! Broadview Image - Source Selection and Animation
//!
//! Classifies an opaque image stream, picks a rendering strategy suited to
//! its size and format, and for animated images drives frame advancement
//! from a dedicated worker thread synchronized with a redraw host.

mod codecs;
mod engine;
mod region;
mod selector;
mod source;

pub use codecs::SoftwareCodec;
pub use engine::AnimatedFrameEngine;
pub use region::RegionDecoderAdapter;
pub use selector::SourceSelector;
pub use source::{ImageSource, StaticSource, TiledSource};
