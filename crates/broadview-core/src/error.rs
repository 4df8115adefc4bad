//! Decode error taxonomy
//!
//! Every failure in the selection pipeline collapses into one of these
//! three conditions; none of them ever crosses the selector boundary.

use thiserror::Error;

/// Errors raised while probing or decoding an image stream
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The probe could not recognize the stream as a decodable image
    #[error("not a decodable image")]
    NotAnImage,
    /// Reading from the stream handle failed
    #[error("stream error: {0}")]
    Io(#[from] std::io::Error),
    /// A pixel buffer or decode allocation failed
    #[error("allocation failed")]
    Allocation,
}
