use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by a decoder collaborator.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// The decoder does not recognize the file
    #[error("Unsupported slide: {0}")]
    Unsupported(String),

    /// Reading the underlying file failed
    #[error("I/O error: {0}")]
    Io(String),

    /// Pixel data could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Errors surfaced by slide handles, region compositing and thumbnails.
#[derive(Debug, Clone, Error)]
pub enum SlideError {
    /// The decoder could not open the slide. No handle is produced.
    #[error("Failed to open slide {}: {source}", .path.display())]
    Open { path: PathBuf, source: DecodeError },

    /// The handle's decoder session has already been released
    #[error("Slide has been disposed")]
    Disposed,

    /// A caller-supplied argument is outside its valid range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The decoder selected a layer the slide does not have
    #[error("Invalid layer: {layer} (slide has {layer_count} layers)")]
    LayerOutOfRange { layer: usize, layer_count: usize },

    /// The layer-local extent cannot be held in a single buffer
    #[error("Region too large: {width}x{height}")]
    RegionTooLarge { width: i64, height: i64 },

    /// Reading pixels from the decoder failed
    #[error("Region read failed: {0}")]
    Decode(#[from] DecodeError),
}
