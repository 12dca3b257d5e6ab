//! # wholeslide
//!
//! Random-access region reading for pyramidal Whole Slide Images (WSI).
//!
//! Whole slide images store the same microscopy scan at several resolutions
//! ("layers"). This library picks the right layer for a requested zoom, maps
//! the viewport into that layer, clips it to the image, has a decoder
//! materialize the pixels and stretches them onto a destination.
//!
//! Decoding itself is delegated: a backend implements
//! [`SlideDecoder`] and [`DecoderSession`], and this crate takes care of the
//! coordinate mapping, clipping, compositing and session lifetime.
//!
//! ## Architecture
//!
//! - [`slide`] - Decoder traits and the owned [`SlideHandle`]
//! - [`region`] - Region planning, compositing and thumbnails
//! - [`config`] - Compositor configuration
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```rust,ignore
//! use wholeslide::{RegionCompositor, RegionRequest, SlideHandle};
//!
//! let mut slide = SlideHandle::open(&decoder, "CMU-1.svs")?;
//!
//! // Paint a 1024x768 viewport at 8x zoom-out
//! let mut canvas = image::RgbaImage::new(1024, 768);
//! let mut compositor = RegionCompositor::default();
//! compositor.paint_region(&mut slide, &mut canvas, &RegionRequest::new(200, 100, 1024, 768, 8.0))?;
//!
//! let thumbnail = compositor.create_thumbnail(&mut slide, 256)?;
//! ```

pub mod config;
pub mod error;
pub mod region;
pub mod slide;

// Re-export commonly used types
pub use config::{CompositorConfig, Interpolation, DEFAULT_OVERLAY_ALPHA};
pub use error::{DecodeError, SlideError};
pub use region::{
    plan_region, unpremultiply, ArgbImage, Canvas, PixelRect, RegionCompositor, RegionPlan,
    RegionRequest, ThumbnailGeometry,
};
pub use slide::{best_layer_for_downsample, DecoderSession, SlideDecoder, SlideHandle};
