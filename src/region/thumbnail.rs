//! Thumbnail rendering on top of region compositing.
//!
//! A thumbnail is a region painted at the downsample that makes its longest
//! side fit `max_size`. Thumbnails never upscale: a region already smaller
//! than `max_size` is rendered at native resolution.

use image::RgbaImage;

use crate::error::SlideError;
use crate::slide::{DecoderSession, SlideHandle};

use super::compositor::RegionCompositor;
use super::plan::RegionRequest;
use super::surface::try_rgba_image;

/// Downsample and output geometry of a thumbnail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailGeometry {
    /// Level-0 pixels per thumbnail pixel (>= 1.0)
    pub downsample: f64,

    /// Region origin in thumbnail pixels
    pub x: i64,
    pub y: i64,

    /// Thumbnail size
    pub width: u32,
    pub height: u32,
}

impl ThumbnailGeometry {
    /// Compute the geometry for a level-0 region `(x, y, width, height)`.
    ///
    /// Scaled values are truncated towards zero. They are computed as
    /// `value * max_size / max(width, height)` in integer arithmetic, which is
    /// the exact truncation of `value / downsample`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `max_size` is zero.
    pub fn new(
        x: i64,
        y: i64,
        width: u64,
        height: u64,
        max_size: u32,
    ) -> Result<Self, SlideError> {
        if max_size == 0 {
            return Err(SlideError::InvalidArgument(
                "thumbnail max_size must be > 0".to_string(),
            ));
        }

        let longest = width.max(height);
        if longest <= u64::from(max_size) {
            // Already fits: downsample clamps to 1.0, nothing is scaled
            return Ok(Self {
                downsample: 1.0,
                x,
                y,
                width: width as u32,
                height: height as u32,
            });
        }

        let scale = |value: i128| value * i128::from(max_size) / i128::from(longest);

        Ok(Self {
            downsample: longest as f64 / f64::from(max_size),
            x: scale(i128::from(x)) as i64,
            y: scale(i128::from(y)) as i64,
            width: scale(i128::from(width)) as u32,
            height: scale(i128::from(height)) as u32,
        })
    }

    /// The region request that paints this thumbnail at the origin.
    pub fn request(&self) -> RegionRequest {
        RegionRequest::new(
            self.x,
            self.y,
            i64::from(self.width),
            i64::from(self.height),
            self.downsample,
        )
    }
}

impl RegionCompositor {
    /// Render a thumbnail of the level-0 region `(x, y, width, height)` whose
    /// longest side is at most `max_size`.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_size` is zero, the thumbnail cannot be
    /// allocated, the slide has been disposed, or the region cannot be read.
    pub fn create_thumbnail_region<S: DecoderSession>(
        &mut self,
        slide: &mut SlideHandle<S>,
        x: i64,
        y: i64,
        width: u64,
        height: u64,
        max_size: u32,
    ) -> Result<RgbaImage, SlideError> {
        let geometry = ThumbnailGeometry::new(x, y, width, height, max_size)?;

        let mut image = try_rgba_image(geometry.width, geometry.height).ok_or(
            SlideError::RegionTooLarge {
                width: i64::from(geometry.width),
                height: i64::from(geometry.height),
            },
        )?;
        self.paint_region(slide, &mut image, &geometry.request())?;

        Ok(image)
    }

    /// Render a thumbnail of the whole slide whose longest side is at most
    /// `max_size`.
    pub fn create_thumbnail<S: DecoderSession>(
        &mut self,
        slide: &mut SlideHandle<S>,
        max_size: u32,
    ) -> Result<RgbaImage, SlideError> {
        let (width, height) = (slide.layer0_width(), slide.layer0_height());
        self.create_thumbnail_region(slide, 0, 0, width, height, max_size)
    }
}

// =============================================================================
// Tests
// =============================================================================
