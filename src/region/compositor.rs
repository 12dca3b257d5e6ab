//! Region compositor.
//!
//! The compositor turns a [`RegionRequest`] into pixels on a [`Canvas`]:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       paint_region()                            │
//! │  1. Validate downsample    4. Decode clipped layer rectangle    │
//! │  2. Select layer           5. Stretch onto the canvas           │
//! │  3. Plan (map + clip)      6. Optional debug tint               │
//! └─────────────────────────────────────────────────────────────────┘
//!            │                         │
//!            ▼                         ▼
//!     ┌─────────────┐        ┌──────────────────┐
//!     │ SlideHandle │        │      Canvas      │
//!     │  (decoder)  │        │ (e.g. RgbaImage) │
//!     └─────────────┘        └──────────────────┘
//! ```

use image::{Rgba, RgbaImage};
use tracing::{debug, trace, warn};

use crate::config::CompositorConfig;
use crate::error::{DecodeError, SlideError};
use crate::slide::{DecoderSession, SlideHandle};

use super::plan::{plan_region, RegionPlan, RegionRequest};
use super::surface::{try_rgba_image, Canvas};

// =============================================================================
// Region Compositor
// =============================================================================

/// Paints slide regions at arbitrary zoom onto canvases.
///
/// # Example
///
/// ```ignore
/// use wholeslide::region::{RegionCompositor, RegionRequest};
///
/// let mut compositor = RegionCompositor::default();
/// let mut canvas = image::RgbaImage::new(512, 512);
///
/// // 512x512 viewport at 4x zoom-out, starting at level-0 column 2048
/// let request = RegionRequest::new(512, 0, 512, 512, 4.0);
/// let plan = compositor.paint_region(&mut slide, &mut canvas, &request)?;
/// println!("read layer {} ({}x{})", plan.layer, plan.layer_width, plan.layer_height);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegionCompositor {
    config: CompositorConfig,

    /// Colour of the next debug tint
    overlay_green: bool,
}

impl RegionCompositor {
    /// Create a compositor with the given configuration.
    pub fn new(config: CompositorConfig) -> Self {
        Self {
            config,
            overlay_green: false,
        }
    }

    /// The configuration this compositor paints with.
    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Paint a region of `slide` onto `canvas`.
    ///
    /// Returns the resolved plan. When the request falls entirely outside the
    /// slide the plan is empty, the decoder is not called and the canvas is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The slide has been disposed
    /// - `request.downsample` is not finite or is below 1.0
    /// - The decoder selects a layer the slide does not have
    /// - Reading the region fails
    pub fn paint_region<S, C>(
        &mut self,
        slide: &mut SlideHandle<S>,
        canvas: &mut C,
        request: &RegionRequest,
    ) -> Result<RegionPlan, SlideError>
    where
        S: DecoderSession,
        C: Canvas + ?Sized,
    {
        if slide.is_disposed() {
            return Err(SlideError::Disposed);
        }
        validate_downsample(request.downsample)?;

        let layer = slide.best_layer_for_downsample(request.downsample)?;
        let Some(layer_dimensions) = slide.layer_dimensions(layer) else {
            warn!(
                layer,
                layer_count = slide.layer_count(),
                "Decoder selected a layer outside the slide"
            );
            return Err(SlideError::LayerOutOfRange {
                layer,
                layer_count: slide.layer_count(),
            });
        };

        let layer_downsample = slide.layer_downsample(layer)?;
        if !(layer_downsample.is_finite() && layer_downsample > 0.0) {
            return Err(SlideError::Decode(DecodeError::Decode(format!(
                "layer {} reports downsample {}",
                layer, layer_downsample
            ))));
        }

        let plan = plan_region(request, layer, layer_downsample, layer_dimensions);

        debug!(
            layer = plan.layer,
            layer_width = plan.layer_width,
            layer_height = plan.layer_height,
            base_x = plan.base_x,
            base_y = plan.base_y,
            "Painting region"
        );

        if plan.is_empty() {
            trace!(?request, "Region lies outside the slide, nothing to draw");
            return Ok(plan);
        }

        let too_large = || SlideError::RegionTooLarge {
            width: plan.layer_width,
            height: plan.layer_height,
        };
        let width = u32::try_from(plan.layer_width).map_err(|_| too_large())?;
        let height = u32::try_from(plan.layer_height).map_err(|_| too_large())?;

        // The decoder takes a level-0 origin but a layer-local extent
        let pixels = slide.read_region(plan.layer, plan.base_x, plan.base_y, width, height)?;

        canvas.draw_image(&pixels, plan.dest, self.config.interpolation);

        if self.config.debug_overlay {
            canvas.fill_rect(plan.dest, self.next_overlay_color());
        }

        Ok(plan)
    }

    /// Render a region into a newly allocated, transparent image of the
    /// requested size.
    ///
    /// # Errors
    ///
    /// Same as [`RegionCompositor::paint_region`]; additionally returns
    /// `InvalidArgument` for dimensions outside `u32` and `RegionTooLarge` when
    /// the output image cannot be allocated.
    pub fn render_region<S: DecoderSession>(
        &mut self,
        slide: &mut SlideHandle<S>,
        source_x: i64,
        source_y: i64,
        width: i64,
        height: i64,
        downsample: f64,
    ) -> Result<RgbaImage, SlideError> {
        let out_width = u32::try_from(width).map_err(|_| {
            SlideError::InvalidArgument(format!("width ({}) must fit an image", width))
        })?;
        let out_height = u32::try_from(height).map_err(|_| {
            SlideError::InvalidArgument(format!("height ({}) must fit an image", height))
        })?;

        let mut image = try_rgba_image(out_width, out_height)
            .ok_or(SlideError::RegionTooLarge { width, height })?;
        let request = RegionRequest::new(source_x, source_y, width, height, downsample);
        self.paint_region(slide, &mut image, &request)?;

        Ok(image)
    }

    fn next_overlay_color(&mut self) -> Rgba<u8> {
        let alpha = (self.config.overlay_alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        let color = if self.overlay_green {
            Rgba([0, 255, 0, alpha])
        } else {
            Rgba([255, 0, 0, alpha])
        };
        self.overlay_green = !self.overlay_green;
        color
    }
}

/// Reject zoom factors that are not finite or would upscale beyond native
/// resolution.
pub(crate) fn validate_downsample(downsample: f64) -> Result<(), SlideError> {
    if !downsample.is_finite() {
        return Err(SlideError::InvalidArgument(format!(
            "downsample ({}) must be finite",
            downsample
        )));
    }
    if downsample < 1.0 {
        return Err(SlideError::InvalidArgument(format!(
            "downsample ({}) must be >= 1.0",
            downsample
        )));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
