//! Coordinate mapping and clipping for region requests.
//!
//! Planning is pure arithmetic: given a request, the layer the decoder chose,
//! that layer's downsample and its dimensions, it decides which layer-local
//! rectangle to decode and where the result lands on the destination. No
//! pixels are touched here, which keeps the edge-case policy testable on its
//! own.
//!
//! # Coordinate spaces
//!
//! ```text
//!   request space        level-0 space           layer space
//!   (output pixels)      (native pixels)         (selected layer pixels)
//!
//!   sx ──── × downsample ───► base_x
//!   sx ──── × downsample / layer_downsample ────► layer_x
//!   w  ──── × relative_downsample, rounded ─────► layer_w ──► clip
//! ```
//!
//! The decoder is addressed with the level-0 origin `(base_x, base_y)` and the
//! layer-local extent `(layer_w, layer_h)`. Clipping is done against the layer
//! dimensions using the layer-local origin.

// =============================================================================
// Region Request
// =============================================================================

/// A request to paint part of a slide at some zoom.
///
/// Source coordinates are in output pixels of the requested zoom, so
/// `source_x * downsample` is the level-0 column of the left edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionRequest {
    /// Destination X of the top-left corner
    pub dest_x: i64,

    /// Destination Y of the top-left corner
    pub dest_y: i64,

    /// Source X in output pixels (may be negative)
    pub source_x: i64,

    /// Source Y in output pixels (may be negative)
    pub source_y: i64,

    /// Requested width in output pixels
    pub width: i64,

    /// Requested height in output pixels
    pub height: i64,

    /// Level-0 pixels per output pixel (must be >= 1.0)
    pub downsample: f64,
}

impl RegionRequest {
    /// Create a request painted at the destination origin.
    pub fn new(source_x: i64, source_y: i64, width: i64, height: i64, downsample: f64) -> Self {
        Self {
            dest_x: 0,
            dest_y: 0,
            source_x,
            source_y,
            width,
            height,
            downsample,
        }
    }

    /// Move the destination origin to `(dest_x, dest_y)`.
    pub fn at(mut self, dest_x: i64, dest_y: i64) -> Self {
        self.dest_x = dest_x;
        self.dest_y = dest_y;
        self
    }
}

// =============================================================================
// Pixel Rectangle
// =============================================================================

/// A rectangle in destination pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl PixelRect {
    /// Create a rectangle from its top-left corner and size.
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

// =============================================================================
// Region Plan
// =============================================================================

/// The resolved form of a [`RegionRequest`] against one selected layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionPlan {
    /// Layer the pixels are read from
    pub layer: usize,

    /// Downsample of the selected layer relative to level 0
    pub layer_downsample: f64,

    /// Residual scaling between the selected layer and the requested zoom
    pub relative_downsample: f64,

    /// Region origin in level-0 coordinates, as passed to the decoder
    pub base_x: i64,
    pub base_y: i64,

    /// Region origin in layer-local coordinates
    pub layer_x: i64,
    pub layer_y: i64,

    /// Clipped region extent in layer-local pixels
    pub layer_width: i64,
    pub layer_height: i64,

    /// Where the decoded pixels land, derived from the clipped extent
    pub dest: PixelRect,
}

impl RegionPlan {
    /// True when nothing is left to decode after clipping.
    pub fn is_empty(&self) -> bool {
        self.layer_width <= 0 || self.layer_height <= 0
    }
}

/// Plan a request against the layer selected for it.
///
/// `layer_dimensions` are the selected layer's `(width, height)` as cached at
/// open time. `layer_downsample` must be positive.
pub fn plan_region(
    request: &RegionRequest,
    layer: usize,
    layer_downsample: f64,
    layer_dimensions: (u64, u64),
) -> RegionPlan {
    let downsample = request.downsample;
    let relative_downsample = downsample / layer_downsample;

    let mut dest_x = request.dest_x;
    let mut dest_y = request.dest_y;
    let mut source_x = request.source_x;
    let mut source_y = request.source_y;
    let mut width = request.width;
    let mut height = request.height;

    // Negative source offsets shrink the destination instead of reading
    // outside the image
    if source_x < 0 {
        dest_x = dest_x.saturating_sub(source_x);
        width = width.saturating_add(source_x);
        source_x = 0;
    }
    if source_y < 0 {
        dest_y = dest_y.saturating_sub(source_y);
        height = height.saturating_add(source_y);
        source_y = 0;
    }

    let base_x = (downsample * source_x as f64) as i64;
    let base_y = (downsample * source_y as f64) as i64;
    let layer_x = (relative_downsample * source_x as f64) as i64;
    let layer_y = (relative_downsample * source_y as f64) as i64;

    let (layer_extent_x, layer_extent_y) = layer_dimensions;
    let layer_width = round_half_up(relative_downsample * width as f64)
        .min(to_signed(layer_extent_x).saturating_sub(layer_x));
    let layer_height = round_half_up(relative_downsample * height as f64)
        .min(to_signed(layer_extent_y).saturating_sub(layer_y));

    let dest = PixelRect::new(
        dest_x,
        dest_y,
        round_half_up(layer_width as f64 / relative_downsample),
        round_half_up(layer_height as f64 / relative_downsample),
    );

    RegionPlan {
        layer,
        layer_downsample,
        relative_downsample,
        base_x,
        base_y,
        layer_x,
        layer_y,
        layer_width,
        layer_height,
        dest,
    }
}

/// Round to the nearest integer, halves towards positive infinity.
#[inline]
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[inline]
fn to_signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// =============================================================================
// Tests
// =============================================================================
