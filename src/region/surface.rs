//! Pixel buffers and paint targets.
//!
//! Decoders fill an [`ArgbImage`]: one `u32` per pixel, `0xAARRGGBB`, with the
//! colour channels pre-multiplied by alpha. The compositor then stretches that
//! buffer onto a [`Canvas`].
//!
//! Scaling and source-over blending are done by `tiny_skia`, whose pixmaps
//! hold pre-multiplied RGBA. `tiny_skia::Pixmap`, `tiny_skia::PixmapMut` and
//! `image::RgbaImage` all implement [`Canvas`]; an `RgbaImage` canvas is
//! treated as holding pre-multiplied RGBA. Use [`unpremultiply`] before handing
//! such an image to an encoder that expects straight alpha.

use image::{Rgba, RgbaImage};
use tiny_skia::{
    BlendMode, ColorU8, FilterQuality, Paint, Pixmap, PixmapMut, PixmapPaint,
    PremultipliedColorU8, Rect, Transform,
};

use crate::config::Interpolation;

use super::plan::PixelRect;

// =============================================================================
// Allocation
// =============================================================================

/// Pixel count of a `width x height` buffer, provided its byte size stays
/// within `isize::MAX`.
fn buffer_len(width: u32, height: u32, bytes_per_pixel: usize) -> Option<usize> {
    let len = (width as usize).checked_mul(height as usize)?;
    let bytes = len.checked_mul(bytes_per_pixel)?;
    (bytes <= isize::MAX as usize).then_some(len)
}

/// Zeroed vector of `len` elements, or `None` if the allocation fails.
fn try_zeroed<T: Clone + Default>(len: usize) -> Option<Vec<T>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).ok()?;
    buffer.resize(len, T::default());
    Some(buffer)
}

/// Allocate a fully transparent RGBA image without panicking on huge sizes.
pub(crate) fn try_rgba_image(width: u32, height: u32) -> Option<RgbaImage> {
    let len = buffer_len(width, height, 4)?;
    RgbaImage::from_raw(width, height, try_zeroed(len * 4)?)
}

// =============================================================================
// ARGB Buffer
// =============================================================================

/// A row-major buffer of pre-multiplied ARGB pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgbImage {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl ArgbImage {
    /// Allocate a fully transparent buffer.
    ///
    /// Returns `None` if the buffer's byte size exceeds `isize::MAX` or the
    /// allocation fails.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        let len = buffer_len(width, height, std::mem::size_of::<u32>())?;
        Some(Self {
            width,
            height,
            pixels: try_zeroed(len)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Convert to a pre-multiplied RGBA image.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let width = self.width as usize;
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            argb_to_rgba(self.pixels[y as usize * width + x as usize])
        })
    }

    /// Copy into a `tiny_skia` pixmap.
    ///
    /// Colour channels larger than alpha are clamped to it. Returns `None` for
    /// an empty buffer.
    pub fn to_pixmap(&self) -> Option<Pixmap> {
        let mut pixmap = Pixmap::new(self.width, self.height)?;
        for (dst, &src) in pixmap.pixels_mut().iter_mut().zip(&self.pixels) {
            let [a, r, g, b] = src.to_be_bytes();
            *dst = PremultipliedColorU8::from_rgba(r.min(a), g.min(a), b.min(a), a)
                .unwrap_or(PremultipliedColorU8::TRANSPARENT);
        }
        Some(pixmap)
    }
}

/// Split a packed `0xAARRGGBB` pixel into RGBA channels.
#[inline]
pub fn argb_to_rgba(pixel: u32) -> Rgba<u8> {
    let [a, r, g, b] = pixel.to_be_bytes();
    Rgba([r, g, b, a])
}

/// Pack RGBA channels into `0xAARRGGBB`.
#[inline]
pub fn rgba_to_argb(pixel: Rgba<u8>) -> u32 {
    let [r, g, b, a] = pixel.0;
    u32::from_be_bytes([a, r, g, b])
}

// =============================================================================
// Canvas Trait
// =============================================================================

/// A destination the compositor can paint on.
///
/// Rectangles may extend past the canvas; implementations clip.
pub trait Canvas {
    /// Draw `image` stretched to fill `dest`, source-over.
    fn draw_image(&mut self, image: &ArgbImage, dest: PixelRect, interpolation: Interpolation);

    /// Fill `dest` with a straight-alpha colour, source-over.
    fn fill_rect(&mut self, dest: PixelRect, color: Rgba<u8>);
}

impl Canvas for PixmapMut<'_> {
    fn draw_image(&mut self, image: &ArgbImage, dest: PixelRect, interpolation: Interpolation) {
        if dest.is_empty() {
            return;
        }
        let Some(source) = image.to_pixmap() else {
            return;
        };

        // Unscaled draws are plain copies; sampling could only blur them
        let unscaled = (dest.width, dest.height)
            == (i64::from(source.width()), i64::from(source.height()));
        let quality = if unscaled {
            FilterQuality::Nearest
        } else {
            interpolation.filter_quality()
        };

        let paint = PixmapPaint {
            opacity: 1.0,
            blend_mode: BlendMode::SourceOver,
            quality,
        };
        let transform = Transform::from_row(
            dest.width as f32 / source.width() as f32,
            0.0,
            0.0,
            dest.height as f32 / source.height() as f32,
            dest.x as f32,
            dest.y as f32,
        );
        self.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
    }

    fn fill_rect(&mut self, dest: PixelRect, color: Rgba<u8>) {
        if dest.is_empty() {
            return;
        }
        let Some(rect) = Rect::from_xywh(
            dest.x as f32,
            dest.y as f32,
            dest.width as f32,
            dest.height as f32,
        ) else {
            return;
        };

        let [r, g, b, a] = color.0;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = false;
        PixmapMut::fill_rect(self, rect, &paint, Transform::identity(), None);
    }
}

impl Canvas for Pixmap {
    fn draw_image(&mut self, image: &ArgbImage, dest: PixelRect, interpolation: Interpolation) {
        self.as_mut().draw_image(image, dest, interpolation);
    }

    fn fill_rect(&mut self, dest: PixelRect, color: Rgba<u8>) {
        Canvas::fill_rect(&mut self.as_mut(), dest, color);
    }
}

impl Canvas for RgbaImage {
    fn draw_image(&mut self, image: &ArgbImage, dest: PixelRect, interpolation: Interpolation) {
        let (width, height) = self.dimensions();
        if let Some(mut pixmap) = PixmapMut::from_bytes(&mut **self, width, height) {
            pixmap.draw_image(image, dest, interpolation);
        }
    }

    fn fill_rect(&mut self, dest: PixelRect, color: Rgba<u8>) {
        let (width, height) = self.dimensions();
        if let Some(mut pixmap) = PixmapMut::from_bytes(&mut **self, width, height) {
            Canvas::fill_rect(&mut pixmap, dest, color);
        }
    }
}

/// Convert a pre-multiplied image to straight alpha in place.
pub fn unpremultiply(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let straight = match PremultipliedColorU8::from_rgba(r.min(a), g.min(a), b.min(a), a) {
            Some(color) if a > 0 => color.demultiply(),
            _ => ColorU8::from_rgba(0, 0, 0, 0),
        };
        *pixel = Rgba([
            straight.red(),
            straight.green(),
            straight.blue(),
            straight.alpha(),
        ]);
    }
}

// =============================================================================
// Tests
// =============================================================================
