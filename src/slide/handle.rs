//! Owned handle on an opened slide.
//!
//! A [`SlideHandle`] owns exactly one decoder session. Layer geometry is copied
//! out of the session when the slide is opened, so dimension accessors keep
//! working after the session is released. Everything that needs the decoder
//! fails with [`SlideError::Disposed`] once it is gone.
//!
//! The session is released exactly once: by [`SlideHandle::dispose`], or when
//! the handle is dropped.

use std::fmt;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::debug;

use crate::error::{DecodeError, SlideError};
use crate::region::{ArgbImage, Canvas, RegionCompositor, RegionPlan, RegionRequest};

use super::decoder::{DecoderSession, SlideDecoder};

/// An opened pyramidal slide.
///
/// The handle is move-only; it cannot be cloned, so there is never more than
/// one owner of the underlying session. Reads take `&mut self`, which gives
/// each read exclusive access to the session.
///
/// # Example
///
/// ```ignore
/// use wholeslide::slide::SlideHandle;
///
/// let mut slide = SlideHandle::open(&decoder, "CMU-1.svs")?;
/// println!("{}x{}", slide.layer0_width(), slide.layer0_height());
///
/// let thumbnail = slide.create_thumbnail(512)?;
/// slide.dispose();
///
/// // Geometry survives disposal, reads do not
/// assert_eq!(slide.layer_count(), 3);
/// assert!(slide.comment().is_err());
/// ```
pub struct SlideHandle<S: DecoderSession> {
    path: PathBuf,
    session: Option<S>,
    layer_widths: Vec<u64>,
    layer_heights: Vec<u64>,
}

impl<S: DecoderSession> SlideHandle<S> {
    /// Open the slide at `path` with `decoder`.
    ///
    /// Queries the layer count and every layer's dimensions once; they are
    /// never queried again.
    ///
    /// # Errors
    ///
    /// Returns [`SlideError::Open`] if the decoder cannot open the file or the
    /// file has no layers.
    pub fn open<D>(decoder: &D, path: impl AsRef<Path>) -> Result<Self, SlideError>
    where
        D: SlideDecoder<Session = S> + ?Sized,
    {
        let path = path.as_ref();
        let session = decoder.open(path).map_err(|source| SlideError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let layer_count = session.layer_count();
        if layer_count == 0 {
            session.close();
            return Err(SlideError::Open {
                path: path.to_path_buf(),
                source: DecodeError::Unsupported("slide has no layers".to_string()),
            });
        }

        let (layer_widths, layer_heights) = (0..layer_count)
            .map(|layer| session.layer_dimensions(layer))
            .unzip();

        let handle = Self {
            path: path.to_path_buf(),
            session: Some(session),
            layer_widths,
            layer_heights,
        };

        debug!(
            path = %handle.path.display(),
            layers = layer_count,
            width = handle.layer0_width(),
            height = handle.layer0_height(),
            "Opened slide"
        );

        Ok(handle)
    }

    /// Check whether `decoder` recognizes the file at `path`.
    pub fn is_valid_file<D>(decoder: &D, path: impl AsRef<Path>) -> bool
    where
        D: SlideDecoder<Session = S> + ?Sized,
    {
        decoder.can_open(path.as_ref())
    }

    /// Release the decoder session.
    ///
    /// Safe to call any number of times; only the first call has an effect.
    pub fn dispose(&mut self) {
        if let Some(session) = self.session.take() {
            session.close();
            debug!(path = %self.path.display(), "Disposed slide");
        }
    }

    /// True once the decoder session has been released.
    pub fn is_disposed(&self) -> bool {
        self.session.is_none()
    }

    /// Path the slide was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // -------------------------------------------------------------------------
    // Cached geometry
    // -------------------------------------------------------------------------

    /// Number of stored layers (always at least 1).
    pub fn layer_count(&self) -> usize {
        self.layer_widths.len()
    }

    /// Width of a layer in its own pixels, or `None` if out of range.
    pub fn layer_width(&self, layer: usize) -> Option<u64> {
        self.layer_widths.get(layer).copied()
    }

    /// Height of a layer in its own pixels, or `None` if out of range.
    pub fn layer_height(&self, layer: usize) -> Option<u64> {
        self.layer_heights.get(layer).copied()
    }

    /// `(width, height)` of a layer, or `None` if out of range.
    pub fn layer_dimensions(&self, layer: usize) -> Option<(u64, u64)> {
        Some((self.layer_width(layer)?, self.layer_height(layer)?))
    }

    /// Width of the full-resolution layer.
    pub fn layer0_width(&self) -> u64 {
        self.layer_widths[0]
    }

    /// Height of the full-resolution layer.
    pub fn layer0_height(&self) -> u64 {
        self.layer_heights[0]
    }

    // -------------------------------------------------------------------------
    // Decoder queries
    // -------------------------------------------------------------------------

    /// Free-form comment stored in the slide.
    pub fn comment(&self) -> Result<Option<String>, SlideError> {
        Ok(self.session()?.comment())
    }

    /// Downsample factor of a layer relative to layer 0.
    pub fn layer_downsample(&self, layer: usize) -> Result<f64, SlideError> {
        let session = self.session()?;
        self.check_layer(layer)?;
        Ok(session.layer_downsample(layer))
    }

    /// The layer the decoder considers best for `downsample`.
    ///
    /// The index is passed through unchecked.
    pub fn best_layer_for_downsample(&self, downsample: f64) -> Result<usize, SlideError> {
        Ok(self.session()?.best_layer_for_downsample(downsample))
    }

    /// Decode a region straight from the decoder.
    ///
    /// `(x, y)` is the origin in level-0 coordinates, `width` and `height` are
    /// in pixels of `layer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slide is disposed, the layer does not exist,
    /// the buffer cannot be allocated, or the decoder fails.
    pub fn read_region(
        &mut self,
        layer: usize,
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    ) -> Result<ArgbImage, SlideError> {
        if self.is_disposed() {
            return Err(SlideError::Disposed);
        }
        self.check_layer(layer)?;

        let mut pixels = ArgbImage::new(width, height).ok_or(SlideError::RegionTooLarge {
            width: i64::from(width),
            height: i64::from(height),
        })?;
        self.session_mut()?
            .read_region(pixels.pixels_mut(), x, y, layer, width, height)?;

        Ok(pixels)
    }

    // -------------------------------------------------------------------------
    // Compositing shortcuts
    // -------------------------------------------------------------------------

    /// Paint a region with a default [`RegionCompositor`].
    pub fn paint_region<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        request: &RegionRequest,
    ) -> Result<RegionPlan, SlideError> {
        RegionCompositor::default().paint_region(self, canvas, request)
    }

    /// Thumbnail of the whole slide with a default [`RegionCompositor`].
    pub fn create_thumbnail(&mut self, max_size: u32) -> Result<RgbaImage, SlideError> {
        RegionCompositor::default().create_thumbnail(self, max_size)
    }

    /// Thumbnail of a level-0 region with a default [`RegionCompositor`].
    pub fn create_thumbnail_region(
        &mut self,
        x: i64,
        y: i64,
        width: u64,
        height: u64,
        max_size: u32,
    ) -> Result<RgbaImage, SlideError> {
        RegionCompositor::default().create_thumbnail_region(self, x, y, width, height, max_size)
    }

    fn session(&self) -> Result<&S, SlideError> {
        self.session.as_ref().ok_or(SlideError::Disposed)
    }

    fn session_mut(&mut self) -> Result<&mut S, SlideError> {
        self.session.as_mut().ok_or(SlideError::Disposed)
    }

    fn check_layer(&self, layer: usize) -> Result<(), SlideError> {
        if layer >= self.layer_count() {
            return Err(SlideError::LayerOutOfRange {
                layer,
                layer_count: self.layer_count(),
            });
        }
        Ok(())
    }
}

impl<S: DecoderSession> Drop for SlideHandle<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<S: DecoderSession> fmt::Debug for SlideHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlideHandle")
            .field("path", &self.path)
            .field("layer_count", &self.layer_count())
            .field("layer_widths", &self.layer_widths)
            .field("layer_heights", &self.layer_heights)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
