//! Decoder traits for pyramidal slide access.
//!
//! This module defines the boundary between the compositing core and whatever
//! library actually parses and decodes slide files. The core never looks at
//! file bytes; it only asks a [`DecoderSession`] for layer geometry and for
//! decoded pixels.
//!
//! # Usage
//!
//! A decoder backend implements [`SlideDecoder`] to open files, and returns a
//! session type implementing [`DecoderSession`]. The session is then owned by
//! a [`crate::slide::SlideHandle`], which caches its geometry and guarantees it
//! is closed exactly once.

use std::path::Path;

use crate::error::DecodeError;

// =============================================================================
// SlideDecoder Trait
// =============================================================================

/// Opens slide files and produces decoder sessions.
///
/// # Example
///
/// ```ignore
/// use wholeslide::slide::{SlideDecoder, SlideHandle};
///
/// let decoder = MyDecoder::new();
/// if SlideHandle::is_valid_file(&decoder, "CMU-1.svs") {
///     let slide = SlideHandle::open(&decoder, "CMU-1.svs")?;
///     println!("{} layers", slide.layer_count());
/// }
/// ```
pub trait SlideDecoder {
    /// The session type produced for an opened slide.
    type Session: DecoderSession;

    /// Check whether this decoder recognizes the file at `path`.
    fn can_open(&self, path: &Path) -> bool;

    /// Open the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a slide this
    /// decoder understands.
    fn open(&self, path: &Path) -> Result<Self::Session, DecodeError>;
}

// =============================================================================
// DecoderSession Trait
// =============================================================================

/// An opened slide inside the decoder.
///
/// Sessions are not assumed to be reentrant: pixel reads take `&mut self`.
pub trait DecoderSession {
    /// Get the number of stored layers.
    ///
    /// Layer 0 is always the highest resolution (full size).
    fn layer_count(&self) -> usize;

    /// Get `(width, height)` of a layer in its own pixels.
    fn layer_dimensions(&self, layer: usize) -> (u64, u64);

    /// Get the downsample factor of a layer relative to layer 0.
    ///
    /// Layer 0 has downsample 1.0; a layer at half resolution has 2.0.
    fn layer_downsample(&self, layer: usize) -> f64;

    /// Find the best layer for a requested downsample factor.
    ///
    /// The default picks the layer with the largest downsample that does not
    /// exceed `downsample`, falling back to layer 0 when none does.
    fn best_layer_for_downsample(&self, downsample: f64) -> usize {
        let downsamples: Vec<f64> = (0..self.layer_count())
            .map(|layer| self.layer_downsample(layer))
            .collect();
        best_layer_for_downsample(&downsamples, downsample)
    }

    /// Decode a region into `dest` as pre-multiplied ARGB pixels.
    ///
    /// # Arguments
    ///
    /// * `dest` - Output buffer of exactly `width * height` pixels, row-major
    /// * `x`, `y` - Region origin in level-0 coordinates
    /// * `layer` - Layer to read pixels from
    /// * `width`, `height` - Region extent in pixels of `layer`
    ///
    /// # Errors
    ///
    /// Returns an error if the region cannot be read or decoded.
    fn read_region(
        &mut self,
        dest: &mut [u32],
        x: i64,
        y: i64,
        layer: usize,
        width: u32,
        height: u32,
    ) -> Result<(), DecodeError>;

    /// Get the free-form comment stored in the slide, if any.
    fn comment(&self) -> Option<String>;

    /// Release the session.
    ///
    /// The default simply drops it.
    fn close(self)
    where
        Self: Sized,
    {
    }
}

/// Pick the layer whose downsample is closest to `downsample` without
/// exceeding it.
///
/// `downsamples` lists the downsample of each layer in layer order. Ties go to
/// the lower layer index. Returns 0 when no layer qualifies.
pub fn best_layer_for_downsample(downsamples: &[f64], downsample: f64) -> usize {
    let mut best_layer = 0;
    let mut best_downsample = f64::NEG_INFINITY;

    for (layer, &layer_downsample) in downsamples.iter().enumerate() {
        if layer_downsample <= downsample && layer_downsample > best_downsample {
            best_layer = layer;
            best_downsample = layer_downsample;
        }
    }

    best_layer
}

// =============================================================================
// Tests
// =============================================================================
