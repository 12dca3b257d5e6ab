//! Test utilities for integration tests.
//!
//! This module provides a mock decoder over a synthetic pyramid that records
//! every call it receives, and a canvas that records what was painted.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::Rgba;

use wholeslide::config::Interpolation;
use wholeslide::error::DecodeError;
use wholeslide::region::{ArgbImage, Canvas, PixelRect};
use wholeslide::slide::{best_layer_for_downsample, DecoderSession, SlideDecoder};

// =============================================================================
// Synthetic Pixels
// =============================================================================

/// Opaque pixel encoding the layer and the level-0 based coordinates it was
/// read at.
pub fn pattern_pixel(layer: usize, x: i64, y: i64) -> u32 {
    0xFF00_0000 | ((layer as u32 & 0xF) << 20) | ((x as u32 & 0x3FF) << 10) | (y as u32 & 0x3FF)
}

/// Install a test subscriber once; controlled by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Call Tracking
// =============================================================================

/// A single `read_region` call as seen by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadCall {
    pub layer: usize,
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Counters shared between a decoder and every session it opened.
#[derive(Debug, Default)]
pub struct Tracker {
    reads: Mutex<Vec<ReadCall>>,
    closes: AtomicUsize,
    layer_count_queries: AtomicUsize,
    dimension_queries: AtomicUsize,
}

impl Tracker {
    pub fn reads(&self) -> Vec<ReadCall> {
        self.reads.lock().unwrap().clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.lock().unwrap().len()
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn layer_count_queries(&self) -> usize {
        self.layer_count_queries.load(Ordering::SeqCst)
    }

    pub fn dimension_queries(&self) -> usize {
        self.dimension_queries.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Mock Decoder
// =============================================================================

/// One stored layer of the synthetic pyramid.
#[derive(Debug, Clone, Copy)]
pub struct MockLayer {
    pub width: u64,
    pub height: u64,
    pub downsample: f64,
}

/// A decoder over a synthetic pyramid.
///
/// Files ending in `.svs` open; everything else is rejected.
pub struct MockDecoder {
    layers: Vec<MockLayer>,
    comment: Option<String>,
    best_layer_override: Option<usize>,
    fail_reads: bool,
    tracker: Arc<Tracker>,
}

impl MockDecoder {
    pub fn new(layers: &[(u64, u64, f64)]) -> Self {
        Self {
            layers: layers
                .iter()
                .map(|&(width, height, downsample)| MockLayer {
                    width,
                    height,
                    downsample,
                })
                .collect(),
            comment: None,
            best_layer_override: None,
            fail_reads: false,
            tracker: Arc::new(Tracker::default()),
        }
    }

    /// 10000x8000 slide with 4x and 16x layers.
    pub fn standard() -> Self {
        Self::new(&[(10000, 8000, 1.0), (2500, 2000, 4.0), (625, 500, 16.0)])
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Always report `layer` as the best layer, whatever the request.
    pub fn with_best_layer(mut self, layer: usize) -> Self {
        self.best_layer_override = Some(layer);
        self
    }

    pub fn with_failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn tracker(&self) -> Arc<Tracker> {
        Arc::clone(&self.tracker)
    }
}

impl SlideDecoder for MockDecoder {
    type Session = MockSession;

    fn can_open(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "svs")
    }

    fn open(&self, path: &Path) -> Result<MockSession, DecodeError> {
        if !self.can_open(path) {
            return Err(DecodeError::Unsupported(format!(
                "{} is not a slide",
                path.display()
            )));
        }

        Ok(MockSession {
            layers: self.layers.clone(),
            comment: self.comment.clone(),
            best_layer_override: self.best_layer_override,
            fail_reads: self.fail_reads,
            tracker: Arc::clone(&self.tracker),
        })
    }
}

/// Session produced by [`MockDecoder`].
pub struct MockSession {
    layers: Vec<MockLayer>,
    comment: Option<String>,
    best_layer_override: Option<usize>,
    fail_reads: bool,
    tracker: Arc<Tracker>,
}

impl DecoderSession for MockSession {
    fn layer_count(&self) -> usize {
        self.tracker.layer_count_queries.fetch_add(1, Ordering::SeqCst);
        self.layers.len()
    }

    fn layer_dimensions(&self, layer: usize) -> (u64, u64) {
        self.tracker.dimension_queries.fetch_add(1, Ordering::SeqCst);
        let layer = &self.layers[layer];
        (layer.width, layer.height)
    }

    fn layer_downsample(&self, layer: usize) -> f64 {
        self.layers[layer].downsample
    }

    fn best_layer_for_downsample(&self, downsample: f64) -> usize {
        if let Some(layer) = self.best_layer_override {
            return layer;
        }
        let downsamples: Vec<f64> = self.layers.iter().map(|l| l.downsample).collect();
        best_layer_for_downsample(&downsamples, downsample)
    }

    fn read_region(
        &mut self,
        dest: &mut [u32],
        x: i64,
        y: i64,
        layer: usize,
        width: u32,
        height: u32,
    ) -> Result<(), DecodeError> {
        self.tracker.reads.lock().unwrap().push(ReadCall {
            layer,
            x,
            y,
            width,
            height,
        });

        if self.fail_reads {
            return Err(DecodeError::Io("simulated read failure".to_string()));
        }
        if dest.len() != width as usize * height as usize {
            return Err(DecodeError::Decode(format!(
                "buffer holds {} pixels, region is {}x{}",
                dest.len(),
                width,
                height
            )));
        }

        for row in 0..height as usize {
            for col in 0..width as usize {
                dest[row * width as usize + col] =
                    pattern_pixel(layer, x + col as i64, y + row as i64);
            }
        }
        Ok(())
    }

    fn comment(&self) -> Option<String> {
        self.comment.clone()
    }

    fn close(self) {
        self.tracker.closes.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Recording Canvas
// =============================================================================

/// A paint operation received by [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Image {
        source: (u32, u32),
        dest: PixelRect,
        interpolation: Interpolation,
    },
    Fill {
        dest: PixelRect,
        color: Rgba<u8>,
    },
}

/// A canvas that only records what it is asked to paint.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<PaintOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Canvas for RecordingCanvas {
    fn draw_image(&mut self, image: &ArgbImage, dest: PixelRect, interpolation: Interpolation) {
        self.ops.push(PaintOp::Image {
            source: image.dimensions(),
            dest,
            interpolation,
        });
    }

    fn fill_rect(&mut self, dest: PixelRect, color: Rgba<u8>) {
        self.ops.push(PaintOp::Fill { dest, color });
    }
}
