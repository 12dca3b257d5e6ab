//! Slide abstraction layer.
//!
//! This module provides the owned handle on an opened slide and the traits a
//! decoder backend implements to plug into it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           RegionCompositor              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             SlideHandle                 │
//! │  (cached geometry, single-owner close)  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │   SlideDecoder / DecoderSession traits  │
//! │  (open, layer geometry, region decode)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use wholeslide::slide::{DecoderSession, SlideDecoder, SlideHandle};
//!
//! struct MyDecoder { /* ... */ }
//!
//! impl SlideDecoder for MyDecoder {
//!     type Session = MySession;
//!     fn can_open(&self, path: &Path) -> bool { /* ... */ }
//!     fn open(&self, path: &Path) -> Result<MySession, DecodeError> { /* ... */ }
//! }
//!
//! let mut slide = SlideHandle::open(&MyDecoder::new(), "slide.svs")?;
//! let pixels = slide.read_region(0, 0, 0, 256, 256)?;
//! ```

mod decoder;
mod handle;

pub use decoder::{best_layer_for_downsample, DecoderSession, SlideDecoder};
pub use handle::SlideHandle;
