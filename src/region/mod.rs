//! Region compositing.
//!
//! This module turns viewport requests into pixels: it maps a region given at
//! some zoom onto the best stored layer, clips it to the layer, has the
//! decoder materialize the pixels and stretches them onto a destination.
//!
//! # Components
//!
//! - [`RegionRequest`]: Viewport origin, size and zoom for one paint call
//! - [`plan_region`] / [`RegionPlan`]: Coordinate mapping and clipping
//! - [`RegionCompositor`]: Orchestrates decode and paint, renders thumbnails
//! - [`ArgbImage`]: Pre-multiplied ARGB buffer filled by decoders
//! - [`Canvas`]: Paint target, implemented for `image::RgbaImage` and
//!   `tiny_skia` pixmaps
//!
//! # Example
//!
//! ```ignore
//! use wholeslide::region::RegionCompositor;
//!
//! let mut compositor = RegionCompositor::default();
//! let thumbnail = compositor.create_thumbnail(&mut slide, 1024)?;
//! assert!(thumbnail.width().max(thumbnail.height()) <= 1024);
//! ```

mod compositor;
mod plan;
mod surface;
mod thumbnail;

pub use compositor::RegionCompositor;
pub use plan::{plan_region, PixelRect, RegionPlan, RegionRequest};
pub use surface::{argb_to_rgba, rgba_to_argb, unpremultiply, ArgbImage, Canvas};
pub use thumbnail::ThumbnailGeometry;
