//! Concrete [`Surface`](crate::core::gfx::Surface) implementations.
//!
//! Both keep their own [`CanvasState`](crate::core::gfx::CanvasState);
//! `recording` captures calls for inspection, `raster` paints pixels.

pub mod raster;
pub mod recording;
