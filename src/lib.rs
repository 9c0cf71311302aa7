//! Pull-to-refresh arrow indicator.
//!
//! [`ArrowIndicator`] tracks drag progress from its parent view, spins while a
//! refresh is running and paints itself onto any [`Surface`]. Everything the
//! host platform would normally provide (canvas, frame clock, redraw sink,
//! asset decoding) comes in through traits.

pub mod app;
pub mod config;
pub mod core;
pub mod ui;
pub mod utils;

pub use crate::config::Settings;
pub use crate::core::anim::{LoopSpec, LoopTicker, SpinScheduler};
pub use crate::core::assets::{BitmapSource, BuiltinArrow, ImageFileSource};
pub use crate::core::gfx::{
    Bitmap, Bounds, DrawCall, RasterSurface, RecordingSurface, Rect, Surface,
};
pub use crate::ui::components::ArrowIndicator;
pub use crate::ui::host::{FixedParent, ParentView};
