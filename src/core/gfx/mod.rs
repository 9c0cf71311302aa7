pub mod backends;
pub mod surface;
pub mod types;

// --- Public Data Contract ---
pub use surface::{CanvasState, Layer, Surface};
pub use types::{Bitmap, Bounds, DrawCall, Rect};

// --- Backends ---
pub use backends::raster::RasterSurface;
pub use backends::recording::{Op, RecordingSurface};
