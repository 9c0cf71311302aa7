use image::RgbaImage;
use serde::Serialize;

/// An owned RGBA8 bitmap.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    pixels: RgbaImage,
}

impl Bitmap {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[inline(always)]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Axis-aligned rectangle, `left/top` inclusive, `right/bottom` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Overlap of two rects; may be empty.
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        }
    }

    #[inline(always)]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// Integer layout bounds as handed out by the parent view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    #[inline(always)]
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// One captured `draw_bitmap`, in device space.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DrawCall {
    /// Row-major 3x3 affine matrix (last row `0 0 1`).
    pub transform: [[f32; 3]; 3],
    /// `None` when nothing clipped the draw.
    pub clip: Option<Rect>,
    pub bitmap_width: u32,
    pub bitmap_height: u32,
}
