use crate::core::gfx::surface::{CanvasState, Surface};
use crate::core::gfx::types::{Bitmap, Rect};
use crate::utils::math;
use cgmath::{Matrix3, SquareMatrix};
use image::{Pixel, Rgba, RgbaImage};
use log::warn;
use std::error::Error;
use std::path::Path;

/// Software surface painting into an RGBA8 target.
///
/// Bitmaps are sampled nearest-neighbour through the inverse transform and
/// composited source-over with `Pixel::blend`.
pub struct RasterSurface {
    target: RgbaImage,
    state: CanvasState,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            target: RgbaImage::new(width, height),
            state: CanvasState::new(),
        }
    }

    /// Fills the target and resets transform/clip for a new frame.
    pub fn begin_frame(&mut self, clear: [u8; 4]) {
        for px in self.target.pixels_mut() {
            *px = Rgba(clear);
        }
        self.state = CanvasState::new();
    }

    pub fn image(&self) -> &RgbaImage {
        &self.target
    }

    pub fn save_png(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        self.target
            .save(path)
            .map_err(|e| format!("Failed to write frame {:?}: {}", path, e))?;
        Ok(())
    }

    fn device_area(&self, full: &Matrix3<f32>, bitmap: &Bitmap) -> Option<Rect> {
        let src = Rect::new(0.0, 0.0, bitmap.width() as f32, bitmap.height() as f32);
        let target = Rect::new(0.0, 0.0, self.target.width() as f32, self.target.height() as f32);
        let mut area = math::map_rect(full, &src).intersect(&target);
        if let Some(clip) = self.state.current().clip {
            area = area.intersect(&clip);
        }
        (!area.is_empty()).then_some(area)
    }
}

impl Surface for RasterSurface {
    fn save(&mut self) -> usize {
        self.state.save()
    }

    fn restore_to_count(&mut self, count: usize) {
        self.state.restore_to_count(count);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.translate(dx, dy);
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.state.clip_rect(rect);
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, matrix: &Matrix3<f32>) {
        let full = self.state.concat(matrix);
        let Some(inverse) = full.invert() else {
            warn!("Skipping draw through a singular transform.");
            return;
        };
        let Some(area) = self.device_area(&full, bitmap) else {
            return;
        };
        let clip = self.state.current().clip;

        let (bw, bh) = (bitmap.width() as f32, bitmap.height() as f32);
        let x0 = area.left.floor().max(0.0) as u32;
        let y0 = area.top.floor().max(0.0) as u32;
        let x1 = (area.right.ceil() as u32).min(self.target.width());
        let y1 = (area.bottom.ceil() as u32).min(self.target.height());

        for py in y0..y1 {
            for px in x0..x1 {
                let (cx, cy) = (px as f32 + 0.5, py as f32 + 0.5);
                if let Some(c) = clip {
                    if !c.contains(cx, cy) {
                        continue;
                    }
                }
                let (sx, sy) = math::map_point(&inverse, cx, cy);
                if sx < 0.0 || sy < 0.0 || sx >= bw || sy >= bh {
                    continue;
                }
                let src = bitmap.pixels().get_pixel(sx as u32, sy as u32);
                self.target.get_pixel_mut(px, py).blend(src);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const CLEAR: [u8; 4] = [0, 0, 0, 0];

    fn solid(w: u32, h: u32, c: [u8; 4]) -> Bitmap {
        Bitmap::from_rgba(RgbaImage::from_pixel(w, h, Rgba(c)))
    }

    #[test]
    fn draws_translated_bitmap() {
        let mut s = RasterSurface::new(8, 8);
        s.begin_frame(CLEAR);
        s.draw_bitmap(&solid(2, 2, RED), &math::translation(3.0, 4.0));

        assert_eq!(s.image().get_pixel(3, 4).0, RED);
        assert_eq!(s.image().get_pixel(4, 5).0, RED);
        assert_eq!(s.image().get_pixel(5, 4).0, CLEAR);
        assert_eq!(s.image().get_pixel(2, 4).0, CLEAR);
    }

    #[test]
    fn clip_masks_pixels() {
        let mut s = RasterSurface::new(8, 8);
        s.begin_frame(CLEAR);
        let saved = s.save();
        s.clip_rect(Rect::new(0.0, 0.0, 8.0, 2.0));
        s.draw_bitmap(&solid(8, 8, RED), &Matrix3::identity());
        s.restore_to_count(saved);

        assert_eq!(s.image().get_pixel(0, 1).0, RED);
        assert_eq!(s.image().get_pixel(0, 2).0, CLEAR);
    }

    #[test]
    fn half_turn_flips_content() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba(CLEAR));
        img.put_pixel(0, 0, Rgba(RED));
        let bmp = Bitmap::from_rgba(img);

        let mut s = RasterSurface::new(2, 1);
        s.begin_frame(CLEAR);
        let m = math::post_rotate_about(Matrix3::identity(), 180.0, 1.0, 0.5);
        s.draw_bitmap(&bmp, &m);

        assert_eq!(s.image().get_pixel(1, 0).0, RED);
        assert_eq!(s.image().get_pixel(0, 0).0, CLEAR);
    }

    #[test]
    fn translucent_bitmap_blends_over_frame() {
        let mut s = RasterSurface::new(4, 4);
        s.begin_frame([0, 0, 255, 255]);
        s.draw_bitmap(&solid(2, 2, [255, 0, 0, 128]), &math::translation(1.0, 1.0));

        let px = s.image().get_pixel(1, 1);
        assert_eq!(px[3], 255);
        assert!(px[0] > 120 && px[0] < 135, "red {}", px[0]);
        assert!(px[2] > 120 && px[2] < 135, "blue {}", px[2]);
        assert_eq!(s.image().get_pixel(0, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn transparent_bitmap_leaves_frame_untouched() {
        let mut s = RasterSurface::new(4, 4);
        s.begin_frame([1, 2, 3, 4]);
        s.draw_bitmap(&solid(4, 4, [255, 255, 255, 0]), &Matrix3::identity());

        assert!(s.image().pixels().all(|p| p.0 == [1, 2, 3, 4]));
    }
}
