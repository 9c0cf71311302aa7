use crate::core::gfx::types::{Bitmap, Rect};
use crate::utils::math;
use cgmath::{Matrix3, SquareMatrix};

/// Canvas-style drawing capability handed to `render`.
///
/// Transforms accumulate like a canvas: `translate` and the matrix passed to
/// `draw_bitmap` are applied in local space, on top of the current state.
pub trait Surface {
    /// Pushes the current transform/clip and returns the depth *before* the push.
    fn save(&mut self) -> usize;
    /// Pops saved states until `count` remain.
    fn restore_to_count(&mut self, count: usize);
    fn translate(&mut self, dx: f32, dy: f32);
    /// Narrows the clip to `rect`, given in local coordinates.
    fn clip_rect(&mut self, rect: Rect);
    fn draw_bitmap(&mut self, bitmap: &Bitmap, matrix: &Matrix3<f32>);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layer {
    pub matrix: Matrix3<f32>,
    /// Device-space clip; `None` means unclipped.
    pub clip: Option<Rect>,
}

impl Default for Layer {
    fn default() -> Self {
        Self { matrix: Matrix3::identity(), clip: None }
    }
}

/// Save/restore stack shared by the surface backends.
#[derive(Clone, Debug)]
pub struct CanvasState {
    stack: Vec<Layer>,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self { stack: vec![Layer::default()] }
    }
}

impl CanvasState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn current(&self) -> &Layer {
        // base layer is never popped
        &self.stack[self.stack.len() - 1]
    }

    #[inline(always)]
    fn current_mut(&mut self) -> &mut Layer {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    /// Number of layers, base included.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn save(&mut self) -> usize {
        let depth = self.stack.len();
        let top = *self.current();
        self.stack.push(top);
        depth
    }

    pub fn restore_to_count(&mut self, count: usize) {
        let keep = count.max(1);
        if self.stack.len() > keep {
            self.stack.truncate(keep);
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        let layer = self.current_mut();
        layer.matrix = layer.matrix * math::translation(dx, dy);
    }

    pub fn clip_rect(&mut self, rect: Rect) {
        let layer = self.current_mut();
        // an inverted rect clips everything; mapping it would normalize it
        let device = if rect.is_empty() {
            Rect::new(0.0, 0.0, 0.0, 0.0)
        } else {
            math::map_rect(&layer.matrix, &rect)
        };
        layer.clip = Some(match layer.clip {
            Some(c) => c.intersect(&device),
            None => device,
        });
    }

    /// Full device transform for content drawn with `local`.
    #[inline(always)]
    pub fn concat(&self, local: &Matrix3<f32>) -> Matrix3<f32> {
        self.current().matrix * *local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_restore_round_trips_transform() {
        let mut s = CanvasState::new();
        let saved = s.save();
        s.translate(0.0, -50.0);
        s.clip_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(s.depth(), 2);
        s.restore_to_count(saved);
        assert_eq!(s.depth(), 1);
        assert_eq!(*s.current(), Layer::default());
    }

    #[test]
    fn clip_is_stored_in_device_space() {
        let mut s = CanvasState::new();
        s.translate(0.0, -100.0);
        s.clip_rect(Rect::new(0.0, 100.0, 320.0, 240.0));
        assert_eq!(s.current().clip, Some(Rect::new(0.0, 0.0, 320.0, 140.0)));
    }

    #[test]
    fn nested_clips_intersect() {
        let mut s = CanvasState::new();
        s.clip_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        s.clip_rect(Rect::new(50.0, 50.0, 200.0, 200.0));
        assert_eq!(s.current().clip, Some(Rect::new(50.0, 50.0, 100.0, 100.0)));
    }

    #[test]
    fn inverted_clip_clips_everything() {
        let mut s = CanvasState::new();
        s.clip_rect(Rect::new(0.0, 300.0, 100.0, 240.0));
        assert!(s.current().clip.unwrap().is_empty());
    }

    #[test]
    fn restore_never_drops_base_layer() {
        let mut s = CanvasState::new();
        s.restore_to_count(0);
        assert_eq!(s.depth(), 1);
        s.translate(1.0, 1.0);
        assert_eq!(s.depth(), 1);
    }
}
