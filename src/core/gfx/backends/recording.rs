use crate::core::gfx::surface::{CanvasState, Surface};
use crate::core::gfx::types::{Bitmap, DrawCall, Rect};
use crate::utils::math;
use cgmath::Matrix3;
use serde::Serialize;

/// One surface call, as issued by the caller.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    Save,
    Restore { count: usize },
    Translate { dx: f32, dy: f32 },
    Clip { rect: Rect },
    Draw(DrawCall),
}

/// Headless surface that only records what it was asked to do.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    state: CanvasState,
    ops: Vec<Op>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn draws(&self) -> impl Iterator<Item = &DrawCall> {
        self.ops.iter().filter_map(|op| match op {
            Op::Draw(call) => Some(call),
            _ => None,
        })
    }

    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    /// Drops recorded ops; the canvas state is kept.
    pub fn take_ops(&mut self) -> Vec<Op> {
        std::mem::take(&mut self.ops)
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) -> usize {
        self.ops.push(Op::Save);
        self.state.save()
    }

    fn restore_to_count(&mut self, count: usize) {
        self.ops.push(Op::Restore { count });
        self.state.restore_to_count(count);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.ops.push(Op::Translate { dx, dy });
        self.state.translate(dx, dy);
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.ops.push(Op::Clip { rect });
        self.state.clip_rect(rect);
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, matrix: &Matrix3<f32>) {
        let full = self.state.concat(matrix);
        self.ops.push(Op::Draw(DrawCall {
            transform: math::to_rows(&full),
            clip: self.state.current().clip,
            bitmap_width: bitmap.width(),
            bitmap_height: bitmap.height(),
        }));
    }
}
