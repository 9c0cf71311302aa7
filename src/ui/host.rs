use std::cell::Cell;

/// What the indicator needs from the gesture view that owns it.
pub trait ParentView {
    /// Maximum vertical travel of the pull gesture, in pixels.
    fn total_drag_distance(&self) -> f32;
    /// Current laid-out width; `0` until the first layout pass.
    fn viewport_width(&self) -> i32;
    /// Schedules a future render. Not synchronous with the state change.
    fn request_redraw(&self);
}

/// Plain value-backed parent, for hosts that just forward numbers.
#[derive(Debug, Default)]
pub struct FixedParent {
    total_drag_distance: Cell<f32>,
    viewport_width: Cell<i32>,
    redraws: Cell<u64>,
}

impl FixedParent {
    pub fn new(total_drag_distance: f32, viewport_width: i32) -> Self {
        Self {
            total_drag_distance: Cell::new(total_drag_distance),
            viewport_width: Cell::new(viewport_width),
            redraws: Cell::new(0),
        }
    }

    pub fn set_viewport_width(&self, width: i32) {
        self.viewport_width.set(width);
    }

    pub fn set_total_drag_distance(&self, distance: f32) {
        self.total_drag_distance.set(distance);
    }

    /// Redraw requests received so far.
    pub fn redraws(&self) -> u64 {
        self.redraws.get()
    }
}

impl ParentView for FixedParent {
    fn total_drag_distance(&self) -> f32 {
        self.total_drag_distance.get()
    }

    fn viewport_width(&self) -> i32 {
        self.viewport_width.get()
    }

    fn request_redraw(&self) {
        self.redraws.set(self.redraws.get() + 1);
    }
}
