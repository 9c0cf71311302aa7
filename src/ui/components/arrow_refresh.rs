// src/ui/components/arrow_refresh.rs
//! Pull-to-refresh arrow.
//!
//! While the user drags, the arrow slides from just under the top of the
//! drag band toward its middle and flips once the pull is armed. While a
//! refresh runs it spins at a steady rate. Only the part of the band that has
//! been scrolled into view is painted.
use crate::config::{
    ARMED_ROTATION_DEG, ARROW_SIZE_DP, BOUNDS_HEIGHT_RATIO, FULL_TURN_DEG, OVERPULL_DAMPING,
    OVERPULL_OFFSET,
};
use crate::core::anim::{LoopSpec, LoopTicker, SpinScheduler};
use crate::core::assets::BitmapSource;
use crate::core::gfx::{Bitmap, Bounds, Rect, Surface};
use crate::ui::host::ParentView;
use crate::utils::math;
use cgmath::Matrix3;
use log::{debug, info, trace};
use std::error::Error;
use std::rc::Rc;

// -----------------------------------------------------------------------------
// Pose math
// -----------------------------------------------------------------------------

/// Drag fraction used for placement. Past 1.0 the arrow keeps moving, slowly.
#[inline(always)]
pub fn effective_drag(drag_percent: f32) -> f32 {
    if drag_percent > 1.0 {
        (drag_percent + OVERPULL_OFFSET) / OVERPULL_DAMPING
    } else {
        drag_percent
    }
}

/// Clockwise rotation in degrees about the arrow's own centre.
#[inline(always)]
pub fn rotation_degrees(spinning: bool, drag_percent: f32, spin_phase: f32) -> f32 {
    if spinning {
        FULL_TURN_DEG * spin_phase
    } else if drag_percent >= 1.0 {
        ARMED_ROTATION_DEG
    } else {
        0.0
    }
}

/// Top-left corner of the arrow inside the drag band (before the band's own translation).
pub fn arrow_placement(
    left_offset: f32,
    top_offset: f32,
    total_drag_distance: f32,
    arrow_size: u32,
    drag_percent: f32,
) -> (f32, f32) {
    let travel = total_drag_distance / 2.0 - (arrow_size / 2) as f32;
    (left_offset, top_offset - travel * effective_drag(drag_percent))
}

/// Density-independent units to whole pixels (at least one).
#[inline(always)]
pub fn dp_to_px(dp: f32, density: f32) -> u32 {
    (dp * density).round().max(1.0) as u32
}

// -----------------------------------------------------------------------------
// Indicator
// -----------------------------------------------------------------------------

pub struct ArrowIndicator<S: SpinScheduler = LoopTicker> {
    parent: Rc<dyn ParentView>,
    source: Box<dyn BitmapSource>,
    scheduler: S,
    density: f32,

    viewport_width: i32,
    arrow_size: u32,
    arrow_left_offset: f32,
    arrow_top_offset: f32,
    top: f32,

    drag_percent: f32,
    spin_phase: f32,
    is_spinning: bool,

    arrow: Option<Bitmap>,
    bounds: Bounds,
    dirty: bool,
}

impl ArrowIndicator<LoopTicker> {
    pub fn with_ticker(
        parent: Rc<dyn ParentView>,
        source: Box<dyn BitmapSource>,
        density: f32,
    ) -> Self {
        Self::new(parent, source, LoopTicker::new(), density)
    }
}

impl<S: SpinScheduler> ArrowIndicator<S> {
    /// Builds an idle indicator. Geometry stays unset until the first
    /// [`initialize`](Self::initialize) with a positive width.
    pub fn new(
        parent: Rc<dyn ParentView>,
        source: Box<dyn BitmapSource>,
        scheduler: S,
        density: f32,
    ) -> Self {
        let top = -parent.total_drag_distance();
        Self {
            parent,
            source,
            scheduler,
            density,
            viewport_width: 0,
            arrow_size: dp_to_px(ARROW_SIZE_DP, density),
            arrow_left_offset: 0.0,
            arrow_top_offset: 0.0,
            top,
            drag_percent: 0.0,
            spin_phase: 0.0,
            is_spinning: false,
            arrow: None,
            bounds: Bounds::default(),
            dirty: false,
        }
    }

    /// Deferred first-time setup, run once the parent has been laid out.
    pub fn on_parent_layout(&mut self) -> Result<(), Box<dyn Error>> {
        let width = self.parent.viewport_width();
        self.initialize(width)
    }

    /// Recomputes geometry and reloads the arrow for a new width.
    /// Non-positive or unchanged widths are ignored.
    pub fn initialize(&mut self, viewport_width: i32) -> Result<(), Box<dyn Error>> {
        if viewport_width <= 0 || viewport_width == self.viewport_width {
            return Ok(());
        }

        let total = self.parent.total_drag_distance();
        let arrow_size = dp_to_px(ARROW_SIZE_DP, self.density);
        // Load first so a failure leaves the old width in place for a retry.
        let arrow = self.source.load_scaled(arrow_size, arrow_size)?;

        self.viewport_width = viewport_width;
        self.arrow_size = arrow_size;
        self.arrow_left_offset = ((viewport_width - arrow_size as i32) / 2) as f32;
        self.arrow_top_offset = total - arrow_size as f32;
        self.top = -total;
        self.arrow = Some(arrow);

        info!("Arrow indicator initialized for width {}", viewport_width);
        debug!(
            "arrow_size={} left={} top_offset={} top={} total_drag={}",
            self.arrow_size, self.arrow_left_offset, self.arrow_top_offset, self.top, total
        );
        Ok(())
    }

    /// Pure state update; the caller batches redraws.
    pub fn set_drag_progress(&mut self, percent: f32) {
        self.drag_percent = percent;
    }

    pub fn set_spin_phase(&mut self, phase: f32) {
        self.spin_phase = phase;
        self.mark_dirty();
    }

    /// Updates drag progress and, when `rotate` is set, pushes the same value
    /// into the spin phase and requests a redraw in one call.
    pub fn apply_drag_and_rotate(&mut self, percent: f32, rotate: bool) {
        self.set_drag_progress(percent);
        if rotate {
            self.set_spin_phase(percent);
        }
    }

    /// Moves the whole drawable by `delta_y`.
    pub fn translate(&mut self, delta_y: f32) {
        self.top += delta_y;
        self.mark_dirty();
    }

    /// Accepts layout bounds, forcing the height to a fixed share of the width.
    pub fn set_bounds(&mut self, left: i32, top: i32, right: i32, _bottom: i32) -> Bounds {
        let height = (self.viewport_width as f32 * BOUNDS_HEIGHT_RATIO) as i32;
        self.bounds = Bounds { left, top, right, bottom: top + height };
        self.bounds
    }

    pub fn start(&mut self) {
        self.scheduler.start(LoopSpec::spin());
        self.is_spinning = true;
        info!("Refresh spin started");
    }

    pub fn stop(&mut self) {
        self.scheduler.cancel();
        self.is_spinning = false;
        self.set_drag_progress(0.0);
        self.set_spin_phase(0.0);
        info!("Refresh spin stopped");
    }

    /// Frame callback: advances the spin clock by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if let Some(phase) = self.scheduler.advance(dt) {
            trace!("spin phase {:.3}", phase);
            self.set_spin_phase(phase);
        }
    }

    /// Local transform of the arrow bitmap, or `None` before initialization.
    pub fn arrow_transform(&self) -> Option<Matrix3<f32>> {
        if self.viewport_width <= 0 {
            return None;
        }
        let total = self.parent.total_drag_distance();
        let (x, y) = arrow_placement(
            self.arrow_left_offset,
            self.arrow_top_offset,
            total,
            self.arrow_size,
            self.drag_percent,
        );
        let radius = self.arrow_size as f32 / 2.0;
        let degrees = self.rotation();
        Some(math::post_rotate_about(math::translation(x, y), degrees, x + radius, y + radius))
    }

    pub fn render<T: Surface + ?Sized>(&self, surface: &mut T) {
        if self.viewport_width <= 0 {
            return;
        }
        let (Some(arrow), Some(matrix)) = (self.arrow.as_ref(), self.arrow_transform()) else {
            return;
        };
        let total = self.parent.total_drag_distance();

        let saved = surface.save();
        surface.translate(0.0, self.top);
        surface.clip_rect(Rect::new(0.0, -self.top, self.viewport_width as f32, total));
        surface.draw_bitmap(arrow, &matrix);
        surface.restore_to_count(saved);

        trace!(
            "rendered arrow top={} drag={} rot={}",
            self.top,
            self.drag_percent,
            self.rotation()
        );
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.parent.request_redraw();
    }

    /// Returns whether a redraw was requested since the last call, and clears it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // --- accessors ---
    pub fn rotation(&self) -> f32 {
        rotation_degrees(self.is_spinning, self.drag_percent, self.spin_phase)
    }
    pub fn viewport_width(&self) -> i32 { self.viewport_width }
    pub fn arrow_size(&self) -> u32 { self.arrow_size }
    pub fn arrow_left_offset(&self) -> f32 { self.arrow_left_offset }
    pub fn arrow_top_offset(&self) -> f32 { self.arrow_top_offset }
    pub fn top(&self) -> f32 { self.top }
    pub fn drag_percent(&self) -> f32 { self.drag_percent }
    pub fn spin_phase(&self) -> f32 { self.spin_phase }
    pub fn is_spinning(&self) -> bool { self.is_spinning }
    pub fn is_running(&self) -> bool { self.is_spinning }
    pub fn bounds(&self) -> Bounds { self.bounds }
    pub fn arrow(&self) -> Option<&Bitmap> { self.arrow.as_ref() }
    pub fn scheduler(&self) -> &S { &self.scheduler }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assets::BuiltinArrow;
    use crate::core::gfx::RecordingSurface;
    use crate::ui::host::FixedParent;

    fn indicator(parent: &Rc<FixedParent>) -> ArrowIndicator {
        ArrowIndicator::with_ticker(parent.clone(), Box::new(BuiltinArrow), 2.0)
    }

    #[test]
    fn effective_drag_is_identity_up_to_one() {
        for p in [0.0, 0.3, 0.99, 1.0] {
            assert_eq!(effective_drag(p), p);
        }
    }

    #[test]
    fn effective_drag_damps_overpull() {
        assert!((effective_drag(2.0) - 1.1).abs() < 1e-6);
        assert!((effective_drag(1.5) - 1.05).abs() < 1e-6);
    }

    #[test]
    fn effective_drag_matches_damping_formula_exactly() {
        for p in [1.0001, 2.5, 6.001605, 13.37, 19.99] {
            assert_eq!(effective_drag(p), (p + 9.0) / 10.0, "drag {p}");
        }
    }

    #[test]
    fn rotation_follows_state() {
        assert_eq!(rotation_degrees(false, 0.5, 0.7), 0.0);
        assert_eq!(rotation_degrees(false, 1.0, 0.0), 180.0);
        assert_eq!(rotation_degrees(true, 1.0, 0.25), 90.0);
        assert_eq!(rotation_degrees(true, 0.0, 0.0), 0.0);
    }

    #[test]
    fn placement_slides_toward_band_centre() {
        // 240px band, 64px arrow at rest sits just above the bottom of the band
        let rest = arrow_placement(328.0, 176.0, 240.0, 64, 0.0);
        assert_eq!(rest, (328.0, 176.0));
        let armed = arrow_placement(328.0, 176.0, 240.0, 64, 1.0);
        assert_eq!(armed, (328.0, 88.0));
        // centre of the arrow lands on the centre of the band
        assert_eq!(armed.1 + 32.0, 120.0);
    }

    #[test]
    fn placement_damps_overpull() {
        let (x, y) = arrow_placement(328.0, 176.0, 240.0, 64, 2.0);
        assert_eq!(x, 328.0);
        // 176 - 88 * 1.1, not 176 - 88 * 2
        assert!((y - 79.2).abs() < 1e-4, "y = {y}");
    }

    #[test]
    fn density_scales_arrow() {
        assert_eq!(dp_to_px(32.0, 1.0), 32);
        assert_eq!(dp_to_px(32.0, 2.0), 64);
        assert_eq!(dp_to_px(32.0, 1.5), 48);
        assert_eq!(dp_to_px(32.0, 0.0), 1);
    }

    #[test]
    fn initialize_derives_geometry() {
        let parent = Rc::new(FixedParent::new(240.0, 720));
        let mut ind = indicator(&parent);
        ind.initialize(720).unwrap();

        assert_eq!(ind.arrow_size(), 64);
        assert_eq!(ind.arrow_left_offset(), 328.0);
        assert_eq!(ind.arrow_top_offset(), 176.0);
        assert_eq!(ind.top(), -240.0);
        assert_eq!(ind.arrow().map(|b| b.width()), Some(64));
    }

    #[test]
    fn left_offset_uses_whole_pixels() {
        let parent = Rc::new(FixedParent::new(240.0, 0));
        let mut ind = indicator(&parent);
        ind.initialize(201).unwrap();
        assert_eq!(ind.arrow_left_offset(), 68.0);
    }

    #[test]
    fn initialize_ignores_non_positive_width() {
        let parent = Rc::new(FixedParent::new(240.0, 0));
        let mut ind = indicator(&parent);
        ind.initialize(0).unwrap();
        ind.initialize(-3).unwrap();
        assert_eq!(ind.viewport_width(), 0);
        assert!(ind.arrow().is_none());
    }

    #[test]
    fn on_parent_layout_reads_parent_width() {
        let parent = Rc::new(FixedParent::new(240.0, 0));
        let mut ind = indicator(&parent);
        ind.on_parent_layout().unwrap();
        assert_eq!(ind.viewport_width(), 0);

        parent.set_viewport_width(480);
        ind.on_parent_layout().unwrap();
        assert_eq!(ind.viewport_width(), 480);
    }

    #[test]
    fn set_drag_progress_does_not_redraw() {
        let parent = Rc::new(FixedParent::new(240.0, 720));
        let mut ind = indicator(&parent);
        ind.set_drag_progress(0.4);
        assert_eq!(ind.drag_percent(), 0.4);
        assert!(!ind.take_dirty());
        assert_eq!(parent.redraws(), 0);
    }

    #[test]
    fn apply_drag_and_rotate_flag() {
        let parent = Rc::new(FixedParent::new(240.0, 720));
        let mut ind = indicator(&parent);

        ind.apply_drag_and_rotate(0.6, false);
        assert_eq!(ind.drag_percent(), 0.6);
        assert_eq!(ind.spin_phase(), 0.0);
        assert!(!ind.take_dirty());

        ind.apply_drag_and_rotate(0.8, true);
        assert_eq!(ind.drag_percent(), 0.8);
        assert_eq!(ind.spin_phase(), 0.8);
        assert!(ind.take_dirty());
        assert!(!ind.take_dirty());
        assert_eq!(parent.redraws(), 1);
    }

    #[test]
    fn bounds_height_tracks_width() {
        let parent = Rc::new(FixedParent::new(240.0, 200));
        let mut ind = indicator(&parent);
        ind.initialize(200).unwrap();
        let b = ind.set_bounds(0, 0, 100, 100);
        assert_eq!(b.bottom, 130);
        let b = ind.set_bounds(0, -40, 100, 100);
        assert_eq!(b.bottom, 90);
        assert_eq!(ind.bounds(), b);
    }

    #[test]
    fn render_emits_clip_and_draw() {
        let parent = Rc::new(FixedParent::new(240.0, 720));
        let mut ind = indicator(&parent);
        ind.initialize(720).unwrap();
        ind.translate(100.0);

        let mut surface = RecordingSurface::new();
        ind.render(&mut surface);

        let draws: Vec<_> = surface.draws().collect();
        assert_eq!(draws.len(), 1);
        // band translated to -140, window [140, 240] of the band visible at [0, 100]
        assert_eq!(draws[0].clip, Some(Rect::new(0.0, 0.0, 720.0, 100.0)));
        assert_eq!(draws[0].transform[0][2], 328.0);
        assert_eq!(draws[0].transform[1][2], 176.0 - 140.0);
        assert_eq!(surface.state().depth(), 1);
    }
}
