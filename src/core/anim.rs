// src/core/anim.rs
//! Looping time source for the refresh spin.
//!
//! The host drives everything cooperatively: once per frame it calls
//! [`SpinScheduler::advance`] with the frame delta and receives the linear,
//! interpolated time of the current cycle (or `None` when nothing runs).
//!
//! ```ignore
//! let mut ticker = LoopTicker::new();
//! ticker.start(LoopSpec::spin());
//! // each frame
//! if let Some(t) = ticker.advance(dt) {
//!     indicator.set_spin_phase(t);
//! }
//! ```
use crate::config::SPIN_PERIOD;
use std::time::Duration;

const MAX_CYCLE_FRACTION: f32 = 1.0 - f32::EPSILON;

/// A linear loop that restarts every `period` until cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopSpec {
    pub period: Duration,
}

impl LoopSpec {
    /// Steady unaccelerated rotation.
    pub fn spin() -> Self {
        Self { period: SPIN_PERIOD }
    }
}

/// A cooperative repeating-animation clock.
pub trait SpinScheduler {
    /// (Re)starts the loop from time zero.
    fn start(&mut self, spec: LoopSpec);
    fn cancel(&mut self);
    fn is_active(&self) -> bool;
    /// Advances by `dt` seconds and returns the interpolated time of the current cycle.
    fn advance(&mut self, dt: f32) -> Option<f32>;
}

/// Default [`SpinScheduler`], accumulating elapsed seconds.
#[derive(Clone, Debug, Default)]
pub struct LoopTicker {
    spec: Option<LoopSpec>,
    elapsed: f64,
}

impl LoopTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    fn sample(spec: &LoopSpec, elapsed: f64) -> f32 {
        let period = spec.period.as_secs_f64();
        if period <= 0.0 {
            return 0.0;
        }
        let cycle = (elapsed / period).floor();
        // f64 -> f32 may round a fraction just under 1.0 up to 1.0
        (((elapsed - cycle * period) / period) as f32).min(MAX_CYCLE_FRACTION)
    }
}

impl SpinScheduler for LoopTicker {
    fn start(&mut self, spec: LoopSpec) {
        self.spec = Some(spec);
        self.elapsed = 0.0;
    }

    fn cancel(&mut self) {
        self.spec = None;
        self.elapsed = 0.0;
    }

    fn is_active(&self) -> bool {
        self.spec.is_some()
    }

    fn advance(&mut self, dt: f32) -> Option<f32> {
        let spec = self.spec?;
        self.elapsed += dt.max(0.0) as f64;
        Some(Self::sample(&spec, self.elapsed))
    }
}
