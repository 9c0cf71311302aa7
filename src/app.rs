use crate::config::Settings;
use crate::core::assets;
use crate::core::gfx::{Op, RasterSurface, RecordingSurface};
use crate::ui::components::ArrowIndicator;
use crate::ui::host::FixedParent;
use log::{debug, info};
use serde::Serialize;
use std::{error::Error, fs, path::PathBuf, rc::Rc};

const BACKGROUND: [u8; 4] = [0xf5, 0xf5, 0xf5, 0xff];

/* -------------------- gesture script -------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Pulling { frame: u32 },
    Spinning { frame: u32 },
    Releasing { frame: u32 },
    Done,
}

#[derive(Debug, Serialize)]
struct FrameTrace {
    index: u32,
    #[serde(flatten)]
    phase: Phase,
    ops: Vec<Op>,
}

/// Drives an indicator through pull, refresh and release, writing every frame.
pub struct App {
    settings: Settings,
    parent: Rc<FixedParent>,
    indicator: ArrowIndicator,
    raster: RasterSurface,
    recorder: Option<RecordingSurface>,
    phase: Phase,
    pulled: f32,
    frames_written: u32,
    trace: Vec<FrameTrace>,
}

impl App {
    pub fn new(settings: Settings) -> Result<Self, Box<dyn Error>> {
        // The width is unknown until "layout" below, like a freshly created view.
        let parent = Rc::new(FixedParent::new(settings.total_drag_distance, 0));
        let source = assets::source_for(settings.arrow_path.as_deref());
        let mut indicator = ArrowIndicator::with_ticker(parent.clone(), source, settings.density);

        parent.set_viewport_width(settings.viewport_width);
        indicator.on_parent_layout()?;
        let width = settings.viewport_width;
        let bounds = indicator.set_bounds(0, 0, width, 0);
        if width <= 0 || bounds.height() <= 0 {
            return Err(format!("Viewport {}px too small to render", width).into());
        }
        info!("Surface {}x{}", width, bounds.height());

        let raster = RasterSurface::new(width as u32, bounds.height() as u32);
        let recorder = settings.trace.then(RecordingSurface::new);

        Ok(Self {
            settings,
            parent,
            indicator,
            raster,
            recorder,
            phase: Phase::Pulling { frame: 0 },
            pulled: 0.0,
            frames_written: 0,
            trace: Vec::new(),
        })
    }

    pub fn indicator(&self) -> &ArrowIndicator {
        &self.indicator
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn release_frames(&self) -> u32 {
        (self.settings.pull_frames / 2).max(1)
    }

    /// Moves the drag band so `pulled` pixels of it are visible.
    fn pull_to(&mut self, pulled: f32) {
        let delta = pulled - self.pulled;
        if delta != 0.0 {
            self.indicator.translate(delta);
            self.pulled = pulled;
        }
    }

    /// Applies one frame of the script and returns the phase that was rendered.
    pub fn step(&mut self) -> Phase {
        let total = self.settings.total_drag_distance;
        let current = self.phase;

        self.phase = match current {
            Phase::Pulling { frame } => {
                let frames = self.settings.pull_frames.max(1);
                let percent = self.settings.max_pull * (frame + 1) as f32 / frames as f32;
                self.indicator.set_drag_progress(percent);
                self.pull_to(total * percent.min(1.0));
                if frame + 1 >= frames {
                    self.indicator.start();
                    Phase::Spinning { frame: 0 }
                } else {
                    Phase::Pulling { frame: frame + 1 }
                }
            }
            Phase::Spinning { frame } => {
                self.indicator.tick(self.settings.frame_dt);
                if frame + 1 >= self.settings.spin_frames {
                    self.indicator.stop();
                    Phase::Releasing { frame: 0 }
                } else {
                    Phase::Spinning { frame: frame + 1 }
                }
            }
            Phase::Releasing { frame } => {
                let frames = self.release_frames();
                let remaining = 1.0 - (frame + 1) as f32 / frames as f32;
                self.pull_to(total * remaining.max(0.0));
                if frame + 1 >= frames {
                    Phase::Done
                } else {
                    Phase::Releasing { frame: frame + 1 }
                }
            }
            Phase::Done => Phase::Done,
        };

        let redraw = self.indicator.take_dirty();
        debug!("{:?} -> {:?} (redraw={})", current, self.phase, redraw);
        current
    }

    fn render_frame(&mut self, index: u32, phase: Phase) -> Result<(), Box<dyn Error>> {
        self.raster.begin_frame(BACKGROUND);
        self.indicator.render(&mut self.raster);
        let path = self.settings.output_dir.join(format!("frame_{:04}.png", index));
        self.raster.save_png(&path)?;
        self.frames_written += 1;

        if let Some(recorder) = self.recorder.as_mut() {
            self.indicator.render(recorder);
            self.trace.push(FrameTrace { index, phase, ops: recorder.take_ops() });
        }
        Ok(())
    }

    /// Runs the whole script. Returns the number of frames written.
    pub fn run(mut self) -> Result<u32, Box<dyn Error>> {
        fs::create_dir_all(&self.settings.output_dir)
            .map_err(|e| format!("Failed to create {:?}: {}", self.settings.output_dir, e))?;
        info!("Writing frames to {:?}", self.settings.output_dir);

        let mut index = 0;
        while self.phase != Phase::Done {
            let phase = self.step();
            self.render_frame(index, phase)?;
            index += 1;
        }

        if self.recorder.is_some() {
            let path: PathBuf = self.settings.output_dir.join("trace.json");
            let file = fs::File::create(&path)
                .map_err(|e| format!("Failed to create {:?}: {}", path, e))?;
            serde_json::to_writer_pretty(file, &self.trace)?;
            info!("Wrote draw trace to {:?}", path);
        }

        info!(
            "Finished: {} frames, {} redraw requests",
            self.frames_written,
            self.parent.redraws()
        );
        Ok(self.frames_written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(dir: &std::path::Path) -> Settings {
        Settings {
            output_dir: dir.to_path_buf(),
            viewport_width: 120,
            total_drag_distance: 80.0,
            density: 1.0,
            pull_frames: 4,
            spin_frames: 3,
            max_pull: 1.2,
            ..Settings::default()
        }
    }

    #[test]
    fn script_walks_every_phase() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(settings(dir.path())).unwrap();

        for frame in 0..4 {
            assert_eq!(app.step(), Phase::Pulling { frame });
        }
        assert!(app.indicator().is_spinning());
        assert!(app.indicator().top().abs() < 1e-3);

        for frame in 0..3 {
            assert_eq!(app.step(), Phase::Spinning { frame });
        }
        assert!(!app.indicator().is_spinning());
        assert_eq!(app.indicator().drag_percent(), 0.0);

        assert_eq!(app.step(), Phase::Releasing { frame: 0 });
        assert_eq!(app.step(), Phase::Releasing { frame: 1 });
        assert_eq!(app.phase(), Phase::Done);
        assert!((app.indicator().top() + 80.0).abs() < 1e-3);
    }

    #[test]
    fn run_writes_frames_and_trace() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings { trace: true, ..settings(dir.path()) };
        let written = App::new(s).unwrap().run().unwrap();

        assert_eq!(written, 4 + 3 + 2);
        assert!(dir.path().join("frame_0000.png").exists());
        assert!(dir.path().join("frame_0008.png").exists());

        let text = std::fs::read_to_string(dir.path().join("trace.json")).unwrap();
        let trace: serde_json::Value = serde_json::from_str(&text).unwrap();
        let frames = trace.as_array().unwrap();
        assert_eq!(frames.len(), 9);
        assert_eq!(frames[0]["phase"], "pulling");
        assert_eq!(frames[4]["phase"], "spinning");
    }

    #[test]
    fn zero_width_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings { viewport_width: 0, ..settings(dir.path()) };
        assert!(App::new(s).is_err());
    }
}
