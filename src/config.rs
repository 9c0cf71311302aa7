use configparser::ini::Ini;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

// Indicator geometry
pub const ARROW_SIZE_DP: f32 = 32.0; // Logical arrow edge, scaled by density
pub const BOUNDS_HEIGHT_RATIO: f32 = 0.65; // Visible height relative to viewport width
pub const OVERPULL_DAMPING: f32 = 10.0; // Past 1.0, extra pull moves the arrow 1/10th as far
pub const OVERPULL_OFFSET: f32 = 9.0; // Keeps the damped curve continuous at 1.0
pub const ARMED_ROTATION_DEG: f32 = 180.0;
pub const FULL_TURN_DEG: f32 = 360.0;

// Spin animation
pub const SPIN_PERIOD: Duration = Duration::from_millis(80);

// Built-in arrow asset
pub const BUILTIN_ARROW_PX: u32 = 96;
pub const BUILTIN_ARROW_COLOR: [u8; 4] = [0x5c, 0x5c, 0x5c, 0xff];

// Settings file
pub const DEFAULT_SETTINGS_PATH: &str = "arrow_refresh.ini";
const INDICATOR_SECTION: &str = "indicator";
const DEMO_SECTION: &str = "demo";

/// Runtime configuration for the indicator and the demo driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Pixels per density-independent unit.
    pub density: f32,
    pub total_drag_distance: f32,
    pub viewport_width: i32,
    /// Arrow image on disk; the built-in arrow is drawn when unset.
    pub arrow_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub pull_frames: u32,
    pub spin_frames: u32,
    /// Seconds per simulated frame.
    pub frame_dt: f32,
    /// Drag percent reached at the end of the simulated pull.
    pub max_pull: f32,
    pub trace: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            density: 2.0,
            total_drag_distance: 240.0,
            viewport_width: 720,
            arrow_path: None,
            output_dir: PathBuf::from("frames"),
            pull_frames: 30,
            spin_frames: 24,
            frame_dt: 1.0 / 60.0,
            max_pull: 1.3,
            trace: false,
        }
    }
}

impl Settings {
    /// Loads settings from an INI file. A missing or unreadable file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Settings file '{}' not found, using defaults.", path.display());
            return Self::default();
        }

        let mut conf = Ini::new();
        match conf.load(path) {
            Ok(_) => {
                info!("Loaded settings from '{}'.", path.display());
                Self::from_ini(&conf)
            }
            Err(e) => {
                warn!("Failed to load '{}': {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parses settings from INI text. Only a syntactically broken document is an error.
    pub fn from_ini_str(text: &str) -> Result<Self, String> {
        let mut conf = Ini::new();
        conf.read(text.to_string())?;
        Ok(Self::from_ini(&conf))
    }

    fn from_ini(conf: &Ini) -> Self {
        let d = Self::default();

        let density = read_f32(conf, INDICATOR_SECTION, "density")
            .filter(|v| *v > 0.0)
            .unwrap_or(d.density);
        let total_drag_distance = read_f32(conf, INDICATOR_SECTION, "total_drag_distance")
            .filter(|v| *v > 0.0)
            .unwrap_or(d.total_drag_distance);
        let viewport_width = match conf.getint(INDICATOR_SECTION, "viewport_width") {
            Ok(Some(v)) => i32::try_from(v).unwrap_or(d.viewport_width),
            Ok(None) => d.viewport_width,
            Err(e) => {
                warn!("Invalid [{}] viewport_width: {}", INDICATOR_SECTION, e);
                d.viewport_width
            }
        };
        let arrow_path = conf
            .get(INDICATOR_SECTION, "arrow_path")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let output_dir = conf
            .get(DEMO_SECTION, "output_dir")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(d.output_dir);
        let pull_frames = read_u32(conf, DEMO_SECTION, "pull_frames").unwrap_or(d.pull_frames);
        let spin_frames = read_u32(conf, DEMO_SECTION, "spin_frames").unwrap_or(d.spin_frames);
        let frame_dt = read_f32(conf, DEMO_SECTION, "frame_dt")
            .filter(|v| *v > 0.0)
            .unwrap_or(d.frame_dt);
        let max_pull = read_f32(conf, DEMO_SECTION, "max_pull")
            .filter(|v| *v >= 0.0)
            .unwrap_or(d.max_pull);
        let trace = match conf.getbool(DEMO_SECTION, "trace") {
            Ok(v) => v.unwrap_or(d.trace),
            Err(e) => {
                warn!("Invalid [{}] trace: {}", DEMO_SECTION, e);
                d.trace
            }
        };

        Self {
            density,
            total_drag_distance,
            viewport_width,
            arrow_path,
            output_dir,
            pull_frames,
            spin_frames,
            frame_dt,
            max_pull,
            trace,
        }
    }
}

fn read_f32(conf: &Ini, section: &str, key: &str) -> Option<f32> {
    match conf.getfloat(section, key) {
        Ok(v) => v.map(|f| f as f32),
        Err(e) => {
            warn!("Invalid [{}] {}: {}", section, key, e);
            None
        }
    }
}

fn read_u32(conf: &Ini, section: &str, key: &str) -> Option<u32> {
    match conf.getuint(section, key) {
        Ok(v) => v.and_then(|n| u32::try_from(n).ok()),
        Err(e) => {
            warn!("Invalid [{}] {}: {}", section, key, e);
            None
        }
    }
}
