use arrow_refresh::app::App;
use arrow_refresh::config::{Settings, DEFAULT_SETTINGS_PATH};
use log::{error, info, LevelFilter};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // --- Logging Setup ---
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info) // Default level
        .filter_module("arrow_refresh::core::gfx", LevelFilter::Warn)
        .filter_module("arrow_refresh::ui::components", LevelFilter::Info)
        .init();

    info!("Application starting...");

    // --- Settings ---
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let settings = Settings::load(&path);

    // --- Application Creation ---
    let app = match App::new(settings) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            return Err(e);
        }
    };

    // --- Run Application ---
    match app.run() {
        Ok(frames) => info!("Application exited gracefully after {} frames.", frames),
        Err(e) => {
            error!("Application exited with error: {}", e);
            return Err(e);
        }
    }
    Ok(())
}
