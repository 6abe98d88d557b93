mod app;
mod color;
mod config;
mod dashboard;
mod data;
mod error;
mod state;
mod ui;

use app::SicoinApp;
use config::AppConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("configuration error: {e:#}");
            eprintln!("Error crítico: {e:#}");
            std::process::exit(1);
        }
    };
    log::info!(
        "starting dashboard, data_dir={}, refresh every {}s",
        config.data_dir.display(),
        config.refresh_secs
    );

    let app = match SicoinApp::new(config) {
        Ok(app) => app,
        Err(e) => {
            log::error!("startup failed: {e:#}");
            eprintln!("Error crítico: {e:#}");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SICOIN – Control Interno Institucional",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}
