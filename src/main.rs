mod app;
mod ui;

use app::SpectraStackApp;
use eframe::egui;
use spectra_stack::config::Settings;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::discover().unwrap_or_else(|e| {
        log::error!("{e:#}; using default settings");
        Settings::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Spectra Stack – IR Line Viewer",
        options,
        Box::new(move |_cc| Ok(Box::new(SpectraStackApp::new(&settings)))),
    )
}
