use eframe::egui;
use spectra_stack::config::Settings;
use spectra_stack::state::Session;

use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SpectraStackApp {
    pub session: Session,
}

impl SpectraStackApp {
    pub fn new(settings: &Settings) -> Self {
        Self {
            session: Session::from_settings(settings),
        }
    }
}

impl eframe::App for SpectraStackApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.session);
        });

        // ---- Left side panel: processing controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.session);
            });

        // ---- Central panel: stacked plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::stacked_plot(ui, &self.session);
        });
    }
}
