use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use spectra_stack::color::to_rgb8;
use spectra_stack::state::Session;

// ---------------------------------------------------------------------------
// Stacked spectra plot (central panel)
// ---------------------------------------------------------------------------

/// Render the offset-stacked channels in the central panel.
pub fn stacked_plot(ui: &mut Ui, session: &Session) {
    if !session.dataset.is_loaded() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a data file to view spectra  (File → Open…)");
        });
        return;
    }

    Plot::new("stacked_plot")
        .legend(Legend::default())
        .x_axis_label("Wavenumber (cm⁻¹)")
        .y_axis_label("Optical Depth")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for trace in &session.traces {
                let color = session
                    .colors
                    .get(trace.channel)
                    .map(|&c| {
                        let [r, g, b] = to_rgb8(c);
                        Color32::from_rgb(r, g, b)
                    })
                    .unwrap_or(Color32::LIGHT_BLUE);

                let points: PlotPoints = trace.points.iter().copied().collect();
                let line = Line::new(points)
                    .name(format!("channel {}", trace.channel + 1))
                    .color(color)
                    .width(1.5);

                plot_ui.line(line);
            }
        });
}
