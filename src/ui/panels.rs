use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use spectra_stack::color::Palette;
use spectra_stack::processing::SmoothingConfig;
use spectra_stack::state::Session;

/// Smoothing methods offered in the combo box, with their starting parameters.
const SMOOTHING_CHOICES: [SmoothingConfig; 4] = [
    SmoothingConfig::None,
    SmoothingConfig::SavitzkyGolay {
        window: 11,
        polynomial_order: 2,
    },
    SmoothingConfig::Gaussian { sigma: 2.0 },
    SmoothingConfig::MovingAverage { window: 5 },
];

// ---------------------------------------------------------------------------
// Left side panel – processing controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, session: &mut Session) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            data_section(ui, session);
            ui.separator();
            offset_section(ui, session);
            ui.separator();
            color_section(ui, session);
            ui.separator();

            let loaded = session.dataset.is_loaded();
            ui.add_enabled_ui(loaded, |ui: &mut Ui| {
                baseline_section(ui, session);
                ui.separator();
                smoothing_section(ui, session);
                ui.separator();

                let undo = ui.add_enabled(session.dataset.has_snapshot(), egui::Button::new("Undo"));
                if undo.clicked() {
                    session.undo();
                }
            });
        });
}

fn data_section(ui: &mut Ui, session: &mut Session) {
    ui.strong("Data");
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Select File…").clicked() {
            open_file_dialog(session);
        }
        let append = ui.add_enabled(session.dataset.is_loaded(), egui::Button::new("Append…"));
        if append.clicked() {
            append_file_dialog(session);
        }
    });

    for source in session.dataset.sources() {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        ui.label(RichText::new(name).small());
    }
}

fn offset_section(ui: &mut Ui, session: &mut Session) {
    ui.strong("Offset");
    let mut offset = session.offset;
    let response = ui.add(egui::DragValue::new(&mut offset).speed(0.005).max_decimals(4));
    if response.changed() {
        session.set_offset(offset);
    }
}

fn color_section(ui: &mut Ui, session: &mut Session) {
    ui.strong("Colors");
    let current = session.palette;
    egui::ComboBox::from_id_salt("palette")
        .selected_text(current.name())
        .show_ui(ui, |ui: &mut Ui| {
            for palette in Palette::ALL {
                if ui.selectable_label(current == palette, palette.name()).clicked() {
                    session.apply_palette(palette);
                }
            }
        });
}

fn baseline_section(ui: &mut Ui, session: &mut Session) {
    ui.strong("Baseline");
    ui.label(RichText::new("Anchor positions, comma separated").small());
    ui.text_edit_singleline(&mut session.anchor_text);
    if ui.button("Apply baseline").clicked() {
        let anchors = session.anchor_text.clone();
        if let Err(e) = session.apply_baseline(&anchors) {
            log::debug!("baseline rejected: {e}");
        }
    }
}

fn smoothing_section(ui: &mut Ui, session: &mut Session) {
    ui.strong("Smoothing");
    let selected = session.smoothing.method_name();
    egui::ComboBox::from_id_salt("smoothing")
        .selected_text(selected)
        .show_ui(ui, |ui: &mut Ui| {
            for choice in SMOOTHING_CHOICES {
                let name = choice.method_name();
                if ui.selectable_label(selected == name, name).clicked() && selected != name {
                    session.smoothing = choice;
                }
            }
        });

    match &mut session.smoothing {
        SmoothingConfig::None => {}
        SmoothingConfig::SavitzkyGolay {
            window,
            polynomial_order,
        } => {
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Window");
                ui.add(egui::DragValue::new(window).range(3..=501));
                ui.label("Order");
                ui.add(egui::DragValue::new(polynomial_order).range(0..=6));
            });
        }
        SmoothingConfig::Gaussian { sigma } => {
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Sigma");
                ui.add(egui::DragValue::new(sigma).speed(0.1).range(0.0..=100.0));
            });
        }
        SmoothingConfig::MovingAverage { window } => {
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Window");
                ui.add(egui::DragValue::new(window).range(1..=501));
            });
        }
    }

    if ui.button("Apply smoothing").clicked() {
        let config = session.smoothing;
        if let Err(e) = session.apply_smoothing(config) {
            log::debug!("smoothing rejected: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, session: &mut Session) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(session);
                ui.close_menu();
            }
            if ui
                .add_enabled(session.dataset.is_loaded(), egui::Button::new("Append…"))
                .clicked()
            {
                append_file_dialog(session);
                ui.close_menu();
            }
        });

        ui.separator();

        if session.dataset.is_loaded() {
            ui.label(format!(
                "{} channels, {} rows",
                session.dataset.channel_count(),
                session.dataset.rows()
            ));
            ui.separator();
        }

        if let Some(status) = &session.status {
            let text = RichText::new(status.text());
            let text = if status.is_error() {
                text.color(Color32::RED)
            } else {
                text
            };
            ui.label(text);
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn pick_data_file(title: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Data files", &["dat", "txt", "csv", "tsv"])
        .add_filter("All files", &["*"])
        .pick_file()
}

pub fn open_file_dialog(session: &mut Session) {
    match pick_data_file("Open spectral data") {
        Some(path) => {
            if let Err(e) = session.load_file(&path) {
                log::debug!("load rejected: {e}");
            }
        }
        None => session.no_file_selected(),
    }
}

pub fn append_file_dialog(session: &mut Session) {
    match pick_data_file("Append spectral data") {
        Some(path) => {
            if let Err(e) = session.append_file(&path) {
                log::debug!("append rejected: {e}");
            }
        }
        None => session.no_file_selected(),
    }
}
