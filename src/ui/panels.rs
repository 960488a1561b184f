use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Left side panel – channel toggles
// ---------------------------------------------------------------------------

/// Render the left panel with one checkbox per series.
pub fn side_panel(ui: &mut Ui, state: &mut ViewerState) {
    ui.heading("Channels");
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.show_all();
        }
        if ui.small_button("None").clicked() {
            state.hide_all();
        }
    });

    let mut toggled = None;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (i, series) in state.plot.series.iter().enumerate() {
                let mut checked = state.visible[i];
                let text = RichText::new(&series.label).color(series.color.to_egui());
                if ui.checkbox(&mut checked, text).changed() {
                    toggled = Some(i);
                }
            }
        });

    if let Some(i) = toggled {
        state.toggle(i);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Save image…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} rows, {} of {} channels shown",
            state.plot.timestamps.len(),
            state.visible_indices().len(),
            state.plot.series.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(state: &mut ViewerState) {
    let file = rfd::FileDialog::new()
        .set_title("Save plot image")
        .add_filter("PNG", &["png"])
        .add_filter("JPEG", &["jpg", "jpeg"])
        .set_file_name(format!("{}.png", state.plot.title))
        .save_file();

    if let Some(path) = file {
        state.save_image(&path);
    }
}
