use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    let neighborhoods: Vec<String> = dataset
        .categories("Neighborhood")
        .iter()
        .map(|v| v.to_string())
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year slider (quality box plot) ----
            if let Some((lo, hi)) = state.year_range {
                ui.strong("Built in or before");
                let mut year = state.filter.max_year_built.unwrap_or(hi);
                let slider = egui::Slider::new(&mut year, lo..=hi).step_by(1.0);
                if ui.add(slider).changed() {
                    state.set_max_year_built(year);
                }
                ui.separator();
            }

            // ---- Neighbourhood multi-select (scatter plot) ----
            let n_selected = state.filter.neighborhoods.len();
            let header_text = if n_selected == 0 {
                format!("Neighborhood  (all {})", neighborhoods.len())
            } else {
                format!("Neighborhood  ({n_selected}/{})", neighborhoods.len())
            };

            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("neighborhood_filter")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    if ui.small_button("All").clicked() {
                        state.clear_neighborhoods();
                    }
                    for code in &neighborhoods {
                        let mut checked = state.filter.neighborhoods.contains(code);
                        if ui.checkbox(&mut checked, code.as_str()).changed() {
                            state.toggle_neighborhood(code);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} sales loaded, {} columns",
                ds.len(),
                ds.column_names.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open housing data")
        .add_filter("Supported files", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
