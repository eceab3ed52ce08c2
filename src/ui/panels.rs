use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::ColorBy;
use crate::data::model::Status;
use crate::state::AppState;

const ALL: &str = "All";

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Combo box over `Option<String>` with an "All" entry for `None`.
/// Returns the new value when the user picked something.
fn option_combo<'a>(
    ui: &mut Ui,
    id: &str,
    current: Option<&str>,
    choices: impl Iterator<Item = &'a String>,
) -> Option<Option<String>> {
    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.unwrap_or(ALL))
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_none(), ALL).clicked() {
                picked = Some(None);
            }
            for choice in choices {
                let is_current = current == Some(choice.as_str());
                if ui.selectable_label(is_current, choice.as_str()).clicked() {
                    picked = Some(Some(choice.clone()));
                }
            }
        });
    picked
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🗺 Filter Properties");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };
    let universe = &dataset.universe;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Province ----
            ui.strong("Province");
            let current = state.criteria.province.clone();
            if let Some(v) = option_combo(ui, "province", current.as_deref(), universe.provinces.iter()) {
                state.set_province(v);
            }
            ui.add_space(4.0);

            // ---- District (only offered within a province) ----
            if let Some(province) = state.criteria.province.clone() {
                ui.strong("District");
                let current = state.criteria.district.clone();
                if let Some(v) = option_combo(
                    ui,
                    "district",
                    current.as_deref(),
                    universe.districts_of(&province),
                ) {
                    state.set_district(v);
                }
                ui.add_space(4.0);
            }

            // ---- Commodity ----
            ui.strong("Commodity");
            let current = state.criteria.commodity.clone();
            if let Some(v) = option_combo(ui, "commodity", current.as_deref(), universe.commodities.iter()) {
                state.set_commodity(v);
            }
            ui.label(RichText::new("Matches primary or secondary commodities").small().weak());
            ui.add_space(4.0);

            // ---- Status ----
            ui.strong("Status");
            let current = state.criteria.status;
            egui::ComboBox::from_id_salt("status")
                .selected_text(current.map(|s| s.as_str()).unwrap_or(ALL))
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    if ui.selectable_label(current.is_none(), ALL).clicked() {
                        state.set_status(None);
                    }
                    for status in Status::ALL {
                        if ui
                            .selectable_label(current == Some(status), status.as_str())
                            .clicked()
                        {
                            state.set_status(Some(status));
                        }
                    }
                });
            ui.add_space(4.0);

            // ---- Distance ----
            ui.strong(format!("Max distance from {}", short_base_name(&state.config.base.name)));
            let max = universe.max_distance_km.ceil().max(1.0);
            let mut value = state.criteria.max_distance_km.unwrap_or(max);
            let slider = egui::Slider::new(&mut value, 0.0..=max)
                .suffix(" km")
                .step_by(1.0);
            if ui.add(slider).changed() {
                state.set_max_distance(Some(value));
            }
            ui.add_space(4.0);

            // ---- Coordinate quality ----
            let mut exclude = state.criteria.exclude_questionable;
            let label = format!(
                "Hide questionable coordinates ({})",
                dataset.questionable_count()
            );
            if ui.checkbox(&mut exclude, label).changed() {
                state.set_exclude_questionable(exclude);
            }

            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.clear_filters();
            }

            ui.separator();

            // ---- Colour-by selector ----
            ui.strong("Color map by");
            let current = state.color_by;
            egui::ComboBox::from_id_salt("color_by")
                .selected_text(current.label())
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for dim in ColorBy::ALL {
                        if ui.selectable_label(current == dim, dim.label()).clicked() {
                            state.set_color_by(dim);
                        }
                    }
                });

            if let Some(cm) = &state.color_map {
                ui.add_space(4.0);
                for (label, color) in cm.legend_entries() {
                    ui.label(RichText::new(format!("● {label}")).color(color));
                }
            }
        });
}

fn short_base_name(name: &str) -> &str {
    name.split(" (").next().unwrap_or(name)
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
        ui.label(RichText::new("Mining Site Assessment Planner").strong());
        ui.label(format!("Base of operations: {}", state.config.base.name));

        ui.separator();

        if let Some(ds) = &state.dataset {
            let shown = if state.view.is_filtered() {
                format!("{} of {} properties match", state.view.len(), ds.len())
            } else {
                format!("{} properties loaded", ds.len())
            };
            ui.label(shown);
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
        .set_title("Open property table")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        // Errors are already logged and shown in the status line.
        if state.load_path(&path).is_ok() {
            log::info!("Opened {}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_drops_parenthetical() {
        assert_eq!(short_base_name("Chingola (Base of Operations)"), "Chingola");
        assert_eq!(short_base_name("Kitwe"), "Kitwe");
    }
}
