use eframe::egui::{self, Color32, RichText, ScrollArea, Sense, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::status_color;
use crate::state::AppState;
use crate::ui::plot;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Bottom panel – filtered property table
// ---------------------------------------------------------------------------

/// Tabular view of the filtered properties. Clicking a row selects it.
pub fn property_table(ui: &mut Ui, state: &mut AppState) {
    ui.strong(format!("Filtered properties ({})", state.view.len()));

    let Some(dataset) = state.dataset.clone() else {
        return;
    };
    let mut clicked: Option<usize> = None;
    {
        let rows = &state.view.indices;
        let selected = state.selected;

        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .sense(Sense::click())
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::initial(220.0).at_least(120.0).clip(true))
            .column(Column::initial(140.0).clip(true))
            .column(Column::initial(130.0))
            .column(Column::initial(80.0))
            .column(Column::initial(90.0))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                for title in [
                    "Property",
                    "District / Town",
                    "Primary commodity",
                    "Status",
                    "Distance",
                    "Travel time",
                ] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    let index = rows[row.index()];
                    let p = &dataset.properties[index];
                    row.set_selected(selected == Some(index));

                    row.col(|ui: &mut Ui| {
                        let label = if p.coordinates_questionable {
                            format!("⚠ {}", p.name)
                        } else {
                            p.name.clone()
                        };
                        ui.label(label);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(p.town.as_deref().unwrap_or(&p.district));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(&p.primary_commodity);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(RichText::new(p.status.as_str()).color(status_color(p.status)));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.0} km", p.distance_from_base_km));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.1} hrs", p.travel_time_hours));
                    });

                    if row.response().clicked() {
                        clicked = Some(index);
                    }
                });
            });
    }

    if let Some(index) = clicked {
        let _ = state.select_row(index);
    }
}

// ---------------------------------------------------------------------------
// Right side panel – selected property detail
// ---------------------------------------------------------------------------

/// Detail card and route mini-map for the selected property.
pub fn detail_panel(ui: &mut Ui, state: &mut AppState) {
    let mut clear = false;

    match state.selected_detail() {
        None => {
            ui.heading("Property details");
            ui.separator();
            ui.label("Select a property on the map or in the table.");
        }
        Some(detail) => {
            let p = detail.property;
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    ui.heading(&p.name);
                    ui.label(format!("{}, {}", p.district, p.province));
                    ui.separator();

                    ui.strong("Logistics");
                    egui::Grid::new("logistics")
                        .num_columns(2)
                        .show(ui, |ui: &mut Ui| {
                            ui.label("From");
                            ui.label(&detail.base_name);
                            ui.end_row();
                            ui.label("Distance");
                            ui.label(format!("{:.1} km", detail.distance_km));
                            ui.end_row();
                            ui.label("Travel time");
                            ui.label(format!("{:.1} hrs", detail.travel_time_hours))
                                .on_hover_text(format!(
                                    "Straight-line distance at an average road speed of {:.0} km/h",
                                    state.config.average_speed_kmh
                                ));
                            ui.end_row();
                            ui.label("Coordinates");
                            ui.label(format!("{:.4}, {:.4}", p.latitude, p.longitude));
                            ui.end_row();
                        });

                    if p.coordinates_questionable {
                        ui.label(
                            RichText::new("⚠ Coordinates are questionable; verify before planning a visit.")
                                .color(Color32::from_rgb(230, 160, 0)),
                        );
                    }
                    ui.separator();

                    ui.strong("Status");
                    ui.label(RichText::new(p.status.as_str()).color(status_color(p.status)));
                    if let Some(reserves) = &p.reserves {
                        ui.label(format!("Reserves: {reserves}"));
                    }
                    ui.separator();

                    ui.strong("Commodities");
                    egui::Grid::new("commodities")
                        .num_columns(2)
                        .show(ui, |ui: &mut Ui| {
                            for (label, value) in detail.commodity_rows() {
                                ui.label(label);
                                ui.label(value);
                                ui.end_row();
                            }
                        });

                    if p.geology_classification.is_some() || p.geology_description.is_some() {
                        ui.separator();
                        ui.strong("Geology");
                        if let Some(class) = &p.geology_classification {
                            ui.label(class);
                        }
                        if let Some(desc) = &p.geology_description {
                            ui.label(RichText::new(desc).small());
                        }
                    }

                    ui.separator();
                    ui.strong("Route");
                    plot::route_map(ui, &detail);

                    ui.add_space(6.0);
                    if ui.button("Clear selection").clicked() {
                        clear = true;
                    }
                });
        }
    }

    if clear {
        state.clear_selection();
    }
}
