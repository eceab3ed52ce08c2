use eframe::egui::{self, Color32, ProgressBar, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, MarkerShape, Plot, PlotPoint, PlotPoints, Points};

use crate::color::{status_color, ColorBy};
use crate::data::detail::PropertyDetail;
use crate::state::AppState;

/// Screen distance (points) within which a click picks a map marker.
const PICK_RADIUS: f32 = 8.0;

const BASE_COLOR: Color32 = Color32::from_rgb(0, 200, 0);
const SITE_COLOR: Color32 = Color32::from_rgb(230, 0, 0);

// ---------------------------------------------------------------------------
// Central panel: overview map + charts
// ---------------------------------------------------------------------------

/// Render the overview map and the four chart panels.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a property table to begin  (File → Open…)");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(format!("Property map ({} sites)", state.view.len()));
            overview_map(ui, state);
            ui.add_space(8.0);

            ui.columns(2, |cols: &mut [Ui]| {
                commodity_chart(&mut cols[0], state);
                status_chart(&mut cols[1], state);
            });
            ui.add_space(8.0);
            ui.columns(2, |cols: &mut [Ui]| {
                province_chart(&mut cols[0], state);
                distance_chart(&mut cols[1], state);
            });
        });
}

// ---------------------------------------------------------------------------
// Overview map
// ---------------------------------------------------------------------------

fn overview_map(ui: &mut Ui, state: &mut AppState) {
    let base = state.config.base.coordinates();
    let selected = state.selected;

    let response = Plot::new("overview_map")
        .legend(Legend::default())
        .data_aspect(1.0)
        .height(380.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            if let Some(cm) = &state.color_map {
                // One series per category so the legend lists each colour once.
                for (category, color) in cm.legend_entries() {
                    let (questionable, trusted): (Vec<_>, Vec<_>) = state
                        .derived
                        .markers
                        .iter()
                        .filter(|m| cm.dimension.category(m) == category)
                        .partition(|m| m.questionable);

                    if !trusted.is_empty() {
                        let points: PlotPoints = trusted.iter().map(|m| m.position.plot_xy()).collect();
                        plot_ui.points(Points::new(points).name(&category).color(color).radius(4.0));
                    }
                    if !questionable.is_empty() {
                        let points: PlotPoints = questionable.iter().map(|m| m.position.plot_xy()).collect();
                        plot_ui.points(
                            Points::new(points)
                                .name(&category)
                                .color(color)
                                .radius(4.0)
                                .filled(false),
                        );
                    }
                }
            }

            if let Some(index) = selected {
                if let Some(m) = state.derived.markers.iter().find(|m| m.index == index) {
                    let points: PlotPoints = std::iter::once(m.position.plot_xy()).collect();
                    plot_ui.points(
                        Points::new(points)
                            .name(&m.name)
                            .color(Color32::WHITE)
                            .radius(7.0)
                            .filled(false),
                    );
                }
            }

            let base_point: PlotPoints = std::iter::once(base.plot_xy()).collect();
            plot_ui.points(
                Points::new(base_point)
                    .name(&state.config.base.name)
                    .color(BASE_COLOR)
                    .shape(MarkerShape::Diamond)
                    .radius(7.0),
            );
        });

    if response.response.clicked() {
        if let Some(pointer) = response.response.interact_pointer_pos() {
            let nearest = state
                .derived
                .markers
                .iter()
                .map(|m| {
                    let [x, y] = m.position.plot_xy();
                    let screen = response.transform.position_from_point(&PlotPoint::new(x, y));
                    (m, screen.distance(pointer))
                })
                .filter(|(_, d)| *d <= PICK_RADIUS)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(m, _)| m.index);

            if let Some(index) = nearest {
                // The marker came from the current view, so this cannot miss.
                let _ = state.select_row(index);
            }
        }
    }

    ui.label(
        RichText::new("Hollow markers have questionable coordinates. Click a marker to select it.")
            .small()
            .weak(),
    );
}

// ---------------------------------------------------------------------------
// Category charts
// ---------------------------------------------------------------------------

/// Horizontal bar rows: label, proportional bar, count. Zero rows are kept.
fn category_bars<'a>(
    ui: &mut Ui,
    id: &str,
    rows: impl Iterator<Item = (&'a str, usize, Color32)>,
) {
    let rows: Vec<_> = rows.collect();
    let max = rows.iter().map(|(_, n, _)| *n).max().unwrap_or(0).max(1);

    egui::Grid::new(id)
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for (label, count, color) in rows {
                ui.label(label);
                ui.add(
                    ProgressBar::new(count as f32 / max as f32)
                        .fill(color)
                        .desired_width(180.0)
                        .text(count.to_string()),
                );
                ui.end_row();
            }
        });
}

fn commodity_chart(ui: &mut Ui, state: &AppState) {
    ui.strong(format!("Top {} commodities", state.config.top_commodities));
    let fill = Color32::from_rgb(184, 115, 51);
    if state.derived.commodities.is_empty() {
        ui.label("No properties match the current filters.");
        return;
    }
    category_bars(
        ui,
        "commodity_chart",
        state
            .derived
            .commodities
            .iter()
            .map(|(name, n)| (name.as_str(), *n, fill)),
    );
}

fn status_chart(ui: &mut Ui, state: &AppState) {
    ui.strong("Operational status");
    category_bars(
        ui,
        "status_chart",
        state
            .derived
            .statuses
            .iter()
            .map(|(status, n)| (status.as_str(), *n, status_color(*status))),
    );
}

fn province_chart(ui: &mut Ui, state: &AppState) {
    ui.strong("Properties by province");
    let cm = state.color_map.as_ref();
    category_bars(
        ui,
        "province_chart",
        state.derived.provinces.iter().map(|(province, n)| {
            let color = cm
                .filter(|cm| cm.dimension == ColorBy::Province)
                .map(|cm| cm.color_for(province))
                .unwrap_or(Color32::LIGHT_BLUE);
            (province.as_str(), *n, color)
        }),
    );
}

fn distance_chart(ui: &mut Ui, state: &AppState) {
    let width = state.config.histogram_bucket_km;
    ui.strong(format!("Distance from base ({width:.0} km buckets)"));

    let bars: Vec<Bar> = state
        .derived
        .histogram
        .iter()
        .map(|(lower, n)| {
            Bar::new(lower + width / 2.0, *n as f64)
                .width(width * 0.95)
                .name(format!("{lower:.0}–{:.0} km", lower + width))
        })
        .collect();

    Plot::new("distance_histogram")
        .height(220.0)
        .x_axis_label("km")
        .y_axis_label("Properties")
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE).name("Properties"));
        });
}

// ---------------------------------------------------------------------------
// Route mini-map (detail panel)
// ---------------------------------------------------------------------------

/// Base and property markers joined by a straight route line.
pub fn route_map(ui: &mut Ui, detail: &PropertyDetail<'_>) {
    let [from, to] = detail.route;
    Plot::new("route_map")
        .legend(Legend::default())
        .data_aspect(1.0)
        .height(240.0)
        .allow_scroll(false)
        .include_x(detail.center.longitude)
        .include_y(detail.center.latitude)
        .show(ui, |plot_ui| {
            let line: PlotPoints = detail.route.iter().map(|c| c.plot_xy()).collect();
            plot_ui.line(Line::new(line).name("Straight-line route").color(Color32::GRAY).width(2.0));

            let base: PlotPoints = std::iter::once(from.plot_xy()).collect();
            plot_ui.points(
                Points::new(base)
                    .name(&detail.base_name)
                    .color(BASE_COLOR)
                    .shape(MarkerShape::Diamond)
                    .radius(6.0),
            );
            let site: PlotPoints = std::iter::once(to.plot_xy()).collect();
            plot_ui.points(
                Points::new(site)
                    .name(&detail.property.name)
                    .color(SITE_COLOR)
                    .radius(6.0),
            );
        });
}
