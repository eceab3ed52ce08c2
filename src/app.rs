use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MinePlannerApp {
    pub state: AppState,
}

impl MinePlannerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for MinePlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Right side panel: selected property ----
        if self.state.selected.is_some() {
            egui::SidePanel::right("detail_panel")
                .default_width(320.0)
                .resizable(true)
                .show(ctx, |ui| {
                    table::detail_panel(ui, &mut self.state);
                });
        }

        // ---- Bottom panel: property table ----
        if self.state.dataset.is_some() {
            egui::TopBottomPanel::bottom("property_table")
                .resizable(true)
                .default_height(240.0)
                .show(ctx, |ui| {
                    table::property_table(ui, &mut self.state);
                });
        }

        // ---- Central panel: map and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::dashboard(ui, &mut self.state);
        });
    }
}
