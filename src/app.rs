use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct WranglerApp {
    pub state: AppState,
}

impl WranglerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for WranglerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: operations ----
        egui::SidePanel::left("operations_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tables and chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.original.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.label("Open a CSV, Excel, JSON or Parquet file from the File menu.");
                });
                return;
            }

            let original_rows = self.state.original_rows();
            let working_rows = self.state.working_rows();
            let state = &mut self.state;

            egui::ScrollArea::vertical().show(ui, |ui| {
                if let Some(ds) = &state.original {
                    table::dataset_view(
                        ui,
                        "original",
                        "Original Data",
                        ds,
                        &original_rows,
                        &mut state.original_search,
                        &state.config,
                    );
                }
                ui.separator();
                if let Some(ds) = &state.working {
                    table::dataset_view(
                        ui,
                        "modified",
                        "Modified Data",
                        ds,
                        &working_rows,
                        &mut state.working_search,
                        &state.config,
                    );
                }
                if state.visualize {
                    ui.separator();
                    plot::chart_section(ui, state);
                }
            });
        });
    }
}
