use eframe::egui;

use crate::data::model::Dataset;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    /// Start with a dataset already loaded (from `--data`).
    pub fn with_dataset(dataset: Dataset) -> Self {
        let mut state = AppState::default();
        state.set_dataset(dataset);
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Filter row + metric cards ----
        egui::TopBottomPanel::top("filters").show(ctx, |ui| {
            panels::filter_bar(ui, &mut self.state);
            ui.separator();
            panels::metric_cards(ui, &self.state);
        });

        // ---- Central panel: 2×2 chart grid ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::chart_grid(ui, &self.state);
        });
    }
}
