use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::DatePickerButton;

use crate::data::aggregate::Granularity;
use crate::data::filter::ALL;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Filter row – dropdowns and date range
// ---------------------------------------------------------------------------

/// Render the Region / Category dropdowns and the order-date window.
pub fn filter_bar(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone the choices so we can mutate state inside the widgets.
    let regions: Vec<String> = dataset.regions().iter().cloned().collect();
    let categories: Vec<String> = dataset.categories().iter().cloned().collect();

    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Region");
        if let Some(choice) =
            dropdown(ui, "region_filter", &state.region, "All Regions", &regions)
        {
            state.set_region(&choice);
        }

        ui.separator();

        ui.strong("Category");
        if let Some(choice) = dropdown(
            ui,
            "category_filter",
            &state.category,
            "All Categories",
            &categories,
        ) {
            state.set_category(&choice);
        }

        ui.separator();

        ui.strong("Date range");
        let mut changed = ui
            .add(DatePickerButton::new(&mut state.start_date).id_salt("from"))
            .changed();
        ui.label("to");
        changed |= ui
            .add(DatePickerButton::new(&mut state.end_date).id_salt("to"))
            .changed();
        if changed {
            state.refilter();
        }

        ui.separator();

        ui.strong("Trend");
        let mut granularity = state.granularity;
        egui::ComboBox::from_id_salt("trend_granularity")
            .selected_text(granularity.label())
            .show_ui(ui, |ui: &mut Ui| {
                for g in Granularity::ALL {
                    ui.selectable_value(&mut granularity, g, g.label());
                }
            });
        if granularity != state.granularity {
            state.set_granularity(granularity);
        }

        if ui.button("Reset").clicked() {
            state.reset_filters();
        }
    });
}

/// A combo box with an "All" entry first. Returns the new value when the
/// user picks a different one.
fn dropdown(
    ui: &mut Ui,
    id: &str,
    current: &str,
    all_label: &str,
    options: &[String],
) -> Option<String> {
    let shown = if current == ALL { all_label } else { current };
    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(shown)
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current == ALL, all_label).clicked() {
                picked = Some(ALL.to_string());
            }
            for opt in options {
                if ui.selectable_label(current == opt, opt).clicked() {
                    picked = Some(opt.clone());
                }
            }
        });
    picked.filter(|p| p != current)
}

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

pub fn metric_cards(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        return;
    }
    let cards = &state.dashboard.cards;
    ui.columns(4, |cols: &mut [Ui]| {
        card(&mut cols[0], "Total Sales", &cards.total_sales);
        card(&mut cols[1], "Total Profit", &cards.total_profit);
        card(&mut cols[2], "Profit Margin", &cards.profit_margin);
        card(&mut cols[3], "Number of Orders", &cards.orders);
    });
}

fn card(ui: &mut Ui, title: &str, value: &str) {
    ui.group(|ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(RichText::new(title).strong());
            ui.label(RichText::new(value).size(24.0));
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
        ui.heading("Superstore Sales Dashboard");
        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.dashboard.visible
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open transactions")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records: regions {:?}, categories {:?}",
                    dataset.len(),
                    dataset.regions(),
                    dataset.categories()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
