use std::ops::RangeInclusive;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::color::{self, SequentialScale};
use crate::dashboard::Dashboard;
use crate::data::aggregate::{AggregateResult, GroupTotals};
use crate::fmt;
use crate::state::AppState;

/// Colour buckets used to draw the scatter (one `Points` item each).
const SCATTER_BINS: usize = 12;

// ---------------------------------------------------------------------------
// Chart grid (central panel)
// ---------------------------------------------------------------------------

/// Render the four dashboard charts in a 2×2 grid.
pub fn chart_grid(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view the dashboard  (File → Open…)");
        });
        return;
    }

    let dash = &state.dashboard;
    let height = (ui.available_height() / 2.0 - 32.0).max(160.0);

    ui.columns(2, |cols: &mut [Ui]| {
        grouped_bars(
            &mut cols[0],
            "region_chart",
            "Sales and Profit by Region",
            &dash.by_region,
            height,
        );
        sales_trend(&mut cols[1], dash, height);
    });
    ui.add_space(8.0);
    ui.columns(2, |cols: &mut [Ui]| {
        grouped_bars(
            &mut cols[0],
            "category_chart",
            "Category Performance",
            &dash.by_category,
            height,
        );
        discount_scatter(&mut cols[1], dash, height);
    });
}

/// Axis formatter that shows `labels[i]` at integer positions and nothing
/// in between.
fn label_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let v = mark.value;
        if v < 0.0 || (v - v.round()).abs() > 1e-6 {
            return String::new();
        }
        labels.get(v.round() as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Grouped bars: sales and profit side by side per group
// ---------------------------------------------------------------------------

fn grouped_bars(ui: &mut Ui, id: &str, title: &str, result: &AggregateResult, height: f32) {
    ui.strong(title);

    let labels: Vec<String> = result.groups.iter().map(|g| g.key.clone()).collect();
    let sales = BarChart::new(bar_series(result, -0.2, |g| g.total_sales))
        .name("Sales")
        .color(color::SALES);
    let profit = BarChart::new(bar_series(result, 0.2, |g| g.total_profit))
        .name("Profit")
        .color(color::PROFIT);

    Plot::new(id)
        .height(height)
        .legend(Legend::default())
        .x_axis_formatter(label_formatter(labels))
        .y_axis_label("Amount ($)")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(sales);
            plot_ui.bar_chart(profit);
        });
}

/// One bar per group, shifted by `offset` so two series sit side by side.
fn bar_series(
    result: &AggregateResult,
    offset: f64,
    value: impl Fn(&GroupTotals) -> f64,
) -> Vec<Bar> {
    result
        .groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Bar::new(i as f64 + offset, value(g))
                .width(0.38)
                .name(format!("{}: {}", g.key, fmt::money_short(value(g))))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Sales trend
// ---------------------------------------------------------------------------

fn sales_trend(ui: &mut Ui, dash: &Dashboard, height: f32) {
    let title = format!("{} Sales and Profit Trend", dash.granularity.label());
    ui.strong(title);

    let labels: Vec<String> = dash.trend.iter().map(|p| p.label.clone()).collect();
    let sales: PlotPoints = dash
        .trend
        .iter()
        .enumerate()
        .map(|(i, p)| [i as f64, p.total_sales])
        .collect();
    let profit: PlotPoints = dash
        .trend
        .iter()
        .enumerate()
        .map(|(i, p)| [i as f64, p.total_profit])
        .collect();
    let sales = Line::new(sales)
        .name("Sales")
        .color(color::SALES)
        .width(2.0);
    let profit = Line::new(profit)
        .name("Profit")
        .color(color::PROFIT)
        .width(2.0);

    Plot::new("sales_trend")
        .height(height)
        .legend(Legend::default())
        .x_axis_formatter(label_formatter(labels))
        .x_axis_label("Order date")
        .y_axis_label("Amount ($)")
        .allow_boxed_zoom(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(sales);
            plot_ui.line(profit);
        });
}

// ---------------------------------------------------------------------------
// Discount vs profit scatter, coloured by sales
// ---------------------------------------------------------------------------

fn discount_scatter(ui: &mut Ui, dash: &Dashboard, height: f32) {
    let colors = dash.scatter.iter().map(|p| p.color);
    let scale = SequentialScale::from_values(colors);
    match scale {
        Some(s) => ui.strong(format!(
            "Discount vs Profit  (colour: sales {} – {})",
            fmt::money_short(s.min()),
            fmt::money_short(s.max())
        )),
        None => ui.strong("Discount vs Profit"),
    };

    // Bucket points by colour so each bucket is a single plot item.
    let mut bins: Vec<Vec<[f64; 2]>> = vec![Vec::new(); SCATTER_BINS];
    if let Some(s) = scale {
        for p in &dash.scatter {
            let scaled = s.normalize(p.color) * (SCATTER_BINS - 1) as f64;
            let bin = scaled.round() as usize;
            bins[bin.min(SCATTER_BINS - 1)].push([p.x, p.y]);
        }
    }

    let x_range = dash
        .scatter
        .iter()
        .map(|p| p.x)
        .fold(None, |acc: Option<(f64, f64)>, x| match acc {
            None => Some((x, x)),
            Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
        });
    let trend = dash.scatter_trend.zip(x_range).map(|(line, (lo, hi))| {
        Line::new(PlotPoints::from(vec![[lo, line.at(lo)], [hi, line.at(hi)]]))
            .name("Trend")
            .color(color::TREND)
            .style(egui_plot::LineStyle::dashed_loose())
    });

    Plot::new("discount_profit")
        .height(height)
        .x_axis_label("Discount")
        .y_axis_label("Profit ($)")
        .allow_boxed_zoom(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (i, pts) in bins.into_iter().enumerate() {
                if pts.is_empty() {
                    continue;
                }
                let t = i as f32 / (SCATTER_BINS - 1) as f32;
                let fill: Color32 = color::ramp(t).gamma_multiply(0.8);
                let points = Points::new(PlotPoints::from(pts))
                    .radius(3.0)
                    .color(fill);
                plot_ui.points(points);
            }
            if let Some(line) = trend {
                plot_ui.line(line);
            }
        });
}
