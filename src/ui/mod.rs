//! egui widgets: filter row, metric cards and the chart grid.

pub mod panels;
pub mod plot;
