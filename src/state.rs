use chrono::NaiveDate;

use crate::dashboard::Dashboard;
use crate::data::aggregate::Granularity;
use crate::data::filter::{selection, FilterSpec, ALL};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Region dropdown value, `"All"` for no constraint.
    pub region: String,

    /// Category dropdown value, `"All"` for no constraint.
    pub category: String,

    /// Inclusive order-date window shown by the date pickers.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// Bucket size of the trend chart.
    pub granularity: Granularity,

    /// Widget data for the current selection, rebuilt on every change.
    pub dashboard: Dashboard,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            dataset: None,
            region: ALL.to_string(),
            category: ALL.to_string(),
            start_date: today,
            end_date: today,
            granularity: Granularity::default(),
            dashboard: Dashboard::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset and reset every filter.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = Some(dataset);
        self.status_message = None;
        self.reset_filters();
    }

    /// Back to "All" / "All" and the full date span of the data.
    pub fn reset_filters(&mut self) {
        self.region = ALL.to_string();
        self.category = ALL.to_string();
        if let Some((first, last)) = self.dataset.as_ref().and_then(Dataset::date_span) {
            self.start_date = first;
            self.end_date = last;
        }
        self.refilter();
    }

    /// Current widget selections as a query.
    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec {
            region: selection(&self.region),
            category: selection(&self.category),
            start: Some(self.start_date),
            end: Some(self.end_date),
        }
    }

    /// Recompute `dashboard` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.dashboard = Dashboard::compute(ds, &self.filter_spec(), self.granularity);
        }
    }

    pub fn set_region(&mut self, region: &str) {
        self.region = region.to_string();
        self.refilter();
    }

    pub fn set_category(&mut self, category: &str) {
        self.category = category.to_string();
        self.refilter();
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{date, record};

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(Dataset::from_records(vec![
            record("CA-1", "West", "Technology", date(2023, 1, 5), 100.0, 20.0),
            record("CA-2", "East", "Furniture", date(2023, 6, 1), 50.0, -10.0),
        ]));
        state
    }

    #[test]
    fn test_set_dataset_selects_everything() {
        let state = loaded();
        assert_eq!(state.region, ALL);
        assert_eq!(state.start_date, date(2023, 1, 5));
        assert_eq!(state.end_date, date(2023, 6, 1));
        assert_eq!(state.dashboard.visible, 2);
        assert_eq!(state.filter_spec().region, None);
    }

    #[test]
    fn test_dropdowns_refilter() {
        let mut state = loaded();
        state.set_region("East");
        assert_eq!(state.dashboard.visible, 1);
        assert_eq!(state.dashboard.cards.total_sales, "$50.00");

        state.set_category("Technology");
        assert_eq!(state.dashboard.visible, 0);

        state.reset_filters();
        assert_eq!(state.dashboard.visible, 2);
    }

    #[test]
    fn test_date_window_refilter() {
        let mut state = loaded();
        state.end_date = date(2023, 3, 1);
        state.refilter();
        assert_eq!(state.dashboard.visible, 1);
        assert_eq!(state.dashboard.cards.orders, "1");
    }

    #[test]
    fn test_granularity_survives_reset() {
        let mut state = loaded();
        state.set_granularity(Granularity::Year);
        assert_eq!(state.dashboard.trend.len(), 1);
        assert_eq!(state.dashboard.trend[0].label, "2023");

        state.reset_filters();
        assert_eq!(state.dashboard.granularity, Granularity::Year);
    }
}
