use chrono::NaiveDate;

use super::model::{Dataset, Record};

/// Dropdown label meaning "no constraint".
pub const ALL: &str = "All";

// ---------------------------------------------------------------------------
// FilterSpec – the active constraints for one query
// ---------------------------------------------------------------------------

/// Per-field constraints. A `None` field does not narrow the view.
///
/// Region and category are exact matches; `start`/`end` bound the order
/// date inclusively and are independent of each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub region: Option<String>,
    pub category: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl FilterSpec {
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn since(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn until(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    pub fn between(self, start: NaiveDate, end: NaiveDate) -> Self {
        self.since(start).until(end)
    }

    /// Same constraints with the region dropped.
    pub fn without_region(&self) -> Self {
        FilterSpec {
            region: None,
            ..self.clone()
        }
    }

    /// Same constraints with the category dropped.
    pub fn without_category(&self) -> Self {
        FilterSpec {
            category: None,
            ..self.clone()
        }
    }

    /// Same constraints with both date bounds dropped.
    pub fn without_dates(&self) -> Self {
        FilterSpec {
            start: None,
            end: None,
            ..self.clone()
        }
    }

    /// Whether no field narrows the view.
    pub fn is_empty(&self) -> bool {
        self.region.is_none()
            && self.category.is_none()
            && self.start.is_none()
            && self.end.is_none()
    }

    /// Whether a record passes every present constraint.
    pub fn matches(&self, rec: &Record) -> bool {
        if let Some(region) = &self.region {
            if rec.region != *region {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if rec.category != *category {
                return false;
            }
        }
        if let Some(start) = self.start {
            if rec.order_date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if rec.order_date > end {
                return false;
            }
        }
        true
    }
}

/// Map a dropdown selection to a constraint: `"All"` means none.
pub fn selection(value: &str) -> Option<String> {
    if value == ALL {
        None
    } else {
        Some(value.to_string())
    }
}

// ---------------------------------------------------------------------------
// View – a filtered, read-only subset of records
// ---------------------------------------------------------------------------

/// Records borrowed from a [`Dataset`], in dataset order.
#[derive(Debug, Clone, PartialEq)]
pub struct View<'a> {
    records: Vec<&'a Record>,
}

impl<'a> View<'a> {
    /// Every record of the dataset.
    pub fn all(dataset: &'a Dataset) -> Self {
        View {
            records: dataset.records().iter().collect(),
        }
    }

    /// Narrow this view further. Does not touch the underlying dataset.
    pub fn filter(&self, spec: &FilterSpec) -> View<'a> {
        if spec.is_empty() {
            return self.clone();
        }
        View {
            records: self
                .records
                .iter()
                .copied()
                .filter(|rec| spec.matches(rec))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> FromIterator<&'a Record> for View<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Record>>(iter: I) -> Self {
        View {
            records: iter.into_iter().collect(),
        }
    }
}

/// Return the view of `dataset` passing every constraint in `spec`.
pub fn apply<'a>(dataset: &'a Dataset, spec: &FilterSpec) -> View<'a> {
    View::all(dataset).filter(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{date, record};

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record("CA-1", "West", "Technology", date(2023, 1, 10), 100.0, 20.0),
            record("CA-2", "East", "Furniture", date(2023, 2, 1), 50.0, -10.0),
            record("CA-3", "West", "Furniture", date(2023, 2, 28), 80.0, 5.0),
            record(
                "CA-4",
                "Central",
                "Office Supplies",
                date(2023, 3, 15),
                30.0,
                3.0,
            ),
            record("CA-5", "East", "Technology", date(2023, 4, 1), 60.0, 12.0),
        ])
    }

    #[test]
    fn test_empty_spec_is_identity() {
        let ds = dataset();
        let view = apply(&ds, &FilterSpec::default());
        assert_eq!(view, View::all(&ds));
        assert_eq!(view.len(), ds.len());
    }

    #[test]
    fn test_region_exact_match() {
        let ds = dataset();
        let view = apply(&ds, &FilterSpec::default().region("West"));
        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|r| r.region == "West"));
    }

    #[test]
    fn test_unknown_value_yields_empty_view() {
        let ds = dataset();
        let north = FilterSpec::default().region("North");
        assert!(apply(&ds, &north).is_empty());
        // matching is case-sensitive
        let lowercase = FilterSpec::default().category("west");
        assert!(apply(&ds, &lowercase).is_empty());
    }

    #[test]
    fn test_filters_commute() {
        let ds = dataset();
        let regions = [None, Some("West"), Some("East"), Some("Nowhere")];
        let categories = [None, Some("Furniture"), Some("Technology")];

        for region in regions {
            for category in categories {
                let by_region = FilterSpec {
                    region: region.map(String::from),
                    ..Default::default()
                };
                let by_category = FilterSpec {
                    category: category.map(String::from),
                    ..Default::default()
                };
                let a = apply(&ds, &by_region).filter(&by_category);
                let b = apply(&ds, &by_category).filter(&by_region);
                assert_eq!(a, b, "region={region:?} category={category:?}");
            }
        }
    }

    #[test]
    fn test_noop_filter_is_idempotent() {
        let ds = dataset();
        let view = apply(&ds, &FilterSpec::default().category("Furniture"));
        let once = view.filter(&FilterSpec::default());
        let twice = once.filter(&FilterSpec::default());
        assert_eq!(once, view);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let ds = dataset();
        let spec = FilterSpec::default()
            .between(date(2023, 2, 1), date(2023, 3, 15));
        let ids: Vec<&str> = apply(&ds, &spec)
            .iter()
            .map(|r| r.order_id.as_str())
            .collect();
        assert_eq!(ids, vec!["CA-2", "CA-3", "CA-4"]);
    }

    #[test]
    fn test_date_bounds_are_independent() {
        let ds = dataset();
        let from = apply(&ds, &FilterSpec::default().since(date(2023, 3, 1)));
        assert_eq!(from.len(), 2);
        let until = apply(&ds, &FilterSpec::default().until(date(2023, 1, 31)));
        assert_eq!(until.len(), 1);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let ds = dataset();
        let spec = FilterSpec::default()
            .between(date(2023, 4, 1), date(2023, 1, 1));
        assert!(apply(&ds, &spec).is_empty());
    }

    #[test]
    fn test_without_helpers_drop_one_constraint() {
        let spec = FilterSpec::default()
            .region("West")
            .category("Furniture")
            .between(date(2023, 1, 1), date(2023, 12, 31));

        assert_eq!(spec.without_region().region, None);
        assert_eq!(spec.without_region().category.as_deref(), Some("Furniture"));
        assert_eq!(spec.without_category().category, None);
        let no_dates = spec.without_dates();
        assert_eq!((no_dates.start, no_dates.end), (None, None));
        assert_eq!(no_dates.region.as_deref(), Some("West"));
    }

    #[test]
    fn test_selection_maps_all_to_none() {
        assert_eq!(selection(ALL), None);
        assert_eq!(selection("West").as_deref(), Some("West"));
    }
}
