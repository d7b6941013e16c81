use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Record – one row of the transactions table
// ---------------------------------------------------------------------------

/// A single order line (one row of the source table).
///
/// Values are validated once by the loader: `sales >= 0` and
/// `discount` in `[0, 1]`. `profit` may be negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub ship_date: NaiveDate,
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub segment: String,
    pub sales: f64,
    pub profit: f64,
    pub discount: f64,
    pub quantity: u32,
}

impl Record {
    /// Text value of a grouping column.
    pub fn key(&self, key: GroupKey) -> &str {
        match key {
            GroupKey::Region => &self.region,
            GroupKey::Category => &self.category,
            GroupKey::SubCategory => &self.sub_category,
            GroupKey::Segment => &self.segment,
        }
    }

    /// Numeric value of a measure column.
    pub fn value(&self, field: NumericField) -> f64 {
        match field {
            NumericField::Sales => self.sales,
            NumericField::Profit => self.profit,
            NumericField::Discount => self.discount,
            NumericField::Quantity => f64::from(self.quantity),
        }
    }
}

// ---------------------------------------------------------------------------
// Column selectors
// ---------------------------------------------------------------------------

/// Text columns a view can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Region,
    Category,
    SubCategory,
    Segment,
}

impl GroupKey {
    /// Header name used in the source file.
    pub fn column_name(self) -> &'static str {
        match self {
            GroupKey::Region => "Region",
            GroupKey::Category => "Category",
            GroupKey::SubCategory => "Sub-Category",
            GroupKey::Segment => "Segment",
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Numeric columns usable as scatter / correlation axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    Sales,
    Profit,
    Discount,
    Quantity,
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NumericField::Sales => "Sales",
            NumericField::Profit => "Profit",
            NumericField::Discount => "Discount",
            NumericField::Quantity => "Quantity",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed filter choices.
///
/// Built once and never mutated; queries borrow it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    regions: BTreeSet<String>,
    categories: BTreeSet<String>,
    date_span: Option<(NaiveDate, NaiveDate)>,
}

impl Dataset {
    /// Build the dropdown indices and date span from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut regions = BTreeSet::new();
        let mut categories = BTreeSet::new();
        let mut date_span: Option<(NaiveDate, NaiveDate)> = None;

        for rec in &records {
            if !regions.contains(&rec.region) {
                regions.insert(rec.region.clone());
            }
            if !categories.contains(&rec.category) {
                categories.insert(rec.category.clone());
            }
            date_span = Some(match date_span {
                None => (rec.order_date, rec.order_date),
                Some((lo, hi)) => (lo.min(rec.order_date), hi.max(rec.order_date)),
            });
        }

        Dataset {
            records,
            regions,
            categories,
            date_span,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct regions, sorted.
    pub fn regions(&self) -> &BTreeSet<String> {
        &self.regions
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Earliest and latest order date, `None` for an empty dataset.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.date_span
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{date, record};

    #[test]
    fn test_from_records_builds_indices() {
        let ds = Dataset::from_records(vec![
            record("A-1", "West", "Technology", date(2023, 3, 5), 10.0, 1.0),
            record("A-2", "East", "Furniture", date(2022, 12, 31), 10.0, 1.0),
            record("A-3", "West", "Furniture", date(2023, 1, 1), 10.0, 1.0),
        ]);

        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.regions().iter().collect::<Vec<_>>(),
            vec!["East", "West"]
        );
        assert_eq!(
            ds.categories().iter().collect::<Vec<_>>(),
            vec!["Furniture", "Technology"]
        );
        assert_eq!(
            ds.date_span(),
            Some((date(2022, 12, 31), date(2023, 3, 5)))
        );
    }

    #[test]
    fn test_empty_dataset_has_no_span() {
        let ds = Dataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.date_span(), None);
    }

    #[test]
    fn test_quantity_as_numeric_field() {
        let mut rec = record("A-1", "West", "Technology", date(2023, 3, 5), 10.0, 1.0);
        rec.quantity = 7;
        assert_eq!(rec.value(NumericField::Quantity), 7.0);
        assert_eq!(rec.key(GroupKey::SubCategory), "Phones");
    }
}
