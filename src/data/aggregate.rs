use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Datelike;

use super::filter::View;
use super::model::{GroupKey, NumericField, Record};

/// `profit / sales * 100`, or `0.0` when there are no sales.
///
/// A margin over zero sales is undefined; reporting zero keeps metric cards
/// and tables free of NaN.
pub fn profit_margin(total_sales: f64, total_profit: f64) -> f64 {
    if total_sales > 0.0 {
        total_profit / total_sales * 100.0
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Headline metrics
// ---------------------------------------------------------------------------

/// Totals shown on the metric cards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub total_sales: f64,
    pub total_profit: f64,
    pub profit_margin: f64,
    /// Unique order IDs; a multi-line order counts once.
    pub distinct_orders: usize,
}

pub fn metrics(view: &View<'_>) -> Metrics {
    let mut total_sales = 0.0;
    let mut total_profit = 0.0;
    let mut orders: HashSet<&str> = HashSet::new();

    for rec in view.iter() {
        total_sales += rec.sales;
        total_profit += rec.profit;
        orders.insert(&rec.order_id);
    }

    Metrics {
        total_sales,
        total_profit,
        profit_margin: profit_margin(total_sales, total_profit),
        distinct_orders: orders.len(),
    }
}

// ---------------------------------------------------------------------------
// Group by
// ---------------------------------------------------------------------------

/// Per-group totals.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotals {
    pub key: String,
    pub total_sales: f64,
    pub total_profit: f64,
    /// Distinct order IDs in the group.
    pub order_count: usize,
    /// Records (order lines) in the group.
    pub line_count: usize,
    pub profit_margin: f64,
}

/// Result of [`group_by`]: one entry per distinct key seen in the view.
///
/// Groups are stored in first-seen order. That order carries no meaning;
/// use [`AggregateResult::sorted_by_sales`] or sort before display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    pub key: Option<GroupKey>,
    pub groups: Vec<GroupTotals>,
}

impl AggregateResult {
    pub fn get(&self, key: &str) -> Option<&GroupTotals> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Copy with groups ordered by descending sales.
    pub fn sorted_by_sales(&self) -> AggregateResult {
        let mut groups = self.groups.clone();
        groups.sort_by(|a, b| b.total_sales.total_cmp(&a.total_sales));
        AggregateResult {
            key: self.key,
            groups,
        }
    }
}

pub fn group_by(view: &View<'_>, key: GroupKey) -> AggregateResult {
    group_records(view.iter(), |rec| rec.key(key).to_string(), Some(key))
}

/// Group by a pair of columns, e.g. Category / Sub-Category.
/// Group keys are joined with `" / "`.
pub fn group_by_pair(view: &View<'_>, outer: GroupKey, inner: GroupKey) -> AggregateResult {
    group_records(
        view.iter(),
        |rec| format!("{} / {}", rec.key(outer), rec.key(inner)),
        None,
    )
}

fn group_records<'a, F>(
    records: impl Iterator<Item = &'a Record>,
    key_of: F,
    key: Option<GroupKey>,
) -> AggregateResult
where
    F: Fn(&Record) -> String,
{
    struct Acc<'a> {
        sales: f64,
        profit: f64,
        lines: usize,
        orders: HashSet<&'a str>,
    }

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut keys: Vec<String> = Vec::new();
    let mut accs: Vec<Acc<'a>> = Vec::new();

    for rec in records {
        let k = key_of(rec);
        let slot = match index.get(&k) {
            Some(&i) => i,
            None => {
                index.insert(k.clone(), accs.len());
                keys.push(k);
                accs.push(Acc {
                    sales: 0.0,
                    profit: 0.0,
                    lines: 0,
                    orders: HashSet::new(),
                });
                accs.len() - 1
            }
        };
        let acc = &mut accs[slot];
        acc.sales += rec.sales;
        acc.profit += rec.profit;
        acc.lines += 1;
        acc.orders.insert(&rec.order_id);
    }

    let groups = keys
        .into_iter()
        .zip(accs)
        .map(|(key, acc)| GroupTotals {
            key,
            total_sales: acc.sales,
            total_profit: acc.profit,
            order_count: acc.orders.len(),
            line_count: acc.lines,
            profit_margin: profit_margin(acc.sales, acc.profit),
        })
        .collect();

    AggregateResult { key, groups }
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

/// Bucket size for [`time_series`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Granularity {
    #[default]
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Month, Granularity::Quarter, Granularity::Year];

    /// Adjective used in chart titles ("Monthly", ...).
    pub fn label(self) -> &'static str {
        match self {
            Granularity::Month => "Monthly",
            Granularity::Quarter => "Quarterly",
            Granularity::Year => "Yearly",
        }
    }
}

/// One bucket of a trend series.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodPoint {
    pub label: String,
    pub total_sales: f64,
    pub total_profit: f64,
}

/// Sales and profit per calendar bucket of the order date, oldest first.
///
/// Buckets without records are omitted rather than zero-filled, so the
/// series can have gaps.
pub fn time_series(view: &View<'_>, granularity: Granularity) -> Vec<PeriodPoint> {
    // (year, sub-period) sorts chronologically
    let mut buckets: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();

    for rec in view.iter() {
        let date = rec.order_date;
        let period = match granularity {
            Granularity::Month => date.month(),
            Granularity::Quarter => (date.month() - 1) / 3 + 1,
            Granularity::Year => 0,
        };
        let entry = buckets.entry((date.year(), period)).or_insert((0.0, 0.0));
        entry.0 += rec.sales;
        entry.1 += rec.profit;
    }

    buckets
        .into_iter()
        .map(|((year, period), (sales, profit))| PeriodPoint {
            label: match granularity {
                Granularity::Month => format!("{year:04}-{period:02}"),
                Granularity::Quarter => format!("{year:04}-Q{period}"),
                Granularity::Year => format!("{year:04}"),
            },
            total_sales: sales,
            total_profit: profit,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scatter, correlation and trend line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub color: f64,
}

/// One point per record, no aggregation.
pub fn scatter_series(
    view: &View<'_>,
    x: NumericField,
    y: NumericField,
    color: NumericField,
) -> Vec<ScatterPoint> {
    view.iter()
        .map(|rec| ScatterPoint {
            x: rec.value(x),
            y: rec.value(y),
            color: rec.value(color),
        })
        .collect()
}

/// Running sums for the two-variable statistics below.
struct Moments {
    mean_x: f64,
    mean_y: f64,
    sxx: f64,
    syy: f64,
    sxy: f64,
}

fn moments(view: &View<'_>, x: NumericField, y: NumericField) -> Option<Moments> {
    let n = view.len();
    if n < 2 {
        return None;
    }
    let n = n as f64;
    let mean_x = view.iter().map(|r| r.value(x)).sum::<f64>() / n;
    let mean_y = view.iter().map(|r| r.value(y)).sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for rec in view.iter() {
        let dx = rec.value(x) - mean_x;
        let dy = rec.value(y) - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    Some(Moments {
        mean_x,
        mean_y,
        sxx,
        syy,
        sxy,
    })
}

/// Pearson correlation of two columns.
///
/// `None` for fewer than two records or when either column is constant.
pub fn correlation(view: &View<'_>, x: NumericField, y: NumericField) -> Option<f64> {
    let m = moments(view, x, y)?;
    if m.sxx == 0.0 || m.syy == 0.0 {
        return None;
    }
    Some(m.sxy / (m.sxx.sqrt() * m.syy.sqrt()))
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Degree-1 fit of `y` on `x`; `None` when `x` is constant or the view has
/// fewer than two records.
pub fn trend_line(view: &View<'_>, x: NumericField, y: NumericField) -> Option<TrendLine> {
    let m = moments(view, x, y)?;
    if m.sxx == 0.0 {
        return None;
    }
    let slope = m.sxy / m.sxx;
    Some(TrendLine {
        slope,
        intercept: m.mean_y - slope * m.mean_x,
    })
}

// ---------------------------------------------------------------------------
// Single-column summary
// ---------------------------------------------------------------------------

/// Count, spread and quartiles of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` below two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Summary of `field` over the view, `None` when the view is empty.
/// Quartiles interpolate linearly between the two nearest ranks.
pub fn describe(view: &View<'_>, field: NumericField) -> Option<Summary> {
    let mut values: Vec<f64> = view.iter().map(|r| r.value(field)).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let std = (n > 1).then(|| {
        let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        (ss / (n - 1) as f64).sqrt()
    });
    let quantile = |q: f64| {
        let pos = q * (n - 1) as f64;
        let (lo, hi) = (pos.floor() as usize, pos.ceil() as usize);
        values[lo] + (values[hi] - values[lo]) * (pos - lo as f64)
    };

    Some(Summary {
        count: n,
        mean,
        std,
        min: values[0],
        q1: quantile(0.25),
        median: quantile(0.5),
        q3: quantile(0.75),
        max: values[n - 1],
    })
}
