use crate::data::aggregate::{
    self, AggregateResult, Granularity, Metrics, PeriodPoint, ScatterPoint, TrendLine,
};
use crate::data::filter::{apply, FilterSpec};
use crate::data::model::{Dataset, GroupKey, NumericField};
use crate::fmt;

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

/// Display strings for the four metric cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricCards {
    pub total_sales: String,
    pub total_profit: String,
    pub profit_margin: String,
    pub orders: String,
}

impl From<&Metrics> for MetricCards {
    fn from(m: &Metrics) -> Self {
        MetricCards {
            total_sales: fmt::money(m.total_sales),
            total_profit: fmt::money(m.total_profit),
            profit_margin: fmt::percent(m.profit_margin),
            orders: fmt::count(m.distinct_orders),
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard – everything one frame of the UI shows
// ---------------------------------------------------------------------------

/// Chart and card data for one filter state.
///
/// Each widget sees the constraints listed below, so the two comparison
/// charts keep every bar of the dimension they compare:
///
/// | widget            | constraints          |
/// |-------------------|----------------------|
/// | metric cards      | all                  |
/// | region chart      | all but region       |
/// | sales trend       | region + category    |
/// | category chart    | all but category     |
/// | discount scatter  | all                  |
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub metrics: Metrics,
    pub cards: MetricCards,
    /// Sorted by key for stable bar positions.
    pub by_region: AggregateResult,
    pub by_category: AggregateResult,
    /// Trend buckets at the requested granularity.
    pub trend: Vec<PeriodPoint>,
    pub granularity: Granularity,
    /// x = discount, y = profit, color = sales.
    pub scatter: Vec<ScatterPoint>,
    pub scatter_trend: Option<TrendLine>,
    /// Records behind the cards and scatter.
    pub visible: usize,
}

impl Default for MetricCards {
    fn default() -> Self {
        MetricCards::from(&Metrics::default())
    }
}

impl Dashboard {
    /// Recompute every widget from scratch.
    pub fn compute(dataset: &Dataset, spec: &FilterSpec, granularity: Granularity) -> Self {
        let view = apply(dataset, spec);
        let metrics = aggregate::metrics(&view);

        let by_region = sorted_by_key(aggregate::group_by(
            &apply(dataset, &spec.without_region()),
            GroupKey::Region,
        ));
        let by_category = sorted_by_key(aggregate::group_by(
            &apply(dataset, &spec.without_category()),
            GroupKey::Category,
        ));
        let trend = aggregate::time_series(&apply(dataset, &spec.without_dates()), granularity);

        let scatter = aggregate::scatter_series(
            &view,
            NumericField::Discount,
            NumericField::Profit,
            NumericField::Sales,
        );
        let scatter_trend =
            aggregate::trend_line(&view, NumericField::Discount, NumericField::Profit);

        log::debug!(
            "dashboard: {} of {} records visible for {spec:?}",
            view.len(),
            dataset.len()
        );

        Dashboard {
            cards: MetricCards::from(&metrics),
            metrics,
            by_region,
            by_category,
            trend,
            granularity,
            scatter,
            scatter_trend,
            visible: view.len(),
        }
    }
}

fn sorted_by_key(mut result: AggregateResult) -> AggregateResult {
    result.groups.sort_by(|a, b| a.key.cmp(&b.key));
    result
}
