use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment, Table};

use crate::data::aggregate::{self, AggregateResult, Summary};
use crate::data::filter::View;
use crate::data::model::{Dataset, GroupKey, NumericField, Record};
use crate::fmt::{count, money, percent};

pub const DATA_SUMMARY_FILE: &str = "data_summary.txt";
pub const INSIGHTS_FILE: &str = "analysis_summary.txt";

/// A titled list of narrative findings.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: &'static str,
    pub lines: Vec<String>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Write the metric tables and the insight summary into `dir`, creating it
/// if needed. Returns the paths written.
pub fn write_reports(dataset: &Dataset, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let summary_path = dir.join(DATA_SUMMARY_FILE);
    std::fs::write(&summary_path, data_summary(dataset))
        .with_context(|| format!("writing {}", summary_path.display()))?;

    let insights_path = dir.join(INSIGHTS_FILE);
    std::fs::write(&insights_path, render_insights(&insights(dataset)))
        .with_context(|| format!("writing {}", insights_path.display()))?;

    log::info!("Wrote reports to {}", dir.display());
    Ok(vec![summary_path, insights_path])
}

// ---------------------------------------------------------------------------
// Metric tables
// ---------------------------------------------------------------------------

fn metrics_table(label: &str, result: &AggregateResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        label,
        "Sales",
        "Profit",
        "Orders",
        "Lines",
        "Profit Margin",
    ]);
    for g in &result.groups {
        table.add_row(vec![
            Cell::new(&g.key),
            number(money(g.total_sales)),
            number(money(g.total_profit)),
            number(count(g.order_count)),
            number(count(g.line_count)),
            number(percent(g.profit_margin)),
        ]);
    }
    table
}

fn number(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn statistics_table(view: &View<'_>) -> Table {
    let sales = aggregate::describe(view, NumericField::Sales);
    let profit = aggregate::describe(view, NumericField::Profit);

    let rows: [(&str, fn(&Summary) -> String); 8] = [
        ("count", |s| count(s.count)),
        ("mean", |s| format!("{:.2}", s.mean)),
        ("std", |s| s.std.map_or("n/a".to_string(), |v| format!("{v:.2}"))),
        ("min", |s| format!("{:.2}", s.min)),
        ("25%", |s| format!("{:.2}", s.q1)),
        ("50%", |s| format!("{:.2}", s.median)),
        ("75%", |s| format!("{:.2}", s.q3)),
        ("max", |s| format!("{:.2}", s.max)),
    ];

    let mut table = Table::new();
    table.set_header(vec!["", "Sales", "Profit"]);
    for (label, show) in rows {
        let cell = |summary: &Option<Summary>| {
            number(summary.as_ref().map_or_else(|| "-".to_string(), show))
        };
        table.add_row(vec![Cell::new(label), cell(&sales), cell(&profit)]);
    }
    table
}

/// Sales/profit statistics, per-region, per-sub-category and per-segment
/// tables, plus the discount/profit correlation.
pub fn data_summary(dataset: &Dataset) -> String {
    let view = View::all(dataset);
    let regions = aggregate::group_by(&view, GroupKey::Region)
        .sorted_by_sales();
    let mut categories =
        aggregate::group_by_pair(&view, GroupKey::Category, GroupKey::SubCategory);
    categories.groups.sort_by(|a, b| a.key.cmp(&b.key));
    let segments = aggregate::group_by(&view, GroupKey::Segment)
        .sorted_by_sales();

    let mut out = String::from("DATA SUMMARY\n============\n\n");
    out.push_str("Basic Statistics:\n");
    out.push_str(&statistics_table(&view).to_string());
    out.push_str("\n\nRegional Metrics:\n");
    out.push_str(&metrics_table("Region", &regions).to_string());
    out.push_str("\n\nCategory Metrics:\n");
    let category_table = metrics_table("Category / Sub-Category", &categories);
    out.push_str(&category_table.to_string());
    out.push_str("\n\nSegment Metrics:\n");
    let segment_table = metrics_table("Segment", &segments);
    out.push_str(&segment_table.to_string());
    out.push_str("\n\n");
    out.push_str(&correlation_line(&view));
    out.push('\n');
    out
}

fn correlation_line(view: &View<'_>) -> String {
    match aggregate::correlation(view, NumericField::Discount, NumericField::Profit) {
        Some(r) => format!("Discount-Profit Correlation: {r:.2}"),
        None => "Discount-Profit Correlation: not defined for this data".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

/// Rows that are exact copies of an earlier row.
///
/// Compares the loaded columns only. Source columns the loader drops, such
/// as `Row ID`, play no part, so two lines that differ only there count as
/// duplicates.
pub fn duplicate_rows(records: &[Record]) -> usize {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| {
            let key = (
                &r.order_id,
                r.order_date,
                r.ship_date,
                &r.region,
                &r.category,
                &r.sub_category,
                &r.segment,
                r.sales.to_bits(),
                r.profit.to_bits(),
                r.discount.to_bits(),
                r.quantity,
            );
            !seen.insert(key)
        })
        .count()
}

/// Narrative findings, derived from whatever groups the data contains.
pub fn insights(dataset: &Dataset) -> Vec<Section> {
    let view = View::all(dataset);
    let totals = aggregate::metrics(&view);

    let mut quality = vec![
        format!(
            "Loaded {} order lines across {} orders",
            count(dataset.len()),
            count(totals.distinct_orders)
        ),
        format!(
            "Found {} duplicate rows",
            count(duplicate_rows(dataset.records()))
        ),
        // the loader rejects empty cells
        "No null values found in the dataset".to_string(),
    ];
    if let Some((first, last)) = dataset.date_span() {
        quality.push(format!("Order dates span {first} to {last}"));
    }

    let mut regional = Vec::new();
    let regions = aggregate::group_by(&view, GroupKey::Region)
        .sorted_by_sales();
    if let Some(lead) = regions.groups.first() {
        regional.push(format!(
            "{} region leads with {} in sales and {} in profit",
            lead.key,
            money(lead.total_sales),
            money(lead.total_profit)
        ));
    }
    if let Some(low) = lowest_margin(&regions) {
        regional.push(format!(
            "{} region has the lowest profit margin at {:.2}%",
            low.key, low.profit_margin
        ));
    }
    if let (Some(low), Some(high)) = (lowest_margin(&regions), highest_margin(&regions)) {
        regional.push(format!(
            "Profit margins range from {:.2}% to {:.2}%",
            low.profit_margin, high.profit_margin
        ));
    }

    let mut category = Vec::new();
    let subs = aggregate::group_by_pair(&view, GroupKey::Category, GroupKey::SubCategory);
    if !subs.is_empty() {
        let negative = subs.groups.iter().filter(|g| g.profit_margin < 0.0).count();
        category.push(format!(
            "Found {negative} sub-categories with negative profit margins"
        ));
    }
    if let Some(top) = highest_margin(&subs) {
        category.push(format!(
            "Top performing sub-category by margin: {} ({:.2}%)",
            top.key, top.profit_margin
        ));
    }
    if let Some(best) = highest_margin(&aggregate::group_by(&view, GroupKey::Category)) {
        category.push(format!(
            "{} category has the highest profit margin ({:.2}%)",
            best.key, best.profit_margin
        ));
    }

    let mut segments = Vec::new();
    let by_segment = aggregate::group_by(&view, GroupKey::Segment)
        .sorted_by_sales();
    for (rank, g) in by_segment.groups.iter().take(2).enumerate() {
        let lead = if rank == 0 { "leads" } else { "second" };
        segments.push(format!(
            "{} segment {lead} with {} in sales",
            g.key,
            money(g.total_sales)
        ));
    }
    let per_line = |g: &aggregate::GroupTotals| g.total_profit / g.line_count as f64;
    if let Some(best) = by_segment
        .groups
        .iter()
        .max_by(|a, b| per_line(*a).total_cmp(&per_line(*b)))
    {
        segments.push(format!(
            "{} has the highest profit per order line at {}",
            best.key,
            money(per_line(best))
        ));
    }

    let discount = vec![correlation_line(&view)];

    let mut overall = vec![
        format!("Total Sales: {}", money(totals.total_sales)),
        format!("Total Profit: {}", money(totals.total_profit)),
    ];
    if !dataset.is_empty() {
        overall.push(format!(
            "Average Order Line Value: {}",
            money(totals.total_sales / dataset.len() as f64)
        ));
    }
    overall.push(format!("Profit Margin: {:.2}%", totals.profit_margin));

    vec![
        Section { title: "Data Quality", lines: quality },
        Section { title: "Regional Performance", lines: regional },
        Section { title: "Category Analysis", lines: category },
        Section { title: "Customer Segments", lines: segments },
        Section { title: "Discount Analysis", lines: discount },
        Section { title: "Overall Business Metrics", lines: overall },
    ]
}

fn lowest_margin(result: &AggregateResult) -> Option<&aggregate::GroupTotals> {
    result
        .groups
        .iter()
        .min_by(|a, b| a.profit_margin.total_cmp(&b.profit_margin))
}

fn highest_margin(result: &AggregateResult) -> Option<&aggregate::GroupTotals> {
    result
        .groups
        .iter()
        .max_by(|a, b| a.profit_margin.total_cmp(&b.profit_margin))
}

pub fn render_insights(sections: &[Section]) -> String {
    let mut out = String::from("SUPERSTORE SALES ANALYSIS INSIGHTS\n");
    out.push_str("==================================\n\n");
    for section in sections {
        out.push_str(section.title);
        out.push('\n');
        out.push_str(&"-".repeat(section.title.len()));
        out.push('\n');
        for line in &section.lines {
            out.push_str("- ");
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}
