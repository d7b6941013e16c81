use std::io::Write;

use chrono::NaiveDate;
use superstore_dash::dashboard::Dashboard;
use superstore_dash::data::aggregate::{self, Granularity};
use superstore_dash::data::filter::{self, FilterSpec};
use superstore_dash::data::loader;
use superstore_dash::data::model::{Dataset, GroupKey};
use superstore_dash::report;

const CSV: &str = "\
Row ID,Order ID,Order Date,Ship Date,Ship Mode,Segment,Region,Category,Sub-Category,Sales,Quantity,Discount,Profit
1,CA-1,1/5/2023,1/8/2023,Standard Class,Consumer,West,Technology,Phones,100,2,0,20
2,CA-1,1/5/2023,1/8/2023,Standard Class,Consumer,West,Furniture,Chairs,50,1,0.1,5
3,CA-2,2/10/2023,2/12/2023,First Class,Corporate,East,Furniture,Tables,60,3,0.3,-6
4,CA-3,4/1/2023,4/6/2023,Second Class,Home Office,East,Office Supplies,Paper,40,4,0,12
";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn load() -> Dataset {
    let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write!(tmp, "{}", CSV).unwrap();
    loader::load_file(tmp.path()).unwrap()
}

#[test]
fn test_load_filter_aggregate() {
    let dataset = load();
    assert_eq!(dataset.len(), 4);
    assert_eq!(dataset.regions().len(), 2);

    let spec = FilterSpec::default().region("East");
    let east = filter::apply(&dataset, &spec);
    let m = aggregate::metrics(&east);
    assert_eq!(east.len(), 2);
    assert_eq!(m.total_sales, 100.0);
    assert_eq!(m.total_profit, 6.0);
    assert_eq!(m.distinct_orders, 2);

    let by_category = aggregate::group_by(&east, GroupKey::Category);
    assert_eq!(by_category.get("Furniture").unwrap().total_sales, 60.0);
    let office = by_category.get("Office Supplies").unwrap();
    assert_eq!(office.total_profit, 12.0);
    assert!(by_category.get("Technology").is_none());
}

#[test]
fn test_dashboard_follows_widget_wiring() {
    let dataset = load();
    let spec = FilterSpec::default()
        .region("East")
        .between(date(2023, 1, 1), date(2023, 2, 28));
    let dash = Dashboard::compute(&dataset, &spec, Granularity::Quarter);

    assert_eq!(dash.visible, 1);
    assert_eq!(dash.cards.total_sales, "$60.00");
    assert_eq!(dash.cards.total_profit, "-$6.00");
    assert_eq!(dash.cards.profit_margin, "-10.0%");

    // region chart keeps both regions inside the date window
    assert_eq!(dash.by_region.get("West").unwrap().total_sales, 150.0);
    assert_eq!(dash.by_region.get("East").unwrap().total_sales, 60.0);

    // trend ignores the date window but honours the region
    let labels: Vec<&str> = dash.trend.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["2023-Q1", "2023-Q2"]);
    assert_eq!(dash.trend[1].total_profit, 12.0);
}

#[test]
fn test_report_files_written() {
    let dataset = load();
    let dir = tempfile::tempdir().unwrap();

    let written = report::write_reports(&dataset, dir.path()).unwrap();
    assert_eq!(written.len(), 2);

    let summary_path = dir.path().join(report::DATA_SUMMARY_FILE);
    let summary = std::fs::read_to_string(summary_path).unwrap();
    assert!(summary.contains("Regional Metrics:"));
    assert!(summary.contains("West"));

    let insights_path = dir.path().join(report::INSIGHTS_FILE);
    let insights = std::fs::read_to_string(insights_path).unwrap();
    assert!(insights.contains("Regional Performance"));
}
