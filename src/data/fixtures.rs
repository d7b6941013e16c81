//! Record builders shared by the unit tests.

use chrono::NaiveDate;

use super::model::Record;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A record with sensible defaults for the columns a test does not care about.
pub fn record(
    order_id: &str,
    region: &str,
    category: &str,
    order_date: NaiveDate,
    sales: f64,
    profit: f64,
) -> Record {
    Record {
        order_id: order_id.to_string(),
        order_date,
        ship_date: order_date,
        region: region.to_string(),
        category: category.to_string(),
        sub_category: "Phones".to_string(),
        segment: "Consumer".to_string(),
        sales,
        profit,
        discount: 0.0,
        quantity: 1,
    }
}
