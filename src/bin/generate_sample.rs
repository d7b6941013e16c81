//! Writes a deterministic synthetic Superstore dataset as
//! `sample_superstore.csv` and `sample_superstore.parquet`.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Builder, Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

const REGIONS: [&str; 4] = ["Central", "East", "South", "West"];
const SEGMENTS: [&str; 3] = ["Consumer", "Corporate", "Home Office"];
const SHIP_MODES: [&str; 3] = ["Standard Class", "Second Class", "First Class"];

/// (category, sub-category, typical unit price, typical margin)
const PRODUCTS: [(&str, &str, f64, f64); 9] = [
    ("Furniture", "Bookcases", 130.0, -0.03),
    ("Furniture", "Chairs", 140.0, 0.08),
    ("Furniture", "Tables", 220.0, -0.09),
    ("Office Supplies", "Binders", 20.0, 0.15),
    ("Office Supplies", "Paper", 15.0, 0.43),
    ("Office Supplies", "Storage", 55.0, 0.09),
    ("Technology", "Phones", 120.0, 0.13),
    ("Technology", "Copiers", 700.0, 0.37),
    ("Technology", "Machines", 350.0, 0.02),
];

const DISCOUNTS: [f64; 6] = [0.0, 0.0, 0.0, 0.1, 0.2, 0.5];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

struct Row {
    order_id: String,
    order_date: NaiveDate,
    ship_date: NaiveDate,
    ship_mode: &'static str,
    segment: &'static str,
    region: &'static str,
    category: &'static str,
    sub_category: &'static str,
    sales: f64,
    quantity: i64,
    discount: f64,
    profit: f64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn generate(rng: &mut SimpleRng, orders: usize) -> Vec<Row> {
    let first_day = NaiveDate::from_ymd_opt(2014, 1, 3).unwrap_or_default();
    let mut rows = Vec::new();

    for n in 0..orders {
        let order_date = first_day + Duration::days(rng.below(4 * 365) as i64);
        let ship_mode = *rng.pick(&SHIP_MODES);
        let ship_date = order_date + Duration::days(1 + rng.below(6) as i64);
        let region = *rng.pick(&REGIONS);
        let segment = *rng.pick(&SEGMENTS);
        let prefix = if region == "Central" { "US" } else { "CA" };
        let order_id = format!("{prefix}-{}-{:06}", order_date.year(), 100_000 + n);

        // 1-4 lines per order
        for _ in 0..=rng.below(4) {
            let &(category, sub_category, price, margin) = rng.pick(&PRODUCTS);
            let quantity = 1 + rng.below(7) as i64;
            let discount = *rng.pick(&DISCOUNTS);
            let sales = round2(
                price * (0.5 + rng.next_f64()) * quantity as f64 * (1.0 - discount),
            );
            // deep discounts push lines into a loss
            let profit = round2(
                sales * (margin + 0.1 * (rng.next_f64() - 0.5) - 0.8 * discount),
            );

            rows.push(Row {
                order_id: order_id.clone(),
                order_date,
                ship_date,
                ship_mode,
                segment,
                region,
                category,
                sub_category,
                sales,
                quantity,
                discount,
                profit,
            });
        }
    }
    rows
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {path}"))?;
    writer.write_record([
        "Row ID", "Order ID", "Order Date", "Ship Date", "Ship Mode", "Segment", "Region",
        "Category", "Sub-Category", "Sales", "Quantity", "Discount", "Profit",
    ])?;
    for (i, r) in rows.iter().enumerate() {
        writer.write_record([
            (i + 1).to_string(),
            r.order_id.clone(),
            r.order_date.format("%-m/%-d/%Y").to_string(),
            r.ship_date.format("%-m/%-d/%Y").to_string(),
            r.ship_mode.to_string(),
            r.segment.to_string(),
            r.region.to_string(),
            r.category.to_string(),
            r.sub_category.to_string(),
            r.sales.to_string(),
            r.quantity.to_string(),
            r.discount.to_string(),
            r.profit.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn to_batch(rows: &[Row]) -> Result<RecordBatch> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    let days = |d: NaiveDate| (d - epoch).num_days() as i32;

    let mut order_id = StringBuilder::new();
    let mut order_date = Date32Builder::new();
    let mut ship_date = Date32Builder::new();
    let mut ship_mode = StringBuilder::new();
    let mut segment = StringBuilder::new();
    let mut region = StringBuilder::new();
    let mut category = StringBuilder::new();
    let mut sub_category = StringBuilder::new();
    let mut sales = Float64Builder::new();
    let mut quantity = Int64Builder::new();
    let mut discount = Float64Builder::new();
    let mut profit = Float64Builder::new();

    for r in rows {
        order_id.append_value(&r.order_id);
        order_date.append_value(days(r.order_date));
        ship_date.append_value(days(r.ship_date));
        ship_mode.append_value(r.ship_mode);
        segment.append_value(r.segment);
        region.append_value(r.region);
        category.append_value(r.category);
        sub_category.append_value(r.sub_category);
        sales.append_value(r.sales);
        quantity.append_value(r.quantity);
        discount.append_value(r.discount);
        profit.append_value(r.profit);
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("Order ID", DataType::Utf8, false),
        Field::new("Order Date", DataType::Date32, false),
        Field::new("Ship Date", DataType::Date32, false),
        Field::new("Ship Mode", DataType::Utf8, false),
        Field::new("Segment", DataType::Utf8, false),
        Field::new("Region", DataType::Utf8, false),
        Field::new("Category", DataType::Utf8, false),
        Field::new("Sub-Category", DataType::Utf8, false),
        Field::new("Sales", DataType::Float64, false),
        Field::new("Quantity", DataType::Int64, false),
        Field::new("Discount", DataType::Float64, false),
        Field::new("Profit", DataType::Float64, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(order_id.finish()),
        Arc::new(order_date.finish()),
        Arc::new(ship_date.finish()),
        Arc::new(ship_mode.finish()),
        Arc::new(segment.finish()),
        Arc::new(region.finish()),
        Arc::new(category.finish()),
        Arc::new(sub_category.finish()),
        Arc::new(sales.finish()),
        Arc::new(quantity.finish()),
        Arc::new(discount.finish()),
        Arc::new(profit.finish()),
    ];

    RecordBatch::try_new(schema, columns)
        .context("building record batch")
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng, 2000);

    let csv_path = "sample_superstore.csv";
    write_csv(&rows, csv_path)?;

    let batch = to_batch(&rows)?;
    let parquet_path = "sample_superstore.parquet";
    let file = std::fs::File::create(parquet_path)
        .with_context(|| format!("creating {parquet_path}"))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;

    arrow::util::pretty::print_batches(&[batch.slice(0, 5.min(batch.num_rows()))])?;
    println!(
        "Wrote {} order lines to {csv_path} and {parquet_path}",
        rows.len()
    );
    Ok(())
}
